pub mod contests;
pub mod durations;
