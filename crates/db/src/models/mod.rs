pub mod care_log;
pub mod care_schedule;
pub mod plant;
