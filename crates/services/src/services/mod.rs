pub mod completion;
pub mod dashboard;
pub mod projector;
pub mod store;
pub mod usage;
