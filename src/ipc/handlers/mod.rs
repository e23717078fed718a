pub mod collections;
pub mod core;
pub mod days;
pub mod exchange;
pub mod stats;
pub mod tasks;
