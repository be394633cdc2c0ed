//! Queue segmentation scheduler: assigns present agents to queues across
//! the time slots of one shift.

pub mod agent;
pub mod assignment;
pub mod breaks;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod headcount;
pub mod queue;
pub mod result;
pub mod rng;
pub mod segmentation;
pub mod session;
pub mod slots;
pub mod store;
pub mod time;
pub mod types;
