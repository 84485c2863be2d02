//! Core business logic for profilingpoll.

pub mod engine;
pub mod services;

pub use engine::{AnswerChange, AnswerSnapshot, Mutation, ProfileWeight, WalkthroughState};
pub use services::*;
