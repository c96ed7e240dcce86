//! Domain models for Stepwise.
//!
//! These are the core types shared across all crates.

pub mod lesson;
pub mod session;
pub mod submission;
pub mod user;
pub mod user_lesson;
