//! Stepwise Core: domain models, repository traits, and shared error
//! types for the resolver layer.

pub mod error;
pub mod models;
pub mod repository;
