//! Course Market - online course marketplace backend.
//!
//! Instructors publish courses and lessons; students enroll, complete
//! lessons, take the course's final assessment and receive a verifiable
//! certificate on passing. Participants message each other with live
//! presence over a websocket.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities and the pure workflow rules (progress, grading, derived status)
//! - **services**: Application use cases over a Unit of Work
//! - **infra**: Database, Redis, presence registry and external vendor interfaces
//! - **api**: HTTP handlers, middleware, routes and the websocket
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{AssessmentStatus, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
