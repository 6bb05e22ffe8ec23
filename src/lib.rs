//! DeltaTask - a local todo manager backed by SQLite
//!
//! This library provides the core functionality for DeltaTask, including:
//! - Database connection handling and schema migrations
//! - Todo and tag models with field validation
//! - Repository layer for todos, tags and subtask hierarchies
//! - Priority ordering, text search and statistics
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use deltatask::db::DbConnection;
//! use deltatask::models::NewTodo;
//! use deltatask::repo::TodoRepo;
//!
//! fn main() -> anyhow::Result<()> {
//!     let conn = DbConnection::connect()?;
//!     let todo = TodoRepo::add(&conn, &NewTodo::new("Write report").urgency(4).tag("work"))?;
//!     println!("Created todo {}", todo.id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod priority;
pub mod query;
pub mod repo;
pub mod subtasks;
pub mod utils;
