//! depcoord - coordinated module resolution library
//!
//! This library provides:
//! - Per-key mutual exclusion for asynchronous work (`guard`)
//! - A repository decorator that serializes remote calls per component
//!   (`repository`)
//! - Variant-scoped resolved artifact sets (`artifact_set`)
//! - A resolution orchestrator and its CLI, output and logging surfaces

pub mod artifact_set;
pub mod cli;
pub mod domain;
pub mod error;
pub mod guard;
pub mod logging;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod repository;
pub mod result;
