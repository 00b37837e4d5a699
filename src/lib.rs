//! `tracker_rust` - Role-gated issue tracker backend
//!
//! This crate provides the core functionality for the `tkr` CLI tool,
//! an issue-tracking backend over `SQLite`.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Issue, State, Category, User)
//! - [`validation`] - Issue validation engine (reference resolution,
//!   `finished_at` reconciliation, aggregated failures)
//! - [`auth`] - Access control gate
//! - [`api`] - Request handlers composing gate, engine, and repository
//! - [`storage`] - `SQLite` database layer
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{ErrorCode, Result, StructuredError, TrackerError};
