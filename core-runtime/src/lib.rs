//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Capability configuration
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that `core-playback` depends on.
//! It establishes the logging conventions, fail-fast capability wiring and
//! event broadcasting used throughout the workspace.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
