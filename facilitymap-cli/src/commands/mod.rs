//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (get, set, list, path, init)
//! - [`scan`] - One detect-and-fetch pass
//! - [`watch`] - Live session driven from stdin

pub mod common;
pub mod config;
pub mod scan;
pub mod watch;
