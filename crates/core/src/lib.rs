//! UrbanPlan Core - Shared domain types.
//!
//! This crate provides the types shared by every UrbanPlan component:
//! - `admin` - Dashboard back end (session authority, analysis workflow, HTTP surface)
//! - `cli` - Command-line driver for sessions and analyses
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no clocks,
//! no HTTP. Anything that needs "now" takes it as an argument.
//!
//! # Modules
//!
//! - [`types`] - Identities, roles, documents, analysis results, projects and tasks

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
