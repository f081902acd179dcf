//! Validation, form-state, and persistence pipeline for a multi-step STEM
//! scholarship registration.
//!
//! The crate is organized the same way the service consumes it: `config` and
//! `telemetry` bootstrap the process, `error` carries the top-level failure
//! type, and `workflows::registration` holds the pipeline itself: field
//! validators, the reference-data directory and resolvers, the three-step
//! form state machine, the submission orchestrator, storage adapters, and
//! the HTTP surface.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
