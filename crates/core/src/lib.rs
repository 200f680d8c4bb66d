//! Domain types and pure logic for the faceframe kiosk pipeline.
//!
//! Holds the session and job models, the collaborator traits the
//! pipeline is wired against, polling and frame-layout configuration,
//! upload key naming, and the pure frame compositor.

pub mod compositor;
pub mod config;
pub mod error;
pub mod job;
pub mod naming;
pub mod services;
pub mod session;
pub mod types;
