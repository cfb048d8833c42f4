//! Crossroads — composition root.
//!
//! Wires content, engine and diary together from environment configuration
//! and exposes a [`session::PlaySession`] facade to presentation layers.

pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod telemetry;
