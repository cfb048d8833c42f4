//! Crossroads Core — shared domain abstractions.
//!
//! This crate defines the identifiers, error taxonomy, clock, run event
//! envelope and diary storage trait that every other crate depends on. It
//! contains no infrastructure code.

pub mod clock;
pub mod diary;
pub mod error;
pub mod event;
pub mod ids;
