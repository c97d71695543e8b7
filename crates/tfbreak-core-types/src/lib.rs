//! Core types shared across tfbreak facilities
//!
//! This crate provides the canonical schema constants used by the
//! logging facility and by error reporting, so that every component
//! emits the same structured field keys and event names.

pub mod schema;
