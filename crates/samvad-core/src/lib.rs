//! Core types, config, errors, and wire protocol for Samvad.

pub mod config;
pub mod error;
pub mod language;
pub mod protocol;
pub mod types;
