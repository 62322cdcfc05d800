//! # Buyback Library
//!
//! This library exposes the buyback app modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;

// Re-export buyback_core for convenience
pub use buyback_core;
