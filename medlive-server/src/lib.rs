//! MedLive server library
//!
//! This module re-exports the server's modules for integration testing.

pub mod bridge;
pub mod config;
pub mod context;
pub mod filter;
pub mod gpu;
pub mod listener;
pub mod protocol;
pub mod tls;
pub mod version;
