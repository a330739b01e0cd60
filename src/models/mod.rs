//! Data models for the UniFi API.
//!
//! This module contains the various data structures used in the UniFi API.

// Export submodules
pub mod api_response;
pub mod auth;
pub mod report;

pub use api_response::{ApiResponse, EmptyResponse};
