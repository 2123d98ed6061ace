//! OCT diagnosis service: relays uploaded OCT scans to the Gemini API and
//! returns the structured diagnosis to the caller.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod services;
pub mod startup;
