//! studyhub-server - HTTP API for the study hub
//!
//! Exposes the study assistant, scraper, and notes/events store over a
//! JSON REST API so a browser front end can drive them.

pub mod routes;
pub mod server;

pub use server::{AppState, StudyServer};
