//! Harmony demo application
//!
//! Wires the playback service to `SQLite` persistence and a simulated audio
//! engine, then runs a scripted listening session.

pub mod config;
pub mod engine;
pub mod error;
pub mod session;
