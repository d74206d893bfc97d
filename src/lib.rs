//! FlightSurety Oracle Server Library
//!
//! Exports the ledger boundary, the oracle services and the HTTP surface so
//! the server binary and the integration tests share one crate.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod routes;
pub mod services;
