//! Oracle simulator services

pub mod account_pool;
pub mod diagnostic_sink;
pub mod event_listener;
pub mod oracle_registry;
pub mod response_dispatcher;
pub mod status_source;
