//! Employee time tracking: clock-in/clock-out reconciliation over a
//! wholesale-rewritten attendance document, served over HTTP.

pub mod api;
pub mod auth;
pub mod config;
pub mod docs;
pub mod document;
pub mod error;
pub mod model;
pub mod routes;
pub mod service;
pub mod store;
pub mod utils;
