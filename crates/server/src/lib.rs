//! Flowrite server library.
//!
//! The HTTP/JSON API, its services and the record store backends, exposed as
//! a library so the CLI and integration tests can reuse them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
