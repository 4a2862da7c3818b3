//! accessctl — terminal client for cloud access-approval requests.
//!
//! This library exposes the request model, request sources, and the
//! interactive viewer for integration testing and programmatic use. The
//! binary entrypoint is in `main.rs`.

pub mod approval;
pub mod cli;
pub mod config;
pub mod source;
pub mod utils;
pub mod viewer;
