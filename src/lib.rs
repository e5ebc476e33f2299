// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Stride-Tracker: personal running and fitness log
//!
//! This crate provides the backend API for recording runs and secondary
//! activities, tracking goals, and serving the derived statistics the
//! frontend charts are built from.

pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::JsonDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: JsonDb,
}
