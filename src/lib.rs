// SPDX-License-Identifier: MPL-2.0

//! Analytics backend for a social platform admin console.
//!
//! Raw events (signups, posts, likes, comments) live in a SQLite event store.
//! [`analytics`] derives the dashboard metrics from them on every request,
//! [`api`] serves them over HTTP.

pub mod analytics;
pub mod api;
pub mod config;
pub mod runtime;
pub mod state;
pub mod store;
