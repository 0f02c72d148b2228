// SPDX-License-Identifier: MPL-2.0

//! Shared async runtime for all store operations.
//!
//! The HTTP listener runs on plain threads; anything that fans out work
//! (the dashboard load cycle) goes through this single Tokio runtime instead
//! of building a new one per request.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

/// Shared multi-threaded Tokio runtime.
/// SQLite queries run on its blocking pool, so two core workers are enough.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("pulse-async")
        .build()
        .expect("failed to create async runtime")
});

/// Execute a future on the shared runtime, blocking until completion.
/// Use this from synchronous code (request threads) that needs async work.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
