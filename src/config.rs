// SPDX-License-Identifier: MPL-2.0

pub const APP_ID: &str = "io.github.sethcottle.Pulse";
pub const APP_NAME: &str = "Pulse";

#[cfg(feature = "devel")]
pub const IS_DEVEL: bool = true;
#[cfg(not(feature = "devel"))]
pub const IS_DEVEL: bool = false;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:4000";

/// Request threads serving the HTTP listener
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// How long a query waits on a locked database before giving up
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 2_000;

/// Deadline for one full dashboard load cycle
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 5_000;

/// Maximum number of entries in the content ranking
pub const DEFAULT_RANKING_LIMIT: usize = 100;

/// Ranking titles are cut to this many characters
pub const EXCERPT_LEN: usize = 30;

/// Env var filter used when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    if IS_DEVEL { "pulse=debug,info" } else { "info" }
}
