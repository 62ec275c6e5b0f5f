//! Session registry and scope resolution configuration.

use serde::{Deserialize, Serialize};

/// Session registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Trailing window in minutes for online-user accounting: a session
    /// counts as online when its last activity falls inside this window.
    #[serde(default = "default_online_window")]
    pub online_window_minutes: u64,
    /// Maximum number of schools fetched per hierarchy-expansion query.
    #[serde(default = "default_expansion_page")]
    pub expansion_page_size: u32,
    /// Scope-cache settings for schools-by-parent lookups.
    #[serde(default)]
    pub scope_cache: ScopeCacheConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            online_window_minutes: default_online_window(),
            expansion_page_size: default_expansion_page(),
            scope_cache: ScopeCacheConfig::default(),
        }
    }
}

/// Bounded cache for the resolver's schools-by-parent reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeCacheConfig {
    /// Maximum number of organization units cached.
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// Time-to-live for cached entries in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

impl Default for ScopeCacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

fn default_online_window() -> u64 {
    15
}

fn default_expansion_page() -> u32 {
    500
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_cache_ttl() -> u64 {
    300
}
