//! Database configuration.

/// Host-level caps installed on every sandbox context.
///
/// Mapping functions are expected to terminate; these limits only stop a
/// runaway script from hanging a mutation forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Maximum iterations of any single loop.
    pub loop_iteration_limit: u64,
    /// Maximum call depth.
    pub recursion_limit: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            loop_iteration_limit: 1_000_000,
            recursion_limit: 512,
        }
    }
}

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the root directory if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether every document write is fsynced (file and directory).
    pub sync_writes: bool,

    /// Limits for index mapping functions.
    pub sandbox: SandboxLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_writes: true,
            sandbox: SandboxLimits::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the root directory if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether document writes are fsynced.
    #[must_use]
    pub const fn sync_writes(mut self, value: bool) -> Self {
        self.sync_writes = value;
        self
    }

    /// Sets the per-loop iteration cap for mapping functions.
    #[must_use]
    pub const fn loop_iteration_limit(mut self, limit: u64) -> Self {
        self.sandbox.loop_iteration_limit = limit;
        self
    }

    /// Sets the call-depth cap for mapping functions.
    #[must_use]
    pub const fn recursion_limit(mut self, limit: usize) -> Self {
        self.sandbox.recursion_limit = limit;
        self
    }
}
