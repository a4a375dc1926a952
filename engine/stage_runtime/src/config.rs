//! Runtime configuration.

/// Environment variable overriding [`RuntimeConfig::max_clones`].
pub const MAX_CLONES_ENV: &str = "STAGE_MAX_CLONES";

/// Tunables of a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on live clones; further clone requests are dropped.
    pub max_clones: usize,
    /// Whether collision-triggered scripts are polled each tick.
    pub collision_triggers: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_clones: 300,
            collision_triggers: true,
        }
    }
}

impl RuntimeConfig {
    /// Defaults, overridden by `STAGE_MAX_CLONES` when it holds a number.
    pub fn from_env() -> Self {
        let mut config = RuntimeConfig::default();
        if let Ok(raw) = std::env::var(MAX_CLONES_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(max_clones) => config.max_clones = max_clones,
                Err(error) => tracing::warn!(
                    value = %raw,
                    %error,
                    "ignoring invalid {MAX_CLONES_ENV}"
                ),
            }
        }
        config
    }

    #[must_use]
    pub fn with_max_clones(mut self, max_clones: usize) -> Self {
        self.max_clones = max_clones;
        self
    }

    #[must_use]
    pub fn with_collision_triggers(mut self, enabled: bool) -> Self {
        self.collision_triggers = enabled;
        self
    }
}
