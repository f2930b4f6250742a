//! In-memory configuration source for testing and embedding.

use tierstack_core::{application::ports::ConfigSource, domain::RawConfig, error::TierstackResult};

/// Hands out a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource {
    raw: RawConfig,
}

impl StaticConfigSource {
    pub fn new(raw: RawConfig) -> Self {
        Self { raw }
    }
}

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> TierstackResult<RawConfig> {
        Ok(self.raw.clone())
    }

    fn describe(&self) -> String {
        "in-memory configuration".into()
    }
}
