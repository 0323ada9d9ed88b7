use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::model::ParseOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub batch_size: usize,
    pub unique_ids: bool,
    pub pretty: bool,
}

impl Settings {
    /// Defaults, then `normalizer.toml` if present, then `NORMALIZER_*` env vars.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("db_path", "data/pages.sqlite")?
            .set_default("batch_size", 500)?
            .set_default("unique_ids", false)?
            .set_default("pretty", false)?
            .add_source(File::with_name("normalizer").required(false))
            .add_source(Environment::with_prefix("NORMALIZER"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            unique_ids: self.unique_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load() {
        let s = Settings::load().unwrap();
        assert!(s.batch_size > 0);
        assert!(!s.db_path.is_empty());
    }

    #[test]
    fn options_follow_settings() {
        let s = Settings {
            db_path: ":memory:".into(),
            batch_size: 10,
            unique_ids: true,
            pretty: false,
        };
        assert!(s.parse_options().unique_ids);
    }
}
