use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::parser::timestamp::GapPolicy;

const CONFIG_FILE: &str = "tracklist_chapters";
const ENV_PREFIX: &str = "TRACKLIST";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub gap_policy: GapPolicy,
}

impl Settings {
    /// Defaults, then `tracklist_chapters.toml` if present, then `TRACKLIST_*` env vars.
    pub fn load() -> Result<Self> {
        let builder = defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        let settings: Settings = builder.build()?.try_deserialize()?;
        debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("user_agent", DEFAULT_USER_AGENT)?
        .set_default("timeout_secs", 30i64)?
        .set_default("max_retries", 3i64)?
        .set_default("base_backoff_ms", 2000i64)?
        .set_default("gap_policy", "estimate")?)
}
