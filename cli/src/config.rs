//! `config.toml` loading and command-line overrides.

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use permit_finder_engine::SearchConfig;
use permit_finder_socrata::SocrataConfig;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Overrides the directory holding `config.toml`.
pub const HOME_ENV: &str = "PERMIT_FINDER_HOME";
/// Supplies the Socrata app token when neither flag nor file set one.
pub const APP_TOKEN_ENV: &str = "PERMIT_FINDER_APP_TOKEN";
const CONFIG_FILENAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub source: SocrataConfig,
}

/// Values given on the command line. `None`/`false` leave the file value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub app_token: Option<String>,
    pub offline: bool,
    pub wide: bool,
    pub radius: Option<u32>,
}

/// `$PERMIT_FINDER_HOME`, else `~/.permit-finder`.
pub fn find_home() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV) {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => dirs::home_dir().map(|home| home.join(".permit-finder")),
    }
}

/// Load `explicit`, or the default config file when it exists, or defaults.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match find_home().map(|home| home.join(CONFIG_FILENAME)) {
            Some(path) if path.is_file() => path,
            _ => return Ok(FileConfig::default()),
        },
    };
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

pub fn parse(raw: &str) -> Result<FileConfig> {
    Ok(toml::from_str(raw)?)
}

impl FileConfig {
    pub fn with_overrides(mut self, overrides: &Overrides, env_token: Option<String>) -> Self {
        if let Some(url) = &overrides.api_url {
            self.source.base_url = url.clone();
        }
        if let Some(token) = &overrides.app_token {
            self.source.app_token = Some(token.clone());
        }
        if self.source.app_token.is_none() {
            self.source.app_token = env_token.filter(|token| !token.trim().is_empty());
        }
        if overrides.offline {
            self.source.offline = true;
        }
        if overrides.wide {
            self.search.nearby_radius = SearchConfig::wide().nearby_radius;
        }
        if let Some(radius) = overrides.radius {
            self.search.nearby_radius = radius;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|err| anyhow!("invalid [search] config: {err}"))?;
        self.source
            .validate()
            .map_err(|err| anyhow!("invalid [source] config: {err}"))
    }
}
