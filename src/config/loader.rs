use super::{ConfigOverrides, SearchConfig};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "graphsearch.toml";

/// Resolves a `SearchConfig` from defaults, a TOML file, the environment,
/// and command-line overrides, in that order of increasing precedence
pub struct ConfigLoader {
    working_dir: PathBuf,
    explicit_path: Option<PathBuf>,
    use_env: bool,
}

impl ConfigLoader {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            explicit_path: None,
            use_env: true,
        }
    }

    /// Read this file instead of looking for `graphsearch.toml`
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    pub fn with_env(mut self, enabled: bool) -> Self {
        self.use_env = enabled;
        self
    }

    pub async fn load(&self, overrides: &ConfigOverrides) -> Result<SearchConfig> {
        let mut config = match self.config_path() {
            Some(path) => Self::read_file(&path).await?,
            None => SearchConfig::default(),
        };

        if self.use_env {
            config.merge_env_vars();
        }
        config.apply_overrides(overrides);

        let config = config.rooted_at(&self.working_dir);
        debug!("Resolved search config: {:?}", config);
        Ok(config)
    }

    fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return Some(self.working_dir.join(path));
        }
        let default = self.working_dir.join(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    }

    async fn read_file(path: &Path) -> Result<SearchConfig> {
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_at(path, e))?;
        Ok(toml::from_str(&content)?)
    }
}
