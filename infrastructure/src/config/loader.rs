//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable prefix; `__` separates nested keys
/// (`TOOLRELAY_MODEL__API_KEY` → `model.api_key`).
pub const ENV_PREFIX: &str = "TOOLRELAY_";

const PROJECT_FILES: [&str; 2] = ["toolrelay.toml", ".toolrelay.toml"];

/// Error loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Where a configuration layer comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSourceKind {
    Global,
    Project,
    Explicit,
}

/// A configuration file location and whether it exists
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: PathBuf,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources.
    ///
    /// Priority (lowest to highest):
    /// 1. Default values
    /// 2. Global: `$XDG_CONFIG_HOME/toolrelay/config.toml`
    /// 3. Project: `./toolrelay.toml` or `./.toolrelay.toml`
    /// 4. Explicit `--config` path
    /// 5. `TOOLRELAY_*` environment variables
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let files: Vec<PathBuf> = [Self::global_config_path(), Self::project_config_path()]
            .into_iter()
            .flatten()
            .chain(config_path.map(Path::to_path_buf))
            .collect();

        Self::figment(&files)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Defaults merged with the existing files among `files`, in order.
    fn figment(files: &[PathBuf]) -> Figment {
        files
            .iter()
            .filter(|path| path.exists())
            .fold(
                Figment::new().merge(Serialized::defaults(FileConfig::default())),
                |figment, path| figment.merge(Toml::file(path)),
            )
    }

    /// `$XDG_CONFIG_HOME/toolrelay/config.toml`, falling back to `~/.config`
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolrelay").join("config.toml"))
    }

    /// The project-level config file, if one exists
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// All file locations consulted, lowest priority first
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();
        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                kind: ConfigSourceKind::Global,
                found: path.exists(),
                path,
            });
        }
        let project = Self::project_config_path();
        sources.push(ConfigSource {
            kind: ConfigSourceKind::Project,
            found: project.is_some(),
            path: project.unwrap_or_else(|| PathBuf::from(PROJECT_FILES[0])),
        });
        if let Some(path) = config_path {
            sources.push(ConfigSource {
                kind: ConfigSourceKind::Explicit,
                found: path.exists(),
                path: path.to_path_buf(),
            });
        }
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("toolrelay/config.toml"));
    }

    #[test]
    fn test_later_files_override_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(
            &global,
            "[model]\nmodel = \"global-model\"\ntimeout_secs = 10\n",
        )
        .unwrap();
        fs::write(&explicit, "[model]\nmodel = \"explicit-model\"\n").unwrap();

        let config: FileConfig = ConfigLoader::figment(&[
            global,
            dir.path().join("missing.toml"),
            explicit,
        ])
        .extract()
        .unwrap();

        assert_eq!(config.model.model, "explicit-model");
        assert_eq!(config.model.timeout_secs, 10);
        assert_eq!(config.tools.k_tools, FileConfig::default().tools.k_tools);
    }

    #[test]
    fn test_malformed_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[tools]\nk_tools = \"many\"\n").unwrap();

        let err = ConfigLoader::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/toolrelay.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_sources_include_explicit() {
        let sources = ConfigLoader::sources(Some(Path::new("custom.toml")));
        let last = sources.last().unwrap();
        assert_eq!(last.kind, ConfigSourceKind::Explicit);
        assert!(!last.found);
    }
}
