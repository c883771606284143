//! Configuration file loader with multi-source merging

use super::error::ConfigError;
use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dive-bar";
const PROJECT_FILE: &str = "dive-bar.toml";
const ENV_PREFIX: &str = "DIVEBAR_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `DIVEBAR_` environment variables (`DIVEBAR_BAR__TICK_INTERVAL=1.5`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./dive-bar.toml`
    /// 4. XDG config: `$XDG_CONFIG_HOME/dive-bar/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        Self::figment(config_path)
            .extract()
            .map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    /// The merged provider chain, exposed for diagnostics.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(project_path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(project_path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the global config file path
    ///
    /// Returns XDG_CONFIG_HOME/dive-bar/config.toml if set,
    /// otherwise falls back to ~/.config/dive-bar/config.toml
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        let path = PathBuf::from(PROJECT_FILE);
        path.exists().then_some(path)
    }

    /// Describe the config file locations being used (for `-vv` diagnostics)
    pub fn describe_sources(config_path: Option<&Path>) -> Vec<String> {
        let mut lines = vec!["Configuration sources (in priority order):".to_string()];

        lines.push(format!("  [env  ] {}*", ENV_PREFIX));

        if let Some(path) = config_path {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            lines.push(format!("  [{}] Explicit: {}", mark, path.display()));
        }

        match Self::project_config_path() {
            Some(path) => lines.push(format!("  [FOUND] Project: {}", path.display())),
            None => lines.push(format!("  [     ] Project: ./{}", PROJECT_FILE)),
        }

        if let Some(path) = Self::global_config_path() {
            let mark = if path.exists() { "FOUND" } else { "     " };
            lines.push(format!("  [{}] Global:  {}", mark, path.display()));
        }

        lines.push("  [     ] Default: built-in defaults".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.bar.name, "The Rusty Nail");
        assert!(config.diversity.enabled);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("dive-bar"));
    }

    #[test]
    fn test_project_file_and_env_merge_over_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "dive-bar.toml",
                r#"
[bar]
name = "The Broken Stool"
tick_interval = 3.0

[diversity]
threshold = 0.4
"#,
            )?;
            jail.set_env("DIVEBAR_BAR__TICK_INTERVAL", "1.5");

            let config = ConfigLoader::load(None).map_err(|e| e.to_string())?;
            assert_eq!(config.bar.name, "The Broken Stool");
            assert_eq!(config.bar.tick_interval, 1.5);
            assert_eq!(config.bar.max_agents, 5);
            assert_eq!(config.diversity.threshold, 0.4);
            assert_eq!(config.diversity.window_size, 10);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_path_overrides_project_file() {
        Jail::expect_with(|jail| {
            jail.create_file("dive-bar.toml", "[bar]\nname = \"Project\"\nmax_agents = 4\n")?;
            jail.create_file("custom.toml", "[bar]\nname = \"Explicit\"\n")?;

            let explicit = PathBuf::from("custom.toml");
            let config = ConfigLoader::load(Some(&explicit)).map_err(|e| e.to_string())?;
            assert_eq!(config.bar.name, "Explicit");
            assert_eq!(config.bar.max_agents, 4);
            Ok(())
        });
    }

    #[test]
    fn test_type_errors_surface_as_config_error() {
        Jail::expect_with(|jail| {
            jail.create_file("dive-bar.toml", "[bar]\nmax_agents = \"lots\"\n")?;
            let error = ConfigLoader::load(None).unwrap_err();
            assert!(matches!(error, ConfigError::Figment(_)));
            Ok(())
        });
    }
}
