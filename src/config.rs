//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--single`, `--show-hidden`, `--log-level`, etc.)
//! 2. `--config <file>`
//! 3. `$FSEL_CONFIG` environment variable (path to config file)
//! 4. Project-local `.fsel.toml` in the current working directory
//! 5. Global `~/.config/fsel/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::listing::local::Source;

// ── Section configs ──────────────────────────────────────────────────────────

/// General dialog settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Allow selecting several files and whole directories.
    pub multiple: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
}

/// Local listing settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListingConfig {
    /// List dotfiles.
    pub show_hidden: Option<bool>,
    /// Directories always listed first.
    pub dirs_first: Option<bool>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset, e.g. `"debug"`.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<PathBuf>,
}

/// Color overrides for the `custom` scheme.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub row_fg: Option<String>,
    pub dir_fg: Option<String>,
    pub cursor_bg: Option<String>,
    pub cursor_fg: Option<String>,
    pub selected_fg: Option<String>,
    pub mixed_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

/// A `[[sources]]` entry: a directory offered at the top level.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub path: PathBuf,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
    pub theme: ThemeConfig,
    pub sources: Option<Vec<SourceConfig>>,
}

// ── Default constants ────────────────────────────────────────────────────────

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default log file name, placed in the platform cache directory.
pub const DEFAULT_LOG_FILE: &str = "fsel.log";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FSEL_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fsel.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fsel").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr, since
/// logging is configured from the result).
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                multiple: other.general.multiple.or(self.general.multiple),
                mouse: other.general.mouse.or(self.general.mouse),
            },
            listing: ListingConfig {
                show_hidden: other.listing.show_hidden.or(self.listing.show_hidden),
                dirs_first: other.listing.dirs_first.or(self.listing.dirs_first),
            },
            logging: LoggingConfig {
                level: other.logging.level.clone().or(self.logging.level),
                file: other.logging.file.clone().or(self.logging.file),
            },
            theme: ThemeConfig {
                scheme: other.theme.scheme.clone().or(self.theme.scheme),
                custom: other.theme.custom.clone().or(self.theme.custom),
            },
            sources: other.sources.clone().or(self.sources),
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Lowest priority first so higher ones overwrite.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            if let Some(file_cfg) = load_file(cli_path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Whether several entries may be selected.
    pub fn multiple(&self) -> bool {
        self.general.multiple.unwrap_or(true)
    }

    /// Whether mouse support is enabled.
    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(false)
    }

    pub fn show_hidden(&self) -> bool {
        self.listing.show_hidden.unwrap_or(false)
    }

    pub fn dirs_first(&self) -> bool {
        self.listing.dirs_first.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log file, defaulting to the cache directory (or the working directory
    /// when the platform has none).
    pub fn log_file(&self) -> PathBuf {
        if let Some(file) = &self.logging.file {
            return file.clone();
        }
        dirs::cache_dir()
            .map(|d| d.join("fsel").join(DEFAULT_LOG_FILE))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
    }

    /// Configured sources, or a single source named after `fallback`.
    pub fn sources_or(&self, fallback: &Path) -> Vec<Source> {
        match &self.sources {
            Some(sources) if !sources.is_empty() => sources
                .iter()
                .map(|s| Source {
                    name: s.name.clone(),
                    path: s.path.clone(),
                })
                .collect(),
            _ => {
                let name = fallback
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| fallback.to_string_lossy().to_string());
                vec![Source {
                    name,
                    path: fallback.to_path_buf(),
                }]
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert!(cfg.multiple());
        assert!(!cfg.mouse_enabled());
        assert!(!cfg.show_hidden());
        assert!(cfg.dirs_first());
        assert_eq!(cfg.log_level(), "info");
        assert!(cfg.log_file().ends_with(DEFAULT_LOG_FILE));
        assert!(cfg.theme.scheme.is_none());
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
multiple = false
mouse = true

[listing]
show_hidden = true
dirs_first = false

[logging]
level = "debug"
file = "/tmp/fsel-test.log"

[theme]
scheme = "light"

[[sources]]
name = "data"
path = "/srv/data"

[[sources]]
name = "home"
path = "/home/me"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(!cfg.multiple());
        assert!(cfg.mouse_enabled());
        assert!(cfg.show_hidden());
        assert!(!cfg.dirs_first());
        assert_eq!(cfg.log_level(), "debug");
        assert_eq!(cfg.log_file(), PathBuf::from("/tmp/fsel-test.log"));
        assert_eq!(cfg.theme.scheme.as_deref(), Some("light"));

        let sources = cfg.sources_or(Path::new("/ignored"));
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].name, "data");
        assert_eq!(sources[1].path, PathBuf::from("/home/me"));
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[listing]
show_hidden = true
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.show_hidden());
        assert!(cfg.multiple());
        assert!(cfg.dirs_first());
        assert!(cfg.sources.is_none());
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(cfg.multiple());
        assert!(!cfg.show_hidden());
    }

    #[test]
    fn test_fallback_source_named_after_directory() {
        let cfg = AppConfig::default();
        let sources = cfg.sources_or(Path::new("/srv/projects"));
        assert_eq!(
            sources,
            vec![Source {
                name: "projects".into(),
                path: PathBuf::from("/srv/projects"),
            }]
        );
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                multiple: Some(true),
                mouse: Some(true),
            },
            logging: LoggingConfig {
                level: Some("warn".into()),
                file: None,
            },
            ..Default::default()
        };

        let over = AppConfig {
            general: GeneralConfig {
                multiple: Some(false),
                // mouse not set, should keep base
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(!merged.multiple());
        assert!(merged.mouse_enabled());
        assert_eq!(merged.log_level(), "warn");
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            listing: ListingConfig {
                show_hidden: Some(true),
                dirs_first: Some(false),
            },
            sources: Some(vec![SourceConfig {
                name: "a".into(),
                path: PathBuf::from("/a"),
            }]),
            ..Default::default()
        };
        let merged = base.merge(&AppConfig::default());
        assert!(merged.show_hidden());
        assert!(!merged.dirs_first());
        assert_eq!(merged.sources.map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[general]
multiple = false

[logging]
level = "trace"
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(!cfg.multiple());
        assert_eq!(cfg.log_level(), "trace");
        assert!(cfg.dirs_first());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[listing]
show_hidden = true

[logging]
level = "debug"
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            logging: LoggingConfig {
                level: Some("error".into()),
                file: None,
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        assert_eq!(cfg.log_level(), "error");
        assert!(cfg.show_hidden());
    }

    #[test]
    fn test_theme_custom_colors() {
        let toml = r##"
[theme]
scheme = "custom"

[theme.custom]
cursor_bg = "#1a1b26"
mixed_fg = "#e0af68"
"##;
        let cfg: AppConfig = toml::from_str(toml).expect("parse");
        assert_eq!(cfg.theme.scheme.as_deref(), Some("custom"));
        let custom = cfg.theme.custom.as_ref().expect("custom present");
        assert_eq!(custom.cursor_bg.as_deref(), Some("#1a1b26"));
        assert_eq!(custom.mixed_fg.as_deref(), Some("#e0af68"));
        assert!(custom.status_bg.is_none());
    }
}
