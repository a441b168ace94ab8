use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// User-level configuration, read from `<config_dir>/trellis/config.toml`.
///
/// Both keys are optional; unset keys fall back to the flag/env/default
/// chain resolved by [`resolve_db_path`] and [`resolve_output`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Path to the SQLite database file.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Preferred output mode: `human` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Load the user config file, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("trellis/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Default database location: `<data_dir>/trellis/trellis.db`.
#[must_use]
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("trellis/trellis.db"))
}

/// The `TRELLIS_DB` environment override, if set.
#[must_use]
pub fn db_path_from_env() -> Option<PathBuf> {
    env::var_os("TRELLIS_DB").map(PathBuf::from)
}

/// Resolve the database path. Precedence: `--db` flag, then `TRELLIS_DB`,
/// then the config file, then the platform data directory.
#[must_use]
pub fn resolve_db_path(
    flag: Option<PathBuf>,
    env_path: Option<PathBuf>,
    config: &UserConfig,
) -> Option<PathBuf> {
    flag.or(env_path)
        .or_else(|| config.db_path.clone())
        .or_else(default_db_path)
}

/// Resolve the output mode to `"human"` or `"json"`.
///
/// Precedence: `--json` flag, then the `FORMAT` env var, then the config
/// file's `output` key. Unknown values fall through to human output.
#[must_use]
pub fn resolve_output(
    cli_json: bool,
    env_format: Option<&str>,
    user_output: Option<&str>,
) -> &'static str {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some("json"),
            // aliases accepted for interop with other tools' FORMAT values
            "human" | "pretty" | "text" => Some("human"),
            _ => None,
        }
    }

    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode;
    }

    "human"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_parses_to_defaults() {
        let cfg: UserConfig = toml::from_str("").expect("parse");
        assert!(cfg.db_path.is_none());
        assert!(cfg.output.is_none());
    }

    #[test]
    fn config_round_trips_both_keys() {
        let content = r#"
db_path = "/home/alice/.local/share/trellis/trellis.db"
output = "json"
"#;
        let cfg: UserConfig = toml::from_str(content).expect("parse");
        assert_eq!(
            cfg.db_path,
            Some(PathBuf::from("/home/alice/.local/share/trellis/trellis.db"))
        );
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        // toml deserialization ignores unknown keys by default; a config
        // written by a newer version must not break an older binary.
        let cfg: UserConfig = toml::from_str("future_knob = 3").expect("parse");
        assert!(cfg.db_path.is_none());
    }

    #[test]
    fn flag_wins_over_env_and_config() {
        let config = UserConfig {
            db_path: Some(PathBuf::from("/from/config.db")),
            output: None,
        };
        let resolved = resolve_db_path(
            Some(PathBuf::from("/from/flag.db")),
            Some(PathBuf::from("/from/env.db")),
            &config,
        );
        assert_eq!(resolved, Some(PathBuf::from("/from/flag.db")));
    }

    #[test]
    fn env_wins_over_config() {
        let config = UserConfig {
            db_path: Some(PathBuf::from("/from/config.db")),
            output: None,
        };
        let resolved = resolve_db_path(None, Some(PathBuf::from("/from/env.db")), &config);
        assert_eq!(resolved, Some(PathBuf::from("/from/env.db")));
    }

    #[test]
    fn config_path_used_when_no_flag_or_env() {
        let config = UserConfig {
            db_path: Some(PathBuf::from("/from/config.db")),
            output: None,
        };
        let resolved = resolve_db_path(None, None, &config);
        assert_eq!(resolved, Some(PathBuf::from("/from/config.db")));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        let output = resolve_output(true, Some("human"), Some("human"));
        assert_eq!(output, "json");
    }

    #[test]
    fn env_format_overrides_config() {
        let output = resolve_output(false, Some("json"), Some("human"));
        assert_eq!(output, "json");
    }

    #[test]
    fn legacy_aliases_are_normalized() {
        assert_eq!(resolve_output(false, Some("pretty"), None), "human");
        assert_eq!(resolve_output(false, Some("TEXT"), None), "human");
        assert_eq!(resolve_output(false, None, Some("Json")), "json");
    }

    #[test]
    fn unknown_format_falls_through_to_human() {
        assert_eq!(resolve_output(false, Some("fancy"), None), "human");
        assert_eq!(resolve_output(false, None, None), "human");
    }
}
