//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.lazydotnet/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::probe::{DEFAULT_PROBE_ARG, DEFAULT_PROBE_PROGRAM, ProbeCommand};
use crate::tui::TerminalOptions;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LazyConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProbeConfig {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TerminalConfig {
    pub standard_key_sequence_resolvers: Option<bool>,
    pub allocate_footer: Option<bool>,
    pub manual_flush: Option<bool>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_STANDARD_KEY_SEQUENCE_RESOLVERS: bool = true;
pub const DEFAULT_ALLOCATE_FOOTER: bool = true;
pub const DEFAULT_MANUAL_FLUSH: bool = false;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub probe: ProbeCommand,
    pub terminal: TerminalOptions,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.lazydotnet/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lazydotnet").join("config.toml"))
}

/// Load config from `~/.lazydotnet/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `LazyConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<LazyConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(LazyConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(LazyConfig::default());
    }

    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<LazyConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: LazyConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# lazydotnet Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [probe]
# command = "dotnet"                 # Or set LAZYDOTNET_TOOL env var
# args = ["--version"]
# timeout_secs = 10                  # Or set LAZYDOTNET_PROBE_TIMEOUT; unset waits forever

# [terminal]
# standard_key_sequence_resolvers = true
# allocate_footer = true
# manual_flush = false
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Environment variable naming the tool to run at startup.
pub const ENV_TOOL: &str = "LAZYDOTNET_TOOL";
/// Environment variable holding the startup check timeout in seconds.
pub const ENV_TIMEOUT: &str = "LAZYDOTNET_PROBE_TIMEOUT";

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_tool` and `cli_timeout_secs` are from CLI flags (None = not specified).
/// `env` looks up environment variables; `main` passes `std::env::var`.
pub fn resolve(
    config: &LazyConfig,
    cli_tool: Option<&str>,
    cli_timeout_secs: Option<u64>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Tool: CLI → env → config → default
    let program = cli_tool
        .map(|s| s.to_string())
        .or_else(|| env(ENV_TOOL))
        .or_else(|| config.probe.command.clone())
        .unwrap_or_else(|| DEFAULT_PROBE_PROGRAM.to_string());

    let args = config
        .probe
        .args
        .clone()
        .unwrap_or_else(|| vec![DEFAULT_PROBE_ARG.to_string()]);

    // Timeout: CLI → env → config → none
    let timeout_secs = cli_timeout_secs
        .or_else(|| {
            env(ENV_TIMEOUT).and_then(|v| match v.parse() {
                Ok(secs) => Some(secs),
                Err(e) => {
                    warn!("Ignoring {}={:?}: {}", ENV_TIMEOUT, v, e);
                    None
                }
            })
        })
        .or(config.probe.timeout_secs);

    ResolvedConfig {
        probe: ProbeCommand {
            program,
            args,
            timeout: timeout_secs.map(Duration::from_secs),
        },
        terminal: TerminalOptions {
            use_standard_key_sequence_resolvers: config
                .terminal
                .standard_key_sequence_resolvers
                .unwrap_or(DEFAULT_STANDARD_KEY_SEQUENCE_RESOLVERS),
            allocate_footer: config
                .terminal
                .allocate_footer
                .unwrap_or(DEFAULT_ALLOCATE_FOOTER),
            manual_flush: config.terminal.manual_flush.unwrap_or(DEFAULT_MANUAL_FLUSH),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = LazyConfig::default();
        assert!(config.probe.command.is_none());
        assert!(config.terminal.allocate_footer.is_none());
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    fn config_with_tool(command: &str, timeout_secs: Option<u64>) -> LazyConfig {
        LazyConfig {
            probe: ProbeConfig {
                command: Some(command.to_string()),
                timeout_secs,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let config = LazyConfig::default();
        let resolved = resolve(&config, None, None, no_env);
        assert_eq!(resolved.probe.program, DEFAULT_PROBE_PROGRAM);
        assert_eq!(resolved.probe.args, vec!["--version".to_string()]);
        assert_eq!(resolved.probe.timeout, None);
        assert!(resolved.terminal.use_standard_key_sequence_resolvers);
        assert!(resolved.terminal.allocate_footer);
        assert!(!resolved.terminal.manual_flush);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = LazyConfig {
            probe: ProbeConfig {
                command: Some("/opt/dotnet/dotnet".to_string()),
                args: Some(vec!["--info".to_string()]),
                timeout_secs: Some(3),
            },
            terminal: TerminalConfig {
                standard_key_sequence_resolvers: Some(false),
                allocate_footer: Some(false),
                manual_flush: Some(true),
            },
        };
        let resolved = resolve(&config, None, None, no_env);
        assert_eq!(resolved.probe.program, "/opt/dotnet/dotnet");
        assert_eq!(resolved.probe.args, vec!["--info".to_string()]);
        assert_eq!(resolved.probe.timeout, Some(Duration::from_secs(3)));
        assert!(!resolved.terminal.use_standard_key_sequence_resolvers);
        assert!(!resolved.terminal.allocate_footer);
        assert!(resolved.terminal.manual_flush);
    }

    #[test]
    fn test_resolve_env_overrides_config() {
        let config = config_with_tool("from-config", Some(3));
        let env = env_of(&[(ENV_TOOL, "from-env"), (ENV_TIMEOUT, "9")]);
        let resolved = resolve(&config, None, None, env);
        assert_eq!(resolved.probe.program, "from-env");
        assert_eq!(resolved.probe.timeout, Some(Duration::from_secs(9)));
    }

    #[test]
    fn test_resolve_cli_overrides_env() {
        let config = config_with_tool("from-config", Some(3));
        let env = env_of(&[(ENV_TOOL, "from-env"), (ENV_TIMEOUT, "9")]);
        let resolved = resolve(&config, Some("from-cli"), Some(7), env);
        assert_eq!(resolved.probe.program, "from-cli");
        assert_eq!(resolved.probe.timeout, Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_resolve_invalid_env_timeout_falls_back_to_config() {
        let config = config_with_tool("from-config", Some(3));
        let env = env_of(&[(ENV_TIMEOUT, "soon")]);
        let resolved = resolve(&config, None, None, env);
        assert_eq!(resolved.probe.program, "from-config");
        assert_eq!(resolved.probe.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_resolve_invalid_env_timeout_without_config_means_no_timeout() {
        let env = env_of(&[(ENV_TIMEOUT, "-1")]);
        let resolved = resolve(&LazyConfig::default(), None, None, env);
        assert_eq!(resolved.probe.timeout, None);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[probe]
command = "dotnet"
args = ["--list-sdks"]
timeout_secs = 10

[terminal]
standard_key_sequence_resolvers = false
allocate_footer = true
"#;
        let config: LazyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.probe.command.as_deref(), Some("dotnet"));
        assert_eq!(config.probe.args, Some(vec!["--list-sdks".to_string()]));
        assert_eq!(config.probe.timeout_secs, Some(10));
        assert_eq!(config.terminal.standard_key_sequence_resolvers, Some(false));
        assert_eq!(config.terminal.allocate_footer, Some(true));
        assert!(config.terminal.manual_flush.is_none());
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing — everything else stays default
        let toml_str = r#"
[terminal]
manual_flush = true
"#;
        let config: LazyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.terminal.manual_flush, Some(true));
        assert!(config.probe.command.is_none());
        assert!(config.probe.args.is_none());
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let dir = std::env::temp_dir().join(format!("lazydotnet-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[terminal\nallocate_footer = ").unwrap();

        let result = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("lazydotnet-does-not-exist/config.toml");
        assert!(matches!(load_config_from(&path), Err(ConfigError::Io(_))));
    }
}
