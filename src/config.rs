//! Configuration loading for unraid-mcp.
//!
//! Settings come from an optional JSON file and from environment variables,
//! with the environment winning field by field:
//!
//! 1. **JSON file** via `--config <path>` CLI flag, or the
//!    `UNRAID_MCP_CONFIG` environment variable
//! 2. **Environment variables**: `UNRAID_API_URL`, `UNRAID_API_KEY`,
//!    `UNRAID_VERIFY_SSL`, `UNRAID_TIMEOUT_{DEFAULT,EXTENDED,FAST}_SECS`,
//!    `UNRAID_MAX_RETRIES`, `UNRAID_RETRY_BACKOFF_MS`,
//!    `UNRAID_ALLOW_DESTRUCTIVE_<TOOL>` and `UNRAID_LOG_LEVEL`
//!
//! See `unraid-mcp.example.json` for the file format.

use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capabilities::CapabilitySet;
use crate::client::{RetryPolicy, TimeoutPolicy};
use crate::gate::capability_env_var;
use crate::registry::Tool;
use crate::transport::TlsPolicy;

/// Bump this when the config format changes (new required fields, renamed keys, etc.).
/// unraid-mcp will warn if the on-disk version is older, so users know to update.
pub const CONFIG_VERSION: u32 = 1;

/// Retries above this are almost certainly a typo.
const MAX_RETRIES_LIMIT: u32 = 10;

/// CLI arguments parsed by `clap`.
#[derive(Parser)]
#[command(
    name = "unraid-mcp",
    version,
    about = "MCP server for the Unraid GraphQL API"
)]
pub struct Cli {
    /// Path to config file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level or tracing filter (overridden by RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Raw JSON config file structure.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Config format version, checked against `CONFIG_VERSION` to detect stale files.
    pub config_version: Option<u32>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub verify_ssl: Option<VerifySsl>,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Tool name to destructive-action flag.
    #[serde(default)]
    pub allow_destructive: HashMap<String, bool>,
    pub log_level: Option<String>,
}

/// `true`, `false`, or a path to a CA bundle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum VerifySsl {
    Flag(bool),
    CaBundle(PathBuf),
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct TimeoutSettings {
    pub default_secs: Option<u64>,
    pub extended_secs: Option<u64>,
    pub fast_secs: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: Option<u32>,
    pub backoff_ms: Option<u64>,
}

/// Validated configuration ready for use by the engine.
///
/// Deliberately not `Debug`: it holds the API key.
pub struct ResolvedConfig {
    pub endpoint: String,
    pub api_key: String,
    pub tls: TlsPolicy,
    pub timeouts: TimeoutPolicy,
    pub retry: RetryPolicy,
    pub capabilities: CapabilitySet,
    pub log_level: String,
    /// File the settings were read from, watched for capability changes.
    pub source: Option<PathBuf>,
    /// Problems worth reporting once logging is up.
    pub warnings: Vec<String>,
}

/// Load and validate configuration from CLI args, env vars, and config file.
pub fn load_config(cli: &Cli) -> Result<ResolvedConfig, String> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("UNRAID_MCP_CONFIG").map(PathBuf::from))
        .map(|p| expand_tilde(&p));

    let mut warnings = Vec::new();
    let file = match &path {
        Some(p) => {
            let file = read_file(p)?;
            if let Some(w) = version_warning(p, file.config_version) {
                warnings.push(w);
            }
            file
        }
        None => FileConfig::default(),
    };

    let mut config = resolve(file, &process_env, path)?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    warnings.append(&mut config.warnings);
    config.warnings = warnings;
    Ok(config)
}

/// Destructive-action flags from the text of the config file at `path`.
///
/// Environment overrides still apply, matching startup.
pub fn capabilities_from_contents(path: &Path, contents: &str) -> Result<CapabilitySet, String> {
    let file = parse_file(path, contents)?;
    capabilities(&file.allow_destructive, &process_env)
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Expand a leading `~` to `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn read_file(path: &Path) -> Result<FileConfig, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
    parse_file(path, &contents)
}

fn parse_file(path: &Path, contents: &str) -> Result<FileConfig, String> {
    serde_json::from_str(contents)
        .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
}

fn version_warning(path: &Path, version: Option<u32>) -> Option<String> {
    match version {
        None => Some(format!(
            "{} has no config_version field (expected {}). \
             Config may be outdated; check unraid-mcp.example.json for the current format.",
            path.display(),
            CONFIG_VERSION
        )),
        Some(v) if v < CONFIG_VERSION => Some(format!(
            "{} has config_version {} but unraid-mcp expects {}. \
             Config may be outdated; check unraid-mcp.example.json for the current format.",
            path.display(),
            v,
            CONFIG_VERSION
        )),
        _ => None,
    }
}

/// Merge file settings with `env` lookups into a validated config.
pub fn resolve(
    file: FileConfig,
    env: &dyn Fn(&str) -> Option<String>,
    source: Option<PathBuf>,
) -> Result<ResolvedConfig, String> {
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let url = non_empty("UNRAID_API_URL")
        .or(file.api_url)
        .ok_or("No API URL configured: set UNRAID_API_URL or api_url in the config file")?;
    let endpoint = graphql_endpoint(&url)?;

    let api_key = non_empty("UNRAID_API_KEY")
        .or(file.api_key)
        .filter(|k| !k.trim().is_empty())
        .ok_or("No API key configured: set UNRAID_API_KEY or api_key in the config file")?;

    let tls = match non_empty("UNRAID_VERIFY_SSL") {
        Some(v) => parse_verify_ssl(&v),
        None => match file.verify_ssl {
            None | Some(VerifySsl::Flag(true)) => TlsPolicy::Verify,
            Some(VerifySsl::Flag(false)) => TlsPolicy::Skip,
            Some(VerifySsl::CaBundle(path)) => TlsPolicy::CustomCa(expand_tilde(&path)),
        },
    };

    let defaults = TimeoutPolicy::default();
    let timeouts = TimeoutPolicy {
        default: seconds(
            "UNRAID_TIMEOUT_DEFAULT_SECS",
            non_empty("UNRAID_TIMEOUT_DEFAULT_SECS"),
            file.timeouts.default_secs,
        )?
        .unwrap_or(defaults.default),
        extended: seconds(
            "UNRAID_TIMEOUT_EXTENDED_SECS",
            non_empty("UNRAID_TIMEOUT_EXTENDED_SECS"),
            file.timeouts.extended_secs,
        )?
        .unwrap_or(defaults.extended),
        fast: seconds(
            "UNRAID_TIMEOUT_FAST_SECS",
            non_empty("UNRAID_TIMEOUT_FAST_SECS"),
            file.timeouts.fast_secs,
        )?
        .unwrap_or(defaults.fast),
    };

    let mut warnings = Vec::new();
    if timeouts.extended < timeouts.default {
        warnings.push(format!(
            "extended timeout ({}s) is shorter than the default timeout ({}s)",
            timeouts.extended.as_secs(),
            timeouts.default.as_secs()
        ));
    }

    let retry_defaults = RetryPolicy::default();
    let max_retries = match non_empty("UNRAID_MAX_RETRIES") {
        Some(v) => v
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("UNRAID_MAX_RETRIES is not a whole number: {}", v))?,
        None => file.retry.max_retries.unwrap_or(retry_defaults.max_retries),
    };
    if max_retries > MAX_RETRIES_LIMIT {
        return Err(format!(
            "max_retries {} exceeds the limit of {}",
            max_retries, MAX_RETRIES_LIMIT
        ));
    }
    let backoff = match non_empty("UNRAID_RETRY_BACKOFF_MS") {
        Some(v) => Duration::from_millis(
            v.trim()
                .parse::<u64>()
                .map_err(|_| format!("UNRAID_RETRY_BACKOFF_MS is not a whole number: {}", v))?,
        ),
        None => file
            .retry
            .backoff_ms
            .map(Duration::from_millis)
            .unwrap_or(retry_defaults.backoff),
    };

    let capabilities = capabilities(&file.allow_destructive, env)?;

    let log_level = non_empty("UNRAID_LOG_LEVEL")
        .or(file.log_level)
        .unwrap_or_else(|| "info".to_string());

    Ok(ResolvedConfig {
        endpoint,
        api_key,
        tls,
        timeouts,
        retry: RetryPolicy {
            max_retries,
            backoff,
        },
        capabilities,
        log_level,
        source,
        warnings,
    })
}

/// File flags first, then `UNRAID_ALLOW_DESTRUCTIVE_<TOOL>` overrides.
fn capabilities(
    file_flags: &HashMap<String, bool>,
    env: &dyn Fn(&str) -> Option<String>,
) -> Result<CapabilitySet, String> {
    let mut set = CapabilitySet::none();
    for (name, enabled) in file_flags {
        let tool = Tool::parse(name).ok_or_else(|| {
            format!(
                "allow_destructive: unknown tool '{}' (expected one of: {})",
                name,
                Tool::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })?;
        set.set(tool, *enabled);
    }
    for tool in Tool::ALL {
        let key = capability_env_var(*tool);
        if let Some(v) = env(&key).filter(|v| !v.trim().is_empty()) {
            let enabled = parse_bool(&v).ok_or_else(|| format!("{} must be true or false", key))?;
            set.set(*tool, enabled);
        }
    }
    Ok(set)
}

/// Normalize a base URL to the GraphQL endpoint.
pub fn graphql_endpoint(url: &str) -> Result<String, String> {
    let url = url.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!(
            "API URL must start with http:// or https://: {}",
            url
        ));
    }
    if url.ends_with("/graphql") {
        Ok(url.to_string())
    } else {
        Ok(format!("{}/graphql", url))
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_verify_ssl(v: &str) -> TlsPolicy {
    match parse_bool(v) {
        Some(true) => TlsPolicy::Verify,
        Some(false) => TlsPolicy::Skip,
        None => TlsPolicy::CustomCa(expand_tilde(Path::new(v.trim()))),
    }
}

fn seconds(
    key: &str,
    env_value: Option<String>,
    file_value: Option<u64>,
) -> Result<Option<Duration>, String> {
    let secs = match env_value {
        Some(v) => Some(
            v.trim()
                .parse::<u64>()
                .map_err(|_| format!("{} is not a whole number of seconds: {}", key, v))?,
        ),
        None => file_value,
    };
    match secs {
        Some(0) => Err(format!("{} must be greater than zero", key)),
        Some(s) => Ok(Some(Duration::from_secs(s))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("UNRAID_API_URL", "https://tower.local"),
            ("UNRAID_API_KEY", "secret"),
        ]
    }

    #[test]
    fn env_only_with_defaults() {
        let cfg = resolve(FileConfig::default(), &env_of(&minimal()), None).unwrap();
        assert_eq!(cfg.endpoint, "https://tower.local/graphql");
        assert_eq!(cfg.api_key, "secret");
        assert_eq!(cfg.tls, TlsPolicy::Verify);
        assert_eq!(cfg.timeouts, TimeoutPolicy::default());
        assert_eq!(cfg.retry, RetryPolicy::default());
        assert_eq!(cfg.capabilities, CapabilitySet::none());
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.warnings.is_empty());
    }

    #[test]
    fn missing_url_or_key() {
        let err = resolve(
            FileConfig::default(),
            &env_of(&[("UNRAID_API_KEY", "k")]),
            None,
        )
        .err()
        .unwrap();
        assert!(err.contains("UNRAID_API_URL"));

        let err = resolve(
            FileConfig::default(),
            &env_of(&[("UNRAID_API_URL", "http://x"), ("UNRAID_API_KEY", "  ")]),
            None,
        )
        .err()
        .unwrap();
        assert!(err.contains("UNRAID_API_KEY"));
    }

    #[test]
    fn endpoint_normalization() {
        assert_eq!(
            graphql_endpoint("http://10.0.0.5/graphql/").unwrap(),
            "http://10.0.0.5/graphql"
        );
        assert_eq!(
            graphql_endpoint("https://tower:8443/").unwrap(),
            "https://tower:8443/graphql"
        );
        assert!(graphql_endpoint("tower.local").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "config_version": 1,
                "api_url": "https://file.local",
                "api_key": "from-file",
                "verify_ssl": false,
                "timeouts": {"default_secs": 10, "extended_secs": 300},
                "retry": {"max_retries": 2, "backoff_ms": 250},
                "allow_destructive": {"docker": true, "vm": true},
                "log_level": "debug"
            }"#,
        )
        .unwrap();
        let env = env_of(&[
            ("UNRAID_API_KEY", "from-env"),
            ("UNRAID_TIMEOUT_DEFAULT_SECS", "20"),
            ("UNRAID_ALLOW_DESTRUCTIVE_VM", "false"),
            ("UNRAID_ALLOW_DESTRUCTIVE_KEYS", "1"),
        ]);
        let cfg = resolve(file, &env, None).unwrap();
        assert_eq!(cfg.endpoint, "https://file.local/graphql");
        assert_eq!(cfg.api_key, "from-env");
        assert_eq!(cfg.tls, TlsPolicy::Skip);
        assert_eq!(cfg.timeouts.default, Duration::from_secs(20));
        assert_eq!(cfg.timeouts.extended, Duration::from_secs(300));
        assert_eq!(cfg.timeouts.fast, Duration::from_secs(5));
        assert_eq!(cfg.retry.max_retries, 2);
        assert_eq!(cfg.retry.backoff, Duration::from_millis(250));
        assert!(cfg.capabilities.allows_destructive(Tool::Docker));
        assert!(!cfg.capabilities.allows_destructive(Tool::Vm));
        assert!(cfg.capabilities.allows_destructive(Tool::Keys));
        assert_eq!(cfg.log_level, "debug");
    }

    #[test]
    fn verify_ssl_forms() {
        let file: FileConfig =
            serde_json::from_str(r#"{"verify_ssl": "/etc/ssl/unraid-ca.pem"}"#).unwrap();
        let cfg = resolve(file, &env_of(&minimal()), None).unwrap();
        assert_eq!(
            cfg.tls,
            TlsPolicy::CustomCa(PathBuf::from("/etc/ssl/unraid-ca.pem"))
        );

        assert_eq!(parse_verify_ssl("FALSE"), TlsPolicy::Skip);
        assert_eq!(parse_verify_ssl("yes"), TlsPolicy::Verify);
    }

    #[test]
    fn rejects_bad_values() {
        let mut env = minimal();
        env.push(("UNRAID_TIMEOUT_FAST_SECS", "0"));
        assert!(resolve(FileConfig::default(), &env_of(&env), None).is_err());

        let mut env = minimal();
        env.push(("UNRAID_MAX_RETRIES", "lots"));
        assert!(resolve(FileConfig::default(), &env_of(&env), None).is_err());

        let mut env = minimal();
        env.push(("UNRAID_MAX_RETRIES", "50"));
        assert!(resolve(FileConfig::default(), &env_of(&env), None).is_err());

        let mut env = minimal();
        env.push(("UNRAID_ALLOW_DESTRUCTIVE_DOCKER", "maybe"));
        assert!(resolve(FileConfig::default(), &env_of(&env), None).is_err());
    }

    #[test]
    fn unknown_tool_in_file_flags() {
        let file: FileConfig =
            serde_json::from_str(r#"{"allow_destructive": {"plugins": true}}"#).unwrap();
        let err = resolve(file, &env_of(&minimal()), None).err().unwrap();
        assert!(err.contains("plugins"));
    }

    #[test]
    fn unknown_file_keys_rejected() {
        assert!(serde_json::from_str::<FileConfig>(r#"{"api_uri": "x"}"#).is_err());
    }

    #[test]
    fn short_extended_timeout_warns() {
        let mut env = minimal();
        env.push(("UNRAID_TIMEOUT_EXTENDED_SECS", "10"));
        let cfg = resolve(FileConfig::default(), &env_of(&env), None).unwrap();
        assert_eq!(cfg.warnings.len(), 1);
    }

    #[test]
    fn version_warnings() {
        let p = Path::new("/tmp/unraid-mcp.json");
        assert!(version_warning(p, None).is_some());
        assert!(version_warning(p, Some(0)).is_some());
        assert!(version_warning(p, Some(CONFIG_VERSION)).is_none());
    }
}
