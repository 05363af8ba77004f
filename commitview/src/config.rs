//! Configuration file and CLI overrides.
//!
//! Values come from `$XDG_CONFIG_HOME/commitview/config.toml` (falling back to
//! `~/.config/commitview/config.toml`), then `GITHUB_TOKEN`, then command-line
//! flags, later sources winning. A missing or unparsable file is a soft
//! failure: defaults are used and a warning goes to stderr.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

use crate::github::client::{ClientOptions, DEFAULT_API_URL};

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "commitview", version, about = "Show a GitHub commit and its comments")]
pub struct Cli {
    /// Repository owner (user or organisation).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Commit hash.
    pub sha: String,
    /// Comment to focus once loaded.
    #[arg(long = "comment", value_name = "ID")]
    pub comment: Option<u64>,
    /// API base URL (GitHub Enterprise or a local mock).
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,
    /// Access token; defaults to the config file, then GITHUB_TOKEN.
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout_secs: Option<u64>,
    /// Exit as soon as content is ready instead of waiting for commands.
    #[arg(long)]
    pub exit_when_ready: bool,
    /// Log level for commitview targets (overridden by RUST_LOG).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Effective settings after merging file, environment, and flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            token: None,
            timeout_secs: 30,
            user_agent: concat!("commitview/", env!("CARGO_PKG_VERSION")).to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    /// Fills `token` from the environment value when the file left it unset.
    pub fn with_env_token(mut self, env_token: Option<String>) -> Self {
        if self.token.is_none() {
            self.token = env_token.filter(|t| !t.trim().is_empty());
        }
        self
    }

    /// Applies command-line overrides.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.api_url {
            self.api_url = url.clone();
        }
        if let Some(token) = &cli.token {
            self.token = Some(token.clone());
        }
        if let Some(secs) = cli.timeout_secs {
            self.timeout_secs = secs;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
        self
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

/// Returns the path to the commitview config file.
///
/// Prefers `$XDG_CONFIG_HOME/commitview/config.toml`; falls back to
/// `~/.config/commitview/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("commitview").join("config.toml")
}

/// Loads the config file at `path`. Never fails.
///
/// Runs before logging is initialised (the log level lives in this file), so
/// parse errors are reported with `eprintln!`.
pub fn load_config_from(path: &Path) -> Config {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return Config::default(),
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("commitview: config parse error in {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Loads the effective configuration for this process.
pub fn load_config(cli: &Cli) -> Config {
    load_config_from(&config_path())
        .with_env_token(std::env::var("GITHUB_TOKEN").ok())
        .apply_cli(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["commitview", "octocat", "hello-world", "6dcb09b"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "https://api.github.com");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let file = write_config("api_url = \"https://ghe.example.com/api/v3\"\ntimeout_secs = 5\n");
        let config = load_config_from(file.path());
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log_level, "info");
        assert!(config.token.is_none());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let file = write_config("timeout_secs = \"soon\"");
        assert_eq!(load_config_from(file.path()), Config::default());
    }

    #[test]
    fn file_token_wins_over_environment() {
        let file = write_config("token = \"from-file\"");
        let config = load_config_from(file.path()).with_env_token(Some("from-env".into()));
        assert_eq!(config.token.as_deref(), Some("from-file"));

        let config = Config::default().with_env_token(Some("from-env".into()));
        assert_eq!(config.token.as_deref(), Some("from-env"));

        let config = Config::default().with_env_token(Some("  ".into()));
        assert!(config.token.is_none());
    }

    #[test]
    fn cli_flags_override_everything() {
        let cli = cli(&["--comment", "5", "--api-url", "http://localhost:1234", "--token", "t", "--timeout", "3"]);
        assert_eq!(cli.comment, Some(5));

        let config = Config { token: Some("file".into()), ..Config::default() }.apply_cli(&cli);
        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(config.token.as_deref(), Some("t"));
        assert_eq!(config.client_options().timeout, Duration::from_secs(3));
    }

    #[test]
    fn positional_arguments_are_required() {
        assert!(Cli::try_parse_from(["commitview", "octocat"]).is_err());
        let cli = cli(&["--exit-when-ready"]);
        assert!(cli.exit_when_ready);
        assert_eq!(cli.comment, None);
    }
}
