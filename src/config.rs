//! Runtime configuration.
//!
//! Every field has a default, so an absent file or an empty table yields a
//! working configuration. Environment variables override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where the portal lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Page loaded at the start of every query.
    #[serde(default = "default_root_url")]
    pub root_url: String,

    /// Base for resolving relative result links.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Upper bound for each element wait, in seconds.
    #[serde(default = "default_element_timeout")]
    pub element_timeout_secs: u64,

    /// Upper bound for the advanced search panel transition, in seconds.
    #[serde(default = "default_panel_settle")]
    pub panel_settle_secs: u64,

    /// Upper bound for results to render after submitting, in seconds.
    #[serde(default = "default_results_settle")]
    pub results_settle_secs: u64,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Marker the portal renders when a search matches nothing.
    #[serde(default = "default_no_results_xpath")]
    pub no_results_xpath: String,
}

impl PortalConfig {
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.element_timeout_secs)
    }

    pub fn panel_settle(&self) -> Duration {
        Duration::from_secs(self.panel_settle_secs)
    }

    pub fn results_settle(&self) -> Duration {
        Duration::from_secs(self.results_settle_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            origin: default_origin(),
            element_timeout_secs: default_element_timeout(),
            panel_settle_secs: default_panel_settle(),
            results_settle_secs: default_results_settle(),
            poll_interval_ms: default_poll_interval(),
            no_results_xpath: default_no_results_xpath(),
        }
    }
}

fn default_root_url() -> String {
    "https://pncp.gov.br/app/editais".to_string()
}

fn default_origin() -> String {
    "https://pncp.gov.br".to_string()
}

fn default_element_timeout() -> u64 {
    30
}

fn default_panel_settle() -> u64 {
    2
}

fn default_results_settle() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    250
}

fn default_no_results_xpath() -> String {
    "//*[contains(normalize-space(text()), 'Nenhum registro encontrado')]".to_string()
}

/// Headless Chrome launch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Chrome executable; autodetected when unset.
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Chrome is killed after this long without DevTools traffic.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            chrome_path: None,
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

fn default_headless() -> bool {
    true
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36".to_string()
}

fn default_idle_timeout() -> u64 {
    90
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Screenshot written when a query fails; `None` disables it.
    #[serde(default = "default_screenshot_path")]
    pub screenshot_path: Option<PathBuf>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            screenshot_path: default_screenshot_path(),
        }
    }
}

fn default_screenshot_path() -> Option<PathBuf> {
    Some(PathBuf::from("error_screenshot.png"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", port))?;
        }
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(path) = var("CHROME_PATH") {
            self.browser.chrome_path = Some(PathBuf::from(path));
        }
        if let Some(headless) = var("BID_SCOUT_HEADLESS") {
            self.browser.headless = !matches!(
                headless.to_lowercase().as_str(),
                "0" | "false" | "no" | "off"
            );
        }
        if let Some(path) = var("BID_SCOUT_SCREENSHOT") {
            self.diagnostics.screenshot_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.portal.root_url, "https://pncp.gov.br/app/editais");
        assert_eq!(config.portal.origin, "https://pncp.gov.br");
        assert_eq!(config.portal.element_timeout(), Duration::from_secs(30));
        assert!(config.browser.headless);
        assert_eq!(
            (config.browser.window_width, config.browser.window_height),
            (1920, 1080)
        );
        assert_eq!(
            config.diagnostics.screenshot_path,
            Some(PathBuf::from("error_screenshot.png"))
        );
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bid-scout.toml");
        std::fs::write(
            &path,
            r#"
[portal]
element_timeout_secs = 5

[server]
port = 9090
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.portal.element_timeout_secs, 5);
        assert_eq!(config.portal.results_settle_secs, 10);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.browser.headless);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Config::from_file(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .apply_overrides(overrides(&[
                ("PORT", "3000"),
                ("BID_SCOUT_HEADLESS", "false"),
                ("BID_SCOUT_SCREENSHOT", ""),
                ("CHROME_PATH", "/usr/bin/chromium"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert!(!config.browser.headless);
        assert_eq!(config.diagnostics.screenshot_path, None);
        assert_eq!(
            config.browser.chrome_path,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = Config::default().apply_overrides(overrides(&[("PORT", "http")]));
        assert!(result.is_err());
    }
}
