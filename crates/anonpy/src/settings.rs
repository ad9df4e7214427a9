use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anonpy_fetch::{
    Authorization, DEFAULT_STATUS_FORCELIST, Endpoint, RetryPolicy, SessionConfig, Timeout,
};
use anyhow::{Context, Result, bail};
use home::home_dir;
use serde::{Deserialize, Serialize};

use crate::cli::app::GlobalArgs;

pub const ROOT_DIR: &str = ".anonpy";
pub const CONFIG_FILE: &str = "anonpy.toml";
pub const LOG_FILE: &str = "anonpy.log";

/// `~/.anonpy`, holding the configuration and the log file.
pub fn root_dir() -> Result<PathBuf> {
    let home = home_dir().context("Failed to get home directory")?;
    Ok(home.join(ROOT_DIR))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client:  ClientSection,
    pub server:  ServerSection,
    pub retry:   RetrySection,
    pub timeout: TimeoutSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub download_directory: String,
    pub token:              String,
    pub user_agent:         String,
    pub proxies:            String,
    pub enable_logging:     bool,
    pub log_level:          String,
    pub verbose:            bool,
    pub force:              bool,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            download_directory: "~/downloads".to_string(),
            token:              String::new(),
            user_agent:         String::new(),
            proxies:            String::new(),
            enable_logging:     false,
            log_level:          "info".to_string(),
            verbose:            true,
            force:              false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub api:      String,
    pub upload:   String,
    pub download: String,
    pub preview:  String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api:      "https://pixeldrain.com/api/".to_string(),
            upload:   "/file".to_string(),
            download: "/file/{}".to_string(),
            preview:  "/file/{}/info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub total:            i64,
    pub backoff_factor:   f64,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            total:            5,
            backoff_factor:   1.0,
            status_forcelist: DEFAULT_STATUS_FORCELIST.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSection {
    pub connect: f64,
    pub read:    f64,
}

impl Default for TimeoutSection {
    fn default() -> Self { Self { connect: 5.0, read: 5.0 } }
}

impl Settings {
    /// Read `path`, creating it with defaults first if it does not exist.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::init(path)?;
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Write the default configuration to `path`, overwriting what is there.
    pub fn init(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Merge command line values over the file values.
    pub fn resolve(&self, args: &GlobalArgs) -> Result<Effective> {
        let client = &self.client;
        let proxies = match args.proxies.as_deref() {
            Some(raw) => parse_proxies(raw)?,
            None => parse_proxies(&client.proxies)?,
        };

        Ok(Effective {
            download_directory: expand_home(&client.download_directory)?,
            token:              args.token.clone().or_else(|| non_empty(&client.token)),
            user_agent:         args.user_agent.clone().or_else(|| non_empty(&client.user_agent)),
            proxies,
            logging:            args.logging || client.enable_logging,
            log_level:          client.log_level.clone(),
            verbose:            client.verbose && !args.quiet,
            force:              args.force || client.force,
        })
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        let server = &self.server;
        Endpoint::new(&server.upload, &server.download, &server.preview)
            .context("Invalid [server] endpoint templates")
    }

    pub fn session_config(&self, effective: &Effective) -> Result<SessionConfig> {
        let timeout = Timeout::split(self.timeout.connect, self.timeout.read)
            .context("Invalid [timeout] section")?;
        let retry = RetryPolicy::new(
            self.retry.total,
            self.retry.status_forcelist.iter().copied(),
            self.retry.backoff_factor,
        )
        .context("Invalid [retry] section")?;

        let mut config = SessionConfig::new(&self.server.api)
            .with_context(|| format!("Invalid API URL {}", self.server.api))?
            .timeout(timeout)
            .retry_policy(retry);

        if let Some(user_agent) = &effective.user_agent {
            config = config.user_agent(user_agent);
        }
        if let Some(proxies) = &effective.proxies {
            config = config.proxies(proxies.clone());
        }
        if let Some(token) = &effective.token {
            config = config.token(token).credential_header(Authorization::Basic);
        }
        Ok(config)
    }
}

/// Settings after command line values were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Effective {
    pub download_directory: PathBuf,
    pub token:              Option<String>,
    pub user_agent:         Option<String>,
    /// `None` keeps the proxy environment snapshot.
    pub proxies:            Option<BTreeMap<String, String>>,
    pub logging:            bool,
    pub log_level:          String,
    pub verbose:            bool,
    pub force:              bool,
}

/// Parse `http://host:port` (used for both schemes) or
/// `http=http://a:1,https=http://b:2`.
pub fn parse_proxies(raw: &str) -> Result<Option<BTreeMap<String, String>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let mut proxies = BTreeMap::new();
    if !raw.contains('=') {
        proxies.insert("http".to_string(), raw.to_string());
        proxies.insert("https".to_string(), raw.to_string());
        return Ok(Some(proxies));
    }

    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let Some((scheme, url)) = entry.split_once('=') else {
            bail!("Invalid proxy entry '{entry}', expected scheme=url");
        };
        let scheme = scheme.trim().to_ascii_lowercase();
        if !matches!(scheme.as_str(), "http" | "https" | "all" | "no") {
            bail!("Unknown proxy scheme '{scheme}'");
        }
        proxies.insert(scheme, url.trim().to_string());
    }
    Ok(Some(proxies))
}

fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix('~') {
        Some(rest) => {
            let home = home_dir().context("Failed to get home directory")?;
            Ok(home.join(rest.trim_start_matches(['/', '\\'])))
        }
        None => Ok(PathBuf::from(path)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
