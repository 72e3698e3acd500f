//! Configuration file: client settings plus the list of forms to submit
//!
//! Lookup order for the file:
//! 1. explicit path (`--config`)
//! 2. `HEALTH_SUBMIT_CONFIG` environment variable
//! 3. `<config dir>/health-submit/config.toml`
//!
//! `HEALTH_SUBMIT_BASE_URL` overrides `base_url` from the file.

use crate::error::{Error, Result};
use crate::form::{Form, Location};
use crate::select::Selection;
use crate::submitter::{SubmitterConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::types::Identity;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HEALTH_SUBMIT_CONFIG";

/// Environment variable overriding the service root
pub const BASE_URL_ENV: &str = "HEALTH_SUBMIT_BASE_URL";

/// Template written by `health-submit init`
pub const TEMPLATE: &str = r#"# health-submit configuration

# base_url = "https://zhxg.whut.edu.cn/yqtjwx"
timeout_secs = 30
user_agent = "random"        # or { fixed = 0 }
temperature = "random"       # or { fixed = 0 }
# log_file = "health_submit.log"

[[forms]]
nickname = ""
sn = ""
id_card = ""
province = ""
city = ""
county = ""
street = ""
in_school = true
left_region = false
"#;

/// Parsed configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Service root
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-agent choice
    #[serde(default)]
    pub user_agent: Selection,
    /// Temperature choice
    #[serde(default)]
    pub temperature: Selection,
    /// File receiving a full debug log of every run
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// People to check in, in order
    #[serde(default)]
    pub forms: Vec<FormConfig>,
}

/// One `[[forms]]` entry
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormConfig {
    /// Display name of the account
    pub nickname: String,
    /// Student serial number
    pub sn: String,
    /// Secret credential
    pub id_card: String,
    /// Province
    pub province: String,
    /// City
    pub city: String,
    /// County / district
    pub county: String,
    /// Street address
    #[serde(default)]
    pub street: String,
    /// Currently enrolled on campus
    pub in_school: bool,
    /// Has left the school's region
    pub left_region: bool,
}

impl fmt::Debug for FormConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormConfig")
            .field("nickname", &self.nickname)
            .field("sn", &self.sn)
            .field("id_card", &"<redacted>")
            .field("province", &self.province)
            .field("city", &self.city)
            .field("county", &self.county)
            .field("street", &self.street)
            .field("in_school", &self.in_school)
            .field("left_region", &self.left_region)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl FormConfig {
    /// Build the immutable form for this entry
    pub fn to_form(&self) -> Result<Form> {
        let identity = Identity {
            sn: self.sn.clone(),
            id_card: self.id_card.clone(),
            nickname: self.nickname.clone(),
        };
        let location = Location {
            province: self.province.clone(),
            city: self.city.clone(),
            county: self.county.clone(),
            street: self.street.clone(),
        };
        Form::new(&identity, location, self.in_school, self.left_region)
    }
}

impl Config {
    /// Parse config text and validate it
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Self =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;

        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Read and parse the config at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.forms.is_empty() {
            return Err(Error::Config("no [[forms]] configured".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        if let Some(form) = self.forms.iter().find(|f| f.sn.trim().is_empty()) {
            return Err(Error::Config(format!(
                "form for {:?} has an empty sn",
                form.nickname
            )));
        }
        Ok(())
    }

    /// Client settings shared by every submitter of this run
    pub fn submitter_config(&self) -> SubmitterConfig {
        SubmitterConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent,
            temperature: self.temperature,
        }
    }

    /// Forms to submit, optionally narrowed to one serial number
    pub fn forms(&self, only_sn: Option<&str>) -> Result<Vec<Form>> {
        let selected: Vec<&FormConfig> = self
            .forms
            .iter()
            .filter(|f| only_sn.is_none_or(|sn| f.sn == sn))
            .collect();

        if selected.is_empty() {
            return Err(Error::Config(format!(
                "no form with sn {}",
                only_sn.unwrap_or_default()
            )));
        }

        selected.into_iter().map(FormConfig::to_form).collect()
    }
}

/// Resolve which config file to use
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    dirs::config_dir()
        .map(|dir| dir.join("health-submit").join("config.toml"))
        .ok_or_else(|| {
            Error::Config(format!(
                "no config directory found; pass --config or set {CONFIG_ENV}"
            ))
        })
}
