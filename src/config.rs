use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::client::{Contact, Month, PreviousOutcome};
use crate::hanoi::state::DISK_CHOICES;
use crate::optimizer::{FailurePolicy, SearchSpace};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hanoi: HanoiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_scoreboard_path")]
    pub scoreboard_path: String,
    #[serde(default = "default_history_path")]
    pub history_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_contact_options")]
    pub contact: Vec<Contact>,
    #[serde(default = "default_month_options")]
    pub month: Vec<Month>,
    #[serde(default = "default_duration_options")]
    pub duration: Vec<u32>,
    #[serde(default = "default_campaign_options")]
    pub campaign: Vec<u32>,
    #[serde(default = "default_poutcome_options")]
    pub poutcome: Vec<PreviousOutcome>,
    #[serde(default)]
    pub on_scoring_error: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HanoiConfig {
    #[serde(default = "default_min_disks")]
    pub min_disks: u32,
    #[serde(default = "default_max_disks")]
    pub max_disks: u32,
    #[serde(default = "default_step_secs")]
    pub step_secs: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub model_path: Option<String>,
    pub model_url: Option<String>,
    pub scoreboard_path: Option<String>,
    pub history_path: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/banksync/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.model_path {
            self.model.path = path;
        }
        if let Some(url) = overrides.model_url {
            self.model.url = url;
        }
        if let Some(path) = overrides.scoreboard_path {
            self.storage.scoreboard_path = path;
        }
        if let Some(path) = overrides.history_path {
            self.storage.history_path = path;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn default_template() -> String {
        let template = r#"[model]
# Local exported logistic model (JSON). Leave empty to use the built-in coefficients.
path = ""
# Remote model server; takes precedence over `path` when set.
url = ""
timeout_secs = 10

[storage]
scoreboard_path = "~/.local/share/banksync/scoreboard.json"
history_path = "~/.local/share/banksync/move_history.json"

[search]
contact = ["cellular", "telephone", "unknown"]
month = ["jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec"]
duration = [100, 300, 500, 1000, 1500]
campaign = [1, 2, 3, 5, 7]
poutcome = ["success", "failure", "other", "unknown"]
# "skip" treats a failed candidate as score 0; "escalate" aborts the search.
on_scoring_error = "skip"

[prediction]
success_threshold = 0.5

[server]
host = "127.0.0.1"
port = 3001

[hanoi]
min_disks = 3
max_disks = 8
step_secs = 0.4
"#;
        template.to_string()
    }
}

impl ModelConfig {
    pub fn resolved_path(&self) -> PathBuf {
        expand_tilde(&self.path)
    }
}

impl StorageConfig {
    pub fn resolved_scoreboard_path(&self) -> PathBuf {
        expand_tilde(&self.scoreboard_path)
    }

    pub fn resolved_history_path(&self) -> PathBuf {
        expand_tilde(&self.history_path)
    }
}

impl SearchConfig {
    pub fn space(&self) -> SearchSpace {
        SearchSpace {
            contact: self.contact.clone(),
            month: self.month.clone(),
            duration: self.duration.clone(),
            campaign: self.campaign.clone(),
            poutcome: self.poutcome.clone(),
        }
    }
}

impl HanoiConfig {
    /// Disk counts outside the configured range are clamped before any game
    /// or solver sees them. The configured bounds themselves never leave
    /// `DISK_CHOICES`, so a clamped count is always one the menu offers.
    pub fn clamp_disks(&self, requested: u32) -> u32 {
        let (low, high) = self.disk_range();
        requested.clamp(low, high)
    }

    /// Configured `(min, max)` disks, ordered and limited to `DISK_CHOICES`.
    pub fn disk_range(&self) -> (u32, u32) {
        let floor = *DISK_CHOICES.start();
        let ceiling = *DISK_CHOICES.end();
        let low = self.min_disks.min(self.max_disks).clamp(floor, ceiling);
        let high = self.max_disks.max(self.min_disks).clamp(floor, ceiling);
        (low, high)
    }

    pub fn step_secs(&self) -> f64 {
        if self.step_secs.is_finite() && self.step_secs > 0.0 {
            self.step_secs
        } else {
            default_step_secs()
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            scoreboard_path: default_scoreboard_path(),
            history_path: default_history_path(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            contact: default_contact_options(),
            month: default_month_options(),
            duration: default_duration_options(),
            campaign: default_campaign_options(),
            poutcome: default_poutcome_options(),
            on_scoring_error: FailurePolicy::default(),
        }
    }
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            success_threshold: default_success_threshold(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HanoiConfig {
    fn default() -> Self {
        Self {
            min_disks: default_min_disks(),
            max_disks: default_max_disks(),
            step_secs: default_step_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_scoreboard_path() -> String {
    "~/.local/share/banksync/scoreboard.json".to_string()
}

fn default_history_path() -> String {
    "~/.local/share/banksync/move_history.json".to_string()
}

fn default_contact_options() -> Vec<Contact> {
    SearchSpace::default().contact
}

fn default_month_options() -> Vec<Month> {
    SearchSpace::default().month
}

fn default_duration_options() -> Vec<u32> {
    SearchSpace::default().duration
}

fn default_campaign_options() -> Vec<u32> {
    SearchSpace::default().campaign
}

fn default_poutcome_options() -> Vec<PreviousOutcome> {
    SearchSpace::default().poutcome
}

fn default_success_threshold() -> f64 {
    0.5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_min_disks() -> u32 {
    3
}

fn default_max_disks() -> u32 {
    8
}

fn default_step_secs() -> f64 {
    0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hanoi::state::{transition, Event, Screen};

    #[test]
    fn template_parses_to_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template parses");
        let defaults = Config::default();
        assert_eq!(parsed.search.space(), defaults.search.space());
        assert_eq!(parsed.search.on_scoring_error, FailurePolicy::Skip);
        assert_eq!(parsed.server.port, defaults.server.port);
        assert_eq!(parsed.hanoi.max_disks, 8);
        assert!(parsed.model.path.is_empty());
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str(
            r#"
[search]
month = ["mar", "oct"]
on_scoring_error = "escalate"
"#,
        )
        .expect("partial config parses");
        assert_eq!(parsed.search.month, vec![Month::Mar, Month::Oct]);
        assert_eq!(parsed.search.contact.len(), 3);
        assert_eq!(parsed.search.on_scoring_error, FailurePolicy::Escalate);
        assert!((parsed.prediction.success_threshold - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clamps_disk_counts_into_range() {
        let hanoi = HanoiConfig::default();
        assert_eq!(hanoi.clamp_disks(0), 3);
        assert_eq!(hanoi.clamp_disks(5), 5);
        assert_eq!(hanoi.clamp_disks(64), 8);
    }

    #[test]
    fn configured_disk_bounds_stay_within_menu_choices() {
        let wide = HanoiConfig {
            min_disks: 1,
            max_disks: 10,
            ..HanoiConfig::default()
        };
        assert_eq!(wide.clamp_disks(10), 8);
        assert_eq!(wide.clamp_disks(1), 3);
        assert_eq!(wide.disk_range(), (3, 8));

        let above = HanoiConfig {
            min_disks: 10,
            max_disks: 12,
            ..HanoiConfig::default()
        };
        assert_eq!(above.clamp_disks(4), 8);

        for requested in 0..=20 {
            let disks = wide.clamp_disks(requested);
            assert!(
                transition(Screen::Menu, &Event::ChooseDisks(disks), None).is_some(),
                "{disks} disks rejected by the menu"
            );
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = Config::load(Some(&dir.path().join("absent.toml"))).expect("load");
        assert_eq!(config.hanoi.min_disks, 3);
    }
}
