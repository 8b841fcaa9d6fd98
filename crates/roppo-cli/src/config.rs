// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roppo_app::UpdateNote;
use roppo_notify::ReportSettings;
use roppo_tui::PanelContent;
use roppo_viewer::{Opener, RenderMode};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::Date;
use time::macros::format_description;
use tracing_subscriber::EnvFilter;

const CONFIG_VERSION: i64 = 1;
pub const DEFAULT_ASSISTANT_URL: &str = "https://udify.app/chatbot/zP13RfYRyo8rOxis";
pub const DEFAULT_SISTER_SITE_URL: &str = "https://orekansa.streamlit.app/";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_TIMEOUT: &str = "10s";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub viewer: Viewer,
    #[serde(default)]
    pub report: Report,
    #[serde(default)]
    pub assistant: Assistant,
    #[serde(default)]
    pub home: Home,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            catalog: Catalog::default(),
            viewer: Viewer::default(),
            report: Report::default(),
            assistant: Assistant::default(),
            home: Home::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Viewer {
    pub pdf_viewer_base: Option<String>,
    pub mode: Option<String>,
    pub command: Option<String>,
    pub fetch_timeout: Option<String>,
}

impl Default for Viewer {
    fn default() -> Self {
        Self {
            pdf_viewer_base: Some(roppo_viewer::DEFAULT_PDF_VIEWER_BASE.to_owned()),
            mode: Some(RenderMode::Remote.as_str().to_owned()),
            command: None,
            fetch_timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub enabled: Option<bool>,
    pub api_key: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            enabled: Some(true),
            api_key: None,
            from_address: None,
            to_address: None,
            base_url: Some(roppo_notify::DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assistant {
    pub url: Option<String>,
}

impl Default for Assistant {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_ASSISTANT_URL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Home {
    pub sister_site_url: Option<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
}

impl Default for Home {
    fn default() -> Self {
        Self {
            sister_site_url: Some(DEFAULT_SISTER_SITE_URL.to_owned()),
            updates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub date: String,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROPPO_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROPPO_CONFIG_PATH to the config file")
        })?;

        Ok(config_root.join(roppo_catalog::APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top; run `roppo --print-example-config` for a template",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(catalog_path) = &self.catalog.path
            && catalog_path.trim().is_empty()
        {
            bail!(
                "catalog.path in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        self.viewer_mode()
            .with_context(|| format!("invalid [viewer] in {}", path.display()))?;
        roppo_viewer::parse_viewer_base(self.pdf_viewer_base())
            .with_context(|| format!("invalid viewer.pdf_viewer_base in {}", path.display()))?;
        self.viewer_opener()
            .with_context(|| format!("invalid viewer.command in {}", path.display()))?;

        for (name, raw) in [
            ("viewer.fetch_timeout", self.viewer.fetch_timeout.as_deref()),
            ("report.timeout", self.report.timeout.as_deref()),
        ] {
            if let Some(raw) = raw {
                let parsed = parse_duration(raw)?;
                if parsed <= Duration::ZERO {
                    bail!("{name} in {} must be positive, got {raw}", path.display());
                }
            }
        }

        if self.report_base_url().is_empty() {
            bail!(
                "report.base_url in {} must not be empty; remove it to use {}",
                path.display(),
                roppo_notify::DEFAULT_BASE_URL
            );
        }

        self.update_notes()
            .with_context(|| format!("invalid [[home.updates]] in {}", path.display()))?;

        EnvFilter::try_new(self.log_level()).map_err(|error| {
            anyhow!(
                "log.level {:?} in {} is not a valid filter ({error}); use a level such as warn or debug",
                self.log_level(),
                path.display()
            )
        })?;

        Ok(())
    }

    /// `ROPPO_CATALOG_PATH` applies only when the config names no path.
    pub fn catalog_path(&self, base_dir: &Path) -> PathBuf {
        let from_env = env::var("ROPPO_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let configured = self.catalog.path.clone().or(from_env);
        roppo_catalog::resolve_catalog_path(configured.as_deref(), base_dir)
    }

    pub fn viewer_mode(&self) -> Result<RenderMode> {
        let raw = self
            .viewer
            .mode
            .as_deref()
            .unwrap_or(RenderMode::Remote.as_str());
        RenderMode::parse(raw).ok_or_else(|| {
            anyhow!("viewer.mode {raw:?} is not supported; use \"remote\" or \"local\"")
        })
    }

    pub fn pdf_viewer_base(&self) -> &str {
        self.viewer
            .pdf_viewer_base
            .as_deref()
            .unwrap_or(roppo_viewer::DEFAULT_PDF_VIEWER_BASE)
    }

    pub fn viewer_opener(&self) -> Result<Opener> {
        match &self.viewer.command {
            Some(command) => Opener::parse(command),
            None => Ok(Opener::platform_default()),
        }
    }

    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_duration(self.viewer.fetch_timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// The API key falls back to `SENDGRID_API_KEY` so it can stay out of
    /// the file.
    pub fn report_settings(&self) -> ReportSettings {
        let api_key = self.report.api_key.clone().or_else(|| {
            env::var("SENDGRID_API_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty())
        });
        ReportSettings {
            enabled: self.report.enabled.unwrap_or(true),
            api_key,
            from_address: self.report.from_address.clone(),
            to_address: self.report.to_address.clone(),
        }
    }

    pub fn report_base_url(&self) -> &str {
        self.report
            .base_url
            .as_deref()
            .unwrap_or(roppo_notify::DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn report_timeout(&self) -> Result<Duration> {
        parse_duration(self.report.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn update_notes(&self) -> Result<Vec<UpdateNote>> {
        self.home
            .updates
            .iter()
            .map(|update| {
                Ok(UpdateNote {
                    date: parse_date(&update.date)?,
                    title: update.title.clone(),
                    url: update.url.clone(),
                })
            })
            .collect()
    }

    pub fn panel_content(&self) -> Result<PanelContent> {
        Ok(PanelContent {
            assistant_url: self
                .assistant
                .url
                .clone()
                .unwrap_or_else(|| DEFAULT_ASSISTANT_URL.to_owned()),
            sister_site_url: self
                .home
                .sister_site_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SISTER_SITE_URL.to_owned()),
            updates: self.update_notes()?,
        })
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let state_root = dirs::state_dir()
            .or_else(dirs::cache_dir)
            .ok_or_else(|| anyhow!("cannot resolve a log directory; set log.path in the config"))?;
        Ok(state_root
            .join(roppo_catalog::APP_NAME)
            .join(format!("{}.log", roppo_catalog::APP_NAME)))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roppo config\n# Place this file at: {}\n\nversion = 1\n\n[catalog]\n# Relative paths resolve against the working directory.\n# Falls back to ROPPO_CATALOG_PATH, then this default.\npath = \"{}\"\n\n[viewer]\npdf_viewer_base = \"{}\"\n# \"remote\" opens viewer URLs; \"local\" downloads PDFs and waits for `command` to exit.\nmode = \"remote\"\n# command = \"zathura\"\nfetch_timeout = \"10s\"\n\n[report]\nenabled = true\n# Prefer the SENDGRID_API_KEY environment variable over storing the key here.\n# api_key = \"SG.xxxxx\"\n# from_address = \"noreply@example.com\"\n# to_address = \"admin@example.com\"\nbase_url = \"{}\"\ntimeout = \"10s\"\n\n[assistant]\nurl = \"{}\"\n\n[home]\nsister_site_url = \"{}\"\n\n# [[home.updates]]\n# date = \"2025-04-01\"\n# title = \"監査基準報告書を追加\"\n# url = \"https://example.com/update\"\n\n[log]\nlevel = \"{}\"\n# path = \"/absolute/path/to/roppo.log\"\n",
            path.display(),
            roppo_catalog::DEFAULT_CATALOG_FILE,
            roppo_viewer::DEFAULT_PDF_VIEWER_BASE,
            roppo_notify::DEFAULT_BASE_URL,
            DEFAULT_ASSISTANT_URL,
            DEFAULT_SISTER_SITE_URL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date {raw:?}; use YYYY-MM-DD"))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
