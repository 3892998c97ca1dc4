use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "JOB_FINDER_API_URL";
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Regions offered as location filters.
pub const LOCATIONS: &[&str] = &[
    "서울", "경기", "인천", "부산", "대구", "대전", "광주", "울산", "세종", "강원", "충북", "충남",
    "전북", "전남", "경북", "경남", "제주",
];

const SOURCE_COLORS: &[(&str, Color)] = &[
    ("saramin", Color::Blue),
    ("jobkorea", Color::Green),
    ("wanted", Color::Magenta),
    ("incruit", Color::LightRed),
    ("linkedin", Color::LightBlue),
    ("remember", Color::LightMagenta),
    ("rallit", Color::Yellow),
    ("jumpit", Color::Cyan),
];

/// Badge color for a job source; unknown sources render gray.
pub fn source_color(source: &str) -> Color {
    SOURCE_COLORS
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, color)| *color)
        .unwrap_or(Color::Gray)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    /// Items per pagination window on screen.
    pub page_size: usize,
    /// `page_size` hint sent to the job service.
    pub request_page_size: u32,
    pub crawl_pages: u32,
    /// Logical pixels per terminal column.
    pub cell_width_px: u32,
    pub reveal_margin_rows: usize,
    /// Covers a full crawl of every source; the service answers only after it.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: 20,
            request_page_size: 200,
            crawl_pages: 2,
            cell_width_px: 8,
            reveal_margin_rows: 12,
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// On-disk overrides. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    api_base: Option<String>,
    page_size: Option<usize>,
    request_page_size: Option<u32>,
    crawl_pages: Option<u32>,
    cell_width_px: Option<u32>,
    reveal_margin_rows: Option<usize>,
    request_timeout_secs: Option<u64>,
}

impl Config {
    /// Resolves configuration: CLI flag > environment > config file > defaults.
    pub fn load(config_path: Option<&Path>, api_url_flag: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        let path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };
        if let Some(path) = path {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            config.apply_file(&raw)
                .with_context(|| format!("Invalid config file: {}", path.display()))?;
        }

        if let Ok(url) = env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_base = url;
            }
        }
        if let Some(url) = api_url_flag {
            config.api_base = url.to_string();
        }

        config.api_base = config.api_base.trim_end_matches('/').to_string();
        config.page_size = config.page_size.max(1);
        config.cell_width_px = config.cell_width_px.max(1);
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "jobfinder")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file: ConfigFile = serde_json::from_str(raw)?;
        if let Some(v) = file.api_base {
            self.api_base = v;
        }
        if let Some(v) = file.page_size {
            self.page_size = v;
        }
        if let Some(v) = file.request_page_size {
            self.request_page_size = v;
        }
        if let Some(v) = file.crawl_pages {
            self.crawl_pages = v;
        }
        if let Some(v) = file.cell_width_px {
            self.cell_width_px = v;
        }
        if let Some(v) = file.reveal_margin_rows {
            self.reveal_margin_rows = v;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(v);
        }
        Ok(())
    }
}
