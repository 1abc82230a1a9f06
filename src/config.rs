use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;

use crate::listing::controller::SEARCH_DEBOUNCE;
use crate::listing::query_state::DEFAULT_PAGE_SIZE;
use crate::listing::TrendingRange;

#[derive(Deserialize)]
pub struct Api {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub trending_limit: u32,
    pub trending_days: u32,
    pub pending_page_size: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: SEARCH_DEBOUNCE.as_millis() as u64,
            trending_limit: 20,
            trending_days: 7,
            pending_page_size: 50,
        }
    }
}

impl Defaults {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn trending_range(&self) -> TrendingRange {
        TrendingRange::from_days(self.trending_days).unwrap_or_default()
    }
}

#[derive(Deserialize, Default)]
pub struct Storage {
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub api: Api,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub storage: Storage,
    pub log: Option<Log>,
}

impl Config {
    /// Directory holding the session token and the local draft.
    pub fn data_dir(&self) -> PathBuf {
        match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir().unwrap_or_else(env::temp_dir).join("VibeWrite"),
        }
    }
}

fn parse_path(path: PathBuf) -> io::Result<PathBuf> {
    let Some(str_path) = path.to_str() else {
        return Ok(path);
    };
    if !str_path.starts_with("${exe_dir}") {
        return Ok(path);
    }

    let cur_exe = env::current_exe()?;
    let exe_dir = cur_exe
        .parent()
        .and_then(Path::to_str)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not resolve the executable directory"))?;
    Ok(PathBuf::from(str_path.replace("${exe_dir}", exe_dir)))
}

fn invalid(message: String) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, message)
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(invalid(format!("Error parsing configuration file: {}", e))),
    };

    if cfg.api.base_url.trim().is_empty() {
        return Err(invalid("api.base_url must not be empty".to_string()));
    }
    cfg.api.base_url = cfg.api.base_url.trim_end_matches('/').to_string();

    if cfg.defaults.page_size == 0 || cfg.defaults.pending_page_size == 0 || cfg.defaults.trending_limit == 0 {
        return Err(invalid("Page sizes and limits must be positive".to_string()));
    }
    if TrendingRange::from_days(cfg.defaults.trending_days).is_none() {
        return Err(invalid(format!(
            "defaults.trending_days must be 7, 14 or 30, got {}",
            cfg.defaults.trending_days
        )));
    }

    if let Some(dir) = cfg.storage.data_dir.take() {
        cfg.storage.data_dir = Some(parse_path(dir)?);
    }
    if let Some(log) = cfg.log.as_mut() {
        if let Some(location) = log.location.take() {
            log.location = Some(parse_path(location)?);
        }
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => {
            return Err(io::Error::new(
                e.kind(),
                format!("Error opening configuration file {}: {}", cfg_path.display(), e),
            ))
        }
    };

    parse_config(&cfg_content)
}
