use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use notify::{RecursiveMode::NonRecursive, Watcher};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "aviary.toml";
pub const CONFIG_PATH_ENV: &str = "AVIARY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
}

/// Console settings. The simulation's own parameters are not in here; those
/// come from the engine and the `reset` command.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    pub target_fps: u32,
    pub seed: Option<u64>,
    pub window: Window,
    pub speed: Speed,
    pub terminal: TerminalSettings,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Window {
    pub width: i32,
    pub height: i32,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Speed {
    pub initial: u32,
    pub max: u32,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TerminalSettings {
    pub scrollback: usize,
    pub font_size: i32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            seed: None,
            window: Window::default(),
            speed: Speed::default(),
            terminal: TerminalSettings::default(),
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self { initial: 1, max: 100 }
    }
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            scrollback: 500,
            font_size: 14,
        }
    }
}

impl ConsoleConfig {
    /// `$AVIARY_CONFIG`, or `aviary.toml` in the working directory.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read and parse `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::warn!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let out = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config: {:#?}", out);
        Ok(out)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

struct Shared {
    config: Mutex<ConsoleConfig>,
    updated: AtomicBool,
}

/// Reloads the config file whenever it changes on disk.
pub struct ConfigWatcher {
    _watcher: notify::RecommendedWatcher,
    shared: Arc<Shared>,
}

impl ConfigWatcher {
    /// Start watching `path`, with `initial` as the current config.
    pub fn watch(path: &Path, initial: ConsoleConfig) -> Result<Self, ConfigError> {
        let shared = Arc::new(Shared {
            config: Mutex::new(initial),
            updated: AtomicBool::new(false),
        });

        let handler_shared = Arc::clone(&shared);
        let handler_path = path.to_path_buf();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            reload_config(&handler_path, &handler_shared, res)
        })?;
        watcher.watch(path, NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            shared,
        })
    }

    /// The new config, once per reload.
    pub fn latest(&self) -> Option<ConsoleConfig> {
        if !self.shared.updated.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(*self.shared.config.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

fn reload_config(path: &Path, shared: &Shared, res: notify::Result<notify::Event>) {
    match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            match ConsoleConfig::load(path) {
                Ok(config) => {
                    log::info!("Loaded new config");
                    *shared.config.lock().unwrap_or_else(PoisonError::into_inner) = config;
                    shared.updated.store(true, Ordering::Release);
                }
                Err(err) => log::error!("Keeping previous config: {}", err),
            }
        }
        Ok(_) => {}
        Err(err) => log::error!("Failed to watch config file: {:?}", err),
    }
}
