// ============================================
// src/config.rs
// 設定ファイルの構造と読み込みロジック
// ============================================

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("invalid config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// 音声まわりの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// 発音に使う言語コード (アミ語の音声がないのでインドネシア語で代用)
    pub language: String,
    /// 再生コマンド。末尾に音声ファイルのパスが付け足される
    pub player: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "id".to_string(),
            player: default_player().map(str::to_string),
        }
    }
}

/// アプリ全体の設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub question_count: usize,
    pub log_level: String,
    pub audio: AudioConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            question_count: 5,
            log_level: "info".to_string(),
            audio: AudioConfig::default(),
        }
    }
}

/// OSごとの標準的な再生コマンド
fn default_player() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        Some("afplay")
    } else if cfg!(target_os = "windows") {
        None
    } else {
        Some("ffplay -nodisp -autoexit -loglevel quiet")
    }
}

/// OSごとのディレクトリ
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("tw", "Fukumoto0141", "ROMIAD")
}

impl AppConfig {
    /// 標準の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// MARK:設定を読み込む
    ///
    /// 明示的に指定されたファイルは必須。標準パスのファイルは無ければデフォルト値。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(explicit, Self::default_path())
    }

    fn load_from(explicit: Option<&Path>, fallback: Option<PathBuf>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match fallback {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
