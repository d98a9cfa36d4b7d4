// ============================================
// src/logging.rs
// ログ出力の初期化 (画面は TUI が使うのでファイルに書く)
// ============================================

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::project_dirs;

/// main の終わりまで保持しておくこと (drop するとバッファが捨てられる)
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// ログの保存先 (データディレクトリの logs/、取れなければカレントの logs/)
pub fn log_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// `RUST_LOG` があればそちらを優先
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_tracing(log_level: &str) -> Option<LogGuard> {
    let dir = log_dir();
    if let Err(err) = fs::create_dir_all(&dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        return None;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &dir, "romiad.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(env_filter(log_level))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return None;
    }

    Some(LogGuard { _guard: guard })
}
