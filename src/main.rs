// ============================================
// src/main.rs (メインファイル)
// ============================================

use std::io::{Result as IoResult, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::Term;
use rand::SeedableRng;
use rand::rngs::StdRng;

mod app;
mod config;
mod content;
mod logging;
mod plain;
mod quiz;
mod speech;
mod ui;

use app::AppState;
use config::AppConfig;
use speech::Speaker;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

use ratatui::prelude::*;

// --------------------------------------------------
// コマンドライン
// --------------------------------------------------

#[derive(Debug, Parser)]
#[command(name = "romiad", version, about = "Unit 38: O Romi'ad - 時間與天氣 (Time & Weather)")]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// 1回のクイズの問題数
    #[arg(long, global = true)]
    questions: Option<usize>,

    /// 乱数シード (出題順・選択肢の並びを固定する)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// 音声を使わない
    #[arg(long, global = true)]
    no_audio: bool,

    /// 発音の言語コード
    #[arg(long, global = true)]
    lang: Option<String>,

    /// 再生コマンド (例: "mpv --really-quiet")
    #[arg(long, global = true)]
    player: Option<String>,

    /// 設定ファイル
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ログの出力レベル (RUST_LOG が優先)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Subcommand)]
enum Mode {
    /// 全画面で起動 (既定)
    #[default]
    Tui,
    /// 行単位でクイズ
    Quiz,
    /// 単語と例文を表示
    Vocab,
}

impl Cli {
    /// コマンドラインの指定で設定を上書きする
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(count) = self.questions {
            config.question_count = count;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.no_audio {
            config.audio.enabled = false;
        }
        if let Some(lang) = &self.lang {
            config.audio.language = lang.clone();
        }
        if let Some(player) = &self.player {
            config.audio.player = Some(player.clone());
        }
        config
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

// --------------------------------------------------
// メイン関数 (TUIセットアップと実行ループ)
// --------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let config = cli.apply(config);

    let _log_guard = logging::init_tracing(&config.log_level);
    tracing::info!(mode = ?cli.mode.unwrap_or_default(), ?config, "starting");

    let rng = make_rng(cli.seed);
    let speaker = Speaker::from_config(&config.audio);

    match cli.mode.unwrap_or_default() {
        Mode::Tui => {
            let app_state = AppState::new(config.question_count, rng, speaker)
                .context("cannot start quiz")?;
            let mut terminal = setup_terminal().context("failed to set up terminal")?;
            let result = run_app(&mut terminal, app_state);
            restore_terminal(&mut terminal).context("failed to restore terminal")?;
            result?;
        }
        Mode::Quiz => plain::run_quiz(&Term::stdout(), config.question_count, rng, &speaker)?,
        Mode::Vocab => plain::print_reference(&Term::stdout())?,
    }

    tracing::info!("bye");
    Ok(())
}

fn setup_terminal() -> IoResult<Terminal<impl Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?; // 代替スクリーンを使用
    stdout().execute(Hide)?; // カーソルを非表示
    let backend = CrosstermBackend::new(stdout());
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<impl Backend>) -> IoResult<()> {
    terminal.clear()?;
    stdout().execute(Show)?; // カーソルを再表示
    stdout().execute(LeaveAlternateScreen)?; // 代替スクリーンを終了
    disable_raw_mode()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<impl Backend>, mut app_state: AppState) -> IoResult<()> {
    while !app_state.should_quit {
        app_state.poll_speech();
        terminal.draw(|f| ui::draw(f, &app_state))?;

        if event::poll(Duration::from_millis(50))? {
            handle_event(&mut app_state, event::read()?);
        }
    }

    Ok(())
}

/// キーを押したときだけ処理する (離したとき・リピートは無視)
fn handle_event(app_state: &mut AppState, event: Event) {
    if let Event::Key(key) = event
        && key.kind == KeyEventKind::Press
    {
        app_state.handle_key(key.code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_tui() {
        let cli = Cli::try_parse_from(["romiad"]).unwrap();
        assert_eq!(cli.mode.unwrap_or_default(), Mode::Tui);
        assert_eq!(cli.apply(AppConfig::default()), AppConfig::default());
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "romiad", "quiz", "--questions", "3", "--no-audio", "--lang", "ms", "--seed", "9",
        ])
        .unwrap();
        assert_eq!(cli.mode, Some(Mode::Quiz));

        let config = cli.apply(AppConfig::default());
        assert_eq!(config.question_count, 3);
        assert!(!config.audio.enabled);
        assert_eq!(config.audio.language, "ms");
        assert_eq!(cli.seed, Some(9));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let a = quiz::QuizSession::start(content::QUIZ_POOL, 5, &mut make_rng(Some(1))).unwrap();
        let b = quiz::QuizSession::start(content::QUIZ_POOL, 5, &mut make_rng(Some(1))).unwrap();
        assert_eq!(a.questions(), b.questions());
    }

    #[test]
    fn only_key_presses_reach_the_app() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut app_state = AppState::new(5, make_rng(Some(2)), Speaker::disabled()).unwrap();
        let key = |kind: KeyEventKind| {
            Event::Key(KeyEvent::new_with_kind(KeyCode::Esc, KeyModifiers::NONE, kind))
        };

        handle_event(&mut app_state, key(KeyEventKind::Release));
        handle_event(&mut app_state, Event::FocusGained);
        assert!(!app_state.should_quit);

        handle_event(&mut app_state, key(KeyEventKind::Press));
        assert!(app_state.should_quit);
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
