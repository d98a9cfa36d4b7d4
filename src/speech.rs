// ============================================
// src/speech.rs
// 音声合成 (TTS) と再生。失敗してもクイズには影響させない
// ============================================

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::{AudioConfig, project_dirs};

const TTS_URL: &str = "https://translate.google.com/translate_tts";
/// 1リクエストで読み上げられる最大文字数
pub const MAX_TEXT_CHARS: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpeechError {
    #[error("audio is disabled")]
    Disabled,
    #[error("nothing to speak")]
    EmptyText,
    #[error("text is too long ({len} chars, max {max})", max = MAX_TEXT_CHARS)]
    TooLong { len: usize },
    #[error("speech request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("speech service returned an empty clip")]
    EmptyClip,
    #[error("speech service returned data that is not an MP3 clip")]
    InvalidClip,
    #[error("audio i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("no audio player configured")]
    NoPlayer,
    #[error("audio player exited with {0}")]
    PlayerFailed(ExitStatus),
}

/// 生成済みの音声ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub text: String,
    pub language: String,
    pub path: PathBuf,
}

/// テキスト -> 音声ファイル
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SpeechError>;
}

/// 音声ファイルの再生
pub trait Player: Send + Sync {
    fn play(&self, clip: &AudioClip) -> Result<(), SpeechError>;
}

/// Google 翻訳の読み上げ API を使う合成器。結果はキャッシュディレクトリに保存する
pub struct GoogleTts {
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

impl GoogleTts {
    pub fn new(cache_dir: PathBuf) -> Result<Self, SpeechError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("romiad/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, cache_dir })
    }

    fn fetch(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let response = self
            .client
            .get(TTS_URL)
            .query(&[("ie", "UTF-8"), ("q", text), ("tl", language), ("client", "tw-ob")])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::HttpStatus(status));
        }

        let bytes = response.bytes()?;
        if bytes.is_empty() {
            return Err(SpeechError::EmptyClip);
        }
        if !looks_like_mp3(&bytes) {
            return Err(SpeechError::InvalidClip);
        }
        Ok(bytes.to_vec())
    }
}

impl Synthesizer for GoogleTts {
    fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SpeechError> {
        let text = validate_text(text)?;
        let path = self.cache_dir.join(clip_file_name(language, text));

        // 同じ文はキャッシュを再利用
        if !is_cached_clip(&path) {
            let bytes = self.fetch(text, language)?;
            store_clip(&path, &bytes)?;
            tracing::debug!(path = %path.display(), "audio clip cached");
        }

        Ok(AudioClip {
            text: text.to_string(),
            language: language.to_string(),
            path,
        })
    }
}

/// 外部コマンドで再生する (例: "afplay", "ffplay -nodisp -autoexit")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }
}

impl Player for CommandPlayer {
    fn play(&self, clip: &AudioClip) -> Result<(), SpeechError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&clip.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(SpeechError::PlayerFailed(status));
        }
        Ok(())
    }
}

fn validate_text(text: &str) -> Result<&str, SpeechError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SpeechError::EmptyText);
    }
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(SpeechError::TooLong { len });
    }
    Ok(text)
}

fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// キャッシュファイル名 (言語 + テキストから決まる。Rust のバージョンに依存しない)
fn clip_file_name(language: &str, text: &str) -> String {
    format!("{language}-{}.mp3", sha256_hex(&format!("{language}\0{text}")))
}

/// ID3 タグか MPEG フレーム同期で始まっていれば MP3 とみなす
fn looks_like_mp3(bytes: &[u8]) -> bool {
    match bytes {
        [b'I', b'D', b'3', ..] => true,
        [0xFF, second, ..] => second & 0xE0 == 0xE0,
        _ => false,
    }
}

/// キャッシュ済みのファイルが使えるか (壊れた残骸は使わない)
fn is_cached_clip(path: &Path) -> bool {
    let mut head = [0u8; 3];
    let Ok(mut file) = fs::File::open(path) else {
        return false;
    };
    let read = file.read(&mut head).unwrap_or(0);
    looks_like_mp3(&head[..read])
}

/// 一時ファイルに書いてから置き換える (途中で落ちても壊れたクリップを残さない)
fn store_clip(path: &Path, bytes: &[u8]) -> Result<(), SpeechError> {
    static NEXT_PART: AtomicU64 = AtomicU64::new(0);

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let part = path.with_extension(format!(
        "{}-{}.part",
        std::process::id(),
        NEXT_PART.fetch_add(1, Ordering::Relaxed)
    ));
    if let Err(err) = fs::write(&part, bytes).and_then(|()| fs::rename(&part, path)) {
        let _ = fs::remove_file(&part);
        return Err(err.into());
    }
    Ok(())
}

fn audio_cache_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join("audio"))
        .unwrap_or_else(|| std::env::temp_dir().join("romiad-audio"))
}

/// 合成して再生する (呼び出し元スレッドをブロックする)
pub fn speak_blocking(
    synthesizer: &dyn Synthesizer,
    player: Option<&dyn Player>,
    text: &str,
    language: &str,
) -> Result<AudioClip, SpeechError> {
    let clip = synthesizer.synthesize(text, language)?;
    player.ok_or(SpeechError::NoPlayer)?.play(&clip)?;
    Ok(clip)
}

/// 1回の再生要求の結果
#[derive(Debug)]
pub struct SpeechReport {
    pub text: String,
    pub outcome: Result<AudioClip, SpeechError>,
}

impl SpeechReport {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// UI から使う読み上げ窓口
///
/// `speak` は別スレッドで合成・再生し、結果は `poll` で受け取る。
pub struct Speaker {
    synthesizer: Option<Arc<dyn Synthesizer>>,
    player: Option<Arc<dyn Player>>,
    language: String,
    tx: Sender<SpeechReport>,
    rx: Receiver<SpeechReport>,
}

impl Speaker {
    pub fn new(
        synthesizer: Option<Arc<dyn Synthesizer>>,
        player: Option<Arc<dyn Player>>,
        language: impl Into<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            synthesizer,
            player,
            language: language.into(),
            tx,
            rx,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None, None, "id")
    }

    /// 設定から組み立てる。HTTP クライアントが作れなければ無効化して続行
    pub fn from_config(config: &AudioConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }

        let synthesizer: Option<Arc<dyn Synthesizer>> = match GoogleTts::new(audio_cache_dir()) {
            Ok(tts) => Some(Arc::new(tts)),
            Err(err) => {
                tracing::warn!(error = %err, "speech synthesis unavailable");
                None
            }
        };
        let player: Option<Arc<dyn Player>> = config
            .player
            .as_deref()
            .and_then(CommandPlayer::parse)
            .map(|p| Arc::new(p) as Arc<dyn Player>);

        Self::new(synthesizer, player, config.language.clone())
    }

    /// 読み上げを依頼する (待たない)
    pub fn speak(&self, text: &str) {
        let text = text.to_string();
        let Some(synthesizer) = self.synthesizer.clone() else {
            self.report(text, Err(SpeechError::Disabled));
            return;
        };
        let player = self.player.clone();
        let language = self.language.clone();
        let tx = self.tx.clone();
        let thread_text = text.clone();

        let spawned = thread::Builder::new().name("speech".into()).spawn(move || {
            let outcome =
                speak_blocking(&*synthesizer, player.as_deref(), &thread_text, &language);
            let report = SpeechReport { text: thread_text, outcome };
            log_report(&report);
            // UI 側が終了済みなら捨てる
            let _ = tx.send(report);
        });

        if let Err(err) = spawned {
            self.report(text, Err(SpeechError::Io(err)));
        }
    }

    /// 終わった再生要求の結果を1件取り出す
    pub fn poll(&self) -> Option<SpeechReport> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    fn wait(&self) -> SpeechReport {
        self.rx
            .recv_timeout(Duration::from_secs(5))
            .expect("speech report should arrive")
    }

    fn report(&self, text: String, outcome: Result<AudioClip, SpeechError>) {
        let report = SpeechReport { text, outcome };
        log_report(&report);
        let _ = self.tx.send(report);
    }
}

fn log_report(report: &SpeechReport) {
    match &report.outcome {
        Ok(clip) => tracing::debug!(
            text = %report.text,
            language = %clip.language,
            path = %clip.path.display(),
            "audio played"
        ),
        Err(err) => tracing::warn!(text = %report.text, error = %err, "audio unavailable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeSynth;

    impl Synthesizer for FakeSynth {
        fn synthesize(&self, text: &str, language: &str) -> Result<AudioClip, SpeechError> {
            let text = validate_text(text)?;
            Ok(AudioClip {
                text: text.to_string(),
                language: language.to_string(),
                path: PathBuf::from(clip_file_name(language, text)),
            })
        }
    }

    struct OfflineSynth;

    impl Synthesizer for OfflineSynth {
        fn synthesize(&self, _text: &str, _language: &str) -> Result<AudioClip, SpeechError> {
            Err(SpeechError::Io(io::Error::new(io::ErrorKind::NotConnected, "offline")))
        }
    }

    #[derive(Default)]
    struct RecordingPlayer {
        played: Mutex<Vec<String>>,
    }

    impl Player for RecordingPlayer {
        fn play(&self, clip: &AudioClip) -> Result<(), SpeechError> {
            self.played.lock().unwrap().push(clip.text.clone());
            Ok(())
        }
    }

    #[test]
    fn speak_plays_through_player() {
        let player = Arc::new(RecordingPlayer::default());
        let speaker = Speaker::new(Some(Arc::new(FakeSynth)), Some(player.clone()), "id");

        speaker.speak("Nacila");
        let report = speaker.wait();

        let clip = report.outcome.unwrap();
        assert_eq!(clip.text, "Nacila");
        assert_eq!(clip.language, "id");
        assert_eq!(*player.played.lock().unwrap(), vec!["Nacila".to_string()]);
    }

    #[test]
    fn synth_failure_is_reported_not_raised() {
        let speaker = Speaker::new(Some(Arc::new(OfflineSynth)), None, "id");

        speaker.speak("Anocila");
        let report = speaker.wait();

        assert!(report.is_failure());
        assert_eq!(report.text, "Anocila");
    }

    #[test]
    fn disabled_speaker_reports_immediately() {
        let speaker = Speaker::disabled();
        speaker.speak("Romi'ad");

        let report = speaker.poll().unwrap();
        assert!(matches!(report.outcome, Err(SpeechError::Disabled)));
        assert!(speaker.poll().is_none());
    }

    #[test]
    fn missing_player_is_a_failure() {
        let speaker = Speaker::new(Some(Arc::new(FakeSynth)), None, "id");
        speaker.speak("Fali");
        assert!(matches!(speaker.wait().outcome, Err(SpeechError::NoPlayer)));
    }

    #[test]
    fn text_validation() {
        assert!(matches!(validate_text("   "), Err(SpeechError::EmptyText)));
        assert_eq!(validate_text(" Toki ").unwrap(), "Toki");

        let long = "a".repeat(MAX_TEXT_CHARS + 1);
        assert!(matches!(validate_text(&long), Err(SpeechError::TooLong { len }) if len == MAX_TEXT_CHARS + 1));
    }

    #[test]
    fn clip_names_depend_on_language_and_text() {
        let a = clip_file_name("id", "Cidal");
        assert_eq!(a, clip_file_name("id", "Cidal"));
        assert_ne!(a, clip_file_name("id", "Macidal"));
        assert_ne!(a, clip_file_name("ms", "Cidal"));
        assert!(a.starts_with("id-") && a.ends_with(".mp3"));
        assert_eq!(
            clip_file_name("id", "Nacila"),
            "id-f9df3deeb239e9a79716a43019637309b760af41c74d90dac35b93751963dcde.mp3"
        );
    }

    const CLIP: &[u8] = b"ID3\x04\x00\x00fake mp3 body";

    #[test]
    fn mp3_header_detection() {
        assert!(looks_like_mp3(CLIP));
        assert!(looks_like_mp3(&[0xFF, 0xFB, 0x90]));
        assert!(!looks_like_mp3(&[0xFF]));
        assert!(!looks_like_mp3(b"<html>"));
        assert!(!looks_like_mp3(b""));
    }

    #[test]
    fn truncated_leftover_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(clip_file_name("id", "Nacila"));
        fs::write(&path, [0xFF_u8]).unwrap();

        assert!(!is_cached_clip(&path));
        assert!(!is_cached_clip(&dir.path().join("missing.mp3")));
    }

    #[test]
    fn stored_clip_replaces_leftover_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio").join(clip_file_name("id", "Nacila"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [0xFF_u8]).unwrap();

        store_clip(&path, CLIP).unwrap();

        assert!(is_cached_clip(&path));
        assert_eq!(fs::read(&path).unwrap(), CLIP);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".part"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn player_command_parsing() {
        let player = CommandPlayer::parse("ffplay -nodisp -autoexit").unwrap();
        assert_eq!(player.program, "ffplay");
        assert_eq!(player.args, vec!["-nodisp", "-autoexit"]);
        assert!(CommandPlayer::parse("   ").is_none());
    }
}
