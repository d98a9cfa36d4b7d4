// ============================================
// src/app.rs
// 画面の状態とキー入力の処理
// ============================================

use crossterm::event::KeyCode;
use rand::rngs::StdRng;

use crate::content::{QUIZ_POOL, SENTENCE_LIST, SentenceEntry, VOCAB_LIST, VocabEntry};
use crate::quiz::{Progress, QuizError, QuizSession, SessionId, SubmitOutcome};
use crate::speech::Speaker;

/// 音声が使えなかったときの表示
pub const AUDIO_NOTICE: &str = "🔇 (語音生成暫時無法使用)";

/// タブ
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tab {
    Reference, // 📚 詞彙與句型
    Challenge, // 🎲 隨機挑戰
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Reference, Tab::Challenge];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Reference => "📚 詞彙與句型",
            Tab::Challenge => "🎲 隨機挑戰",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Reference => 0,
            Tab::Challenge => 1,
        }
    }

    fn toggled(self) -> Self {
        match self {
            Tab::Reference => Tab::Challenge,
            Tab::Challenge => Tab::Reference,
        }
    }
}

/// 参考タブの1行 (単語カードと例文を通しで数える)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReferenceEntry {
    Vocab(&'static VocabEntry),
    Sentence(&'static SentenceEntry),
}

impl ReferenceEntry {
    pub fn at(index: usize) -> Option<Self> {
        match VOCAB_LIST.get(index) {
            Some(entry) => Some(ReferenceEntry::Vocab(entry)),
            None => SENTENCE_LIST
                .get(index - VOCAB_LIST.len())
                .map(ReferenceEntry::Sentence),
        }
    }

    pub fn count() -> usize {
        VOCAB_LIST.len() + SENTENCE_LIST.len()
    }

    /// 発音させるテキスト
    pub fn audio_text(self) -> &'static str {
        match self {
            ReferenceEntry::Vocab(entry) => entry.headword,
            ReferenceEntry::Sentence(entry) => entry.text,
        }
    }
}

/// 直前の回答に対する表示
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect { hint: &'static str },
}

/// アプリ全体の状態を管理する
pub struct AppState {
    pub tab: Tab,
    pub session: QuizSession,
    question_count: usize,
    rng: StdRng,

    /// 参考タブで選択中の行
    pub reference_cursor: usize,
    /// 挑戦タブで選択中の選択肢
    choice_cursor: usize,
    /// `choice_cursor` がどのセッションの何問目のものか
    choice_owner: (SessionId, usize),

    pub feedback: Option<Feedback>,
    pub audio_notice: Option<&'static str>,
    pub should_quit: bool,

    speaker: Speaker,
}

impl AppState {
    pub fn new(question_count: usize, mut rng: StdRng, speaker: Speaker) -> Result<Self, QuizError> {
        let session = QuizSession::start(QUIZ_POOL, question_count, &mut rng)?;
        let choice_owner = (session.session_id(), session.current_index());
        Ok(Self {
            tab: Tab::Reference,
            session,
            question_count,
            rng,
            reference_cursor: 0,
            choice_cursor: 0,
            choice_owner,
            feedback: None,
            audio_notice: None,
            should_quit: false,
            speaker,
        })
    }

    /// 選択肢のカーソル。セッションか問題が変わっていれば先頭に戻る
    pub fn choice_cursor(&self) -> usize {
        if self.choice_owner == self.current_owner() {
            self.choice_cursor
        } else {
            0
        }
    }

    fn current_owner(&self) -> (SessionId, usize) {
        (self.session.session_id(), self.session.current_index())
    }

    fn set_choice_cursor(&mut self, cursor: usize) {
        self.choice_cursor = cursor;
        self.choice_owner = self.current_owner();
    }

    /// MARK:キー入力の処理
    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.tab = self.tab.toggled();
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Char('p') => self.play(),
            KeyCode::Enter => match self.tab {
                Tab::Reference => self.play(),
                Tab::Challenge if self.session.is_complete() => self.restart(),
                Tab::Challenge => self.submit_choice(),
            },
            KeyCode::Char('r') if self.tab == Tab::Challenge && self.session.is_complete() => {
                self.restart();
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        match self.tab {
            Tab::Reference => {
                self.reference_cursor = step(self.reference_cursor, delta, ReferenceEntry::count());
            }
            Tab::Challenge => {
                if let Progress::Current(question) = self.session.current_question() {
                    let len = question.shuffled_options.len();
                    let cursor = step(self.choice_cursor(), delta, len);
                    self.set_choice_cursor(cursor);
                    // 判定表示は次の操作まで
                    self.feedback = None;
                }
            }
        }
    }

    /// 選択中の単語・例文、または現在の問題を読み上げる
    fn play(&mut self) {
        let text = match self.tab {
            Tab::Reference => ReferenceEntry::at(self.reference_cursor).map(ReferenceEntry::audio_text),
            Tab::Challenge => match self.session.current_question() {
                Progress::Current(question) => Some(question.item.audio_text),
                Progress::Complete => None,
            },
        };
        if let Some(text) = text {
            self.audio_notice = None;
            self.speaker.speak(text);
        }
    }

    /// 選択中の選択肢で回答する
    fn submit_choice(&mut self) {
        let Progress::Current(question) = self.session.current_question() else {
            return;
        };
        let Some(chosen) = question.shuffled_options.get(self.choice_cursor()).copied() else {
            return;
        };

        match self.session.submit_answer(chosen) {
            Ok(SubmitOutcome::Correct) => self.feedback = Some(Feedback::Correct),
            Ok(SubmitOutcome::Incorrect { hint }) => {
                self.feedback = Some(Feedback::Incorrect { hint });
            }
            Err(err) => tracing::error!(error = %err, "answer submitted out of sequence"),
        }
    }

    /// MARK:再挑戦 (新しく抽選し直す)
    fn restart(&mut self) {
        match self.session.restart(QUIZ_POOL, self.question_count, &mut self.rng) {
            Ok(session) => {
                self.session = session;
                self.feedback = None;
                self.set_choice_cursor(0);
            }
            Err(err) => tracing::error!(error = %err, "failed to restart quiz"),
        }
    }

    /// 読み上げの結果を取り込む (失敗しても表示を出すだけ)
    pub fn poll_speech(&mut self) {
        while let Some(report) = self.speaker.poll() {
            self.audio_notice = report.is_failure().then_some(AUDIO_NOTICE);
        }
    }
}

/// カーソルを端で止めながら動かす
fn step(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn app() -> AppState {
        AppState::new(5, StdRng::seed_from_u64(38), Speaker::disabled()).unwrap()
    }

    fn correct_index(app: &AppState) -> usize {
        let Progress::Current(question) = app.session.current_question() else {
            panic!("quiz should be in progress");
        };
        question
            .shuffled_options
            .iter()
            .position(|option| *option == question.item.correct_answer)
            .unwrap()
    }

    fn select(app: &mut AppState, target: usize) {
        for _ in 0..3 {
            app.handle_key(KeyCode::Up);
        }
        for _ in 0..target {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.choice_cursor(), target);
    }

    fn answer_correctly(app: &mut AppState) {
        let target = correct_index(app);
        select(app, target);
        app.handle_key(KeyCode::Enter);
    }

    #[test]
    fn starts_on_reference_tab() {
        let app = app();
        assert_eq!(app.tab, Tab::Reference);
        assert_eq!(app.session.question_count(), 5);
    }

    #[test]
    fn rejects_oversized_quiz() {
        let err = AppState::new(6, StdRng::seed_from_u64(1), Speaker::disabled()).err();
        assert!(matches!(err, Some(QuizError::InsufficientPool { .. })));
    }

    #[test]
    fn tab_and_quit_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.tab, Tab::Challenge);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.tab, Tab::Reference);
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn reference_cursor_stays_in_bounds() {
        let mut app = app();
        app.handle_key(KeyCode::Up);
        assert_eq!(app.reference_cursor, 0);
        for _ in 0..100 {
            app.handle_key(KeyCode::Down);
        }
        assert_eq!(app.reference_cursor, ReferenceEntry::count() - 1);
        assert!(matches!(ReferenceEntry::at(app.reference_cursor), Some(ReferenceEntry::Sentence(_))));
    }

    #[test]
    fn reference_entries_cover_both_lists() {
        assert_eq!(ReferenceEntry::at(0).unwrap().audio_text(), "Romi'ad");
        assert_eq!(
            ReferenceEntry::at(VOCAB_LIST.len()).unwrap().audio_text(),
            "Ma'orad anini a romi'ad."
        );
        assert!(ReferenceEntry::at(ReferenceEntry::count()).is_none());
    }

    #[test]
    fn wrong_choice_shows_hint_without_advancing() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        let wrong = (correct_index(&app) + 1) % 3;
        select(&mut app, wrong);

        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.feedback, Some(Feedback::Incorrect { .. })));
        assert_eq!(app.session.current_index(), 0);
        assert_eq!(app.session.score(), 0);
        assert_eq!(app.choice_cursor(), wrong);
    }

    #[test]
    fn right_choice_advances_and_resets_cursor() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);

        answer_correctly(&mut app);

        assert_eq!(app.feedback, Some(Feedback::Correct));
        assert_eq!(app.session.current_index(), 1);
        assert_eq!(app.session.score(), 20);
        assert_eq!(app.choice_cursor(), 0);
    }

    #[test]
    fn feedback_clears_on_next_move() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        answer_correctly(&mut app);
        assert_eq!(app.feedback, Some(Feedback::Correct));

        app.handle_key(KeyCode::Down);

        assert_eq!(app.feedback, None);
        assert_eq!(app.session.current_index(), 1);
    }

    #[test]
    fn completion_then_restart() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        for _ in 0..5 {
            answer_correctly(&mut app);
        }
        assert!(app.session.is_complete());
        assert_eq!(app.session.score(), 100);
        let finished = app.session.session_id();

        app.handle_key(KeyCode::Char('r'));

        assert!(!app.session.is_complete());
        assert_eq!(app.session.score(), 0);
        assert_eq!(app.session.current_index(), 0);
        assert_ne!(app.session.session_id(), finished);
        assert_eq!(app.feedback, None);
    }

    #[test]
    fn restart_key_is_ignored_mid_quiz() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        answer_correctly(&mut app);
        let id = app.session.session_id();

        app.handle_key(KeyCode::Char('r'));

        assert_eq!(app.session.session_id(), id);
        assert_eq!(app.session.score(), 20);
    }

    #[test]
    fn audio_failure_only_sets_notice() {
        let mut app = app();
        app.handle_key(KeyCode::Char('p'));
        app.poll_speech();

        assert_eq!(app.audio_notice, Some(AUDIO_NOTICE));
        assert_eq!(app.session.score(), 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn step_clamps() {
        assert_eq!(step(0, -1, 3), 0);
        assert_eq!(step(2, 1, 3), 2);
        assert_eq!(step(1, 1, 3), 2);
        assert_eq!(step(5, 1, 0), 0);
    }
}
