// ============================================
// src/quiz.rs
// クイズセッション (出題・シャッフル・採点) の状態管理
// ============================================

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::content::QuizItem;

/// 1問正解ごとの加点
pub const POINTS_PER_QUESTION: u32 = 20;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("requested {requested} questions but the pool only has {available}")]
    InsufficientPool { requested: usize, available: usize },

    #[error("session already completed")]
    SessionComplete,
}

/// セッション識別子 (UI の選択状態をリスタート前後で区別するためだけに使う)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// セッション内の1問 (選択肢はシャッフル済み)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub item: QuizItem,
    pub shuffled_options: Vec<&'static str>,
}

impl QuizQuestion {
    fn shuffled<R: Rng + ?Sized>(item: QuizItem, rng: &mut R) -> Self {
        let mut shuffled_options = item.options.to_vec();
        shuffled_options.shuffle(rng);
        Self { item, shuffled_options }
    }
}

/// `current_question` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    Current(&'a QuizQuestion),
    Complete,
}

/// 回答の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    /// 不正解。状態は変わらず、ヒントだけ返す
    Incorrect { hint: &'static str },
}

/// 1回分のクイズ
#[derive(Debug, Clone)]
pub struct QuizSession {
    score: u32,
    current_index: usize,
    questions: Vec<QuizQuestion>,
    session_id: SessionId,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// プールから `question_count` 問を重複なしで抽選し、新しいセッションを作る
    ///
    /// # Errors
    ///
    /// `question_count` がプールの問題数を超える場合は `QuizError::InsufficientPool`。
    pub fn start<R: Rng + ?Sized>(
        pool: &[QuizItem],
        question_count: usize,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        if question_count > pool.len() {
            return Err(QuizError::InsufficientPool {
                requested: question_count,
                available: pool.len(),
            });
        }

        // プール全体を並べ替えて先頭から取る (= 順序もランダムな非復元抽出)
        let mut picked: Vec<&QuizItem> = pool.iter().collect();
        picked.shuffle(rng);
        picked.truncate(question_count);

        let questions = picked
            .into_iter()
            .map(|item| QuizQuestion::shuffled(*item, rng))
            .collect();

        let session = Self {
            score: 0,
            current_index: 0,
            questions,
            session_id: SessionId(rng.random()),
            started_at: Utc::now(),
            completed_at: None,
        };
        tracing::info!(
            session_id = %session.session_id,
            question_count,
            "quiz session started"
        );
        Ok(session)
    }

    /// 今のセッションを捨てて新しく抽選し直す (何も引き継がない)
    ///
    /// # Errors
    ///
    /// `start` と同じ。
    pub fn restart<R: Rng + ?Sized>(
        &self,
        pool: &[QuizItem],
        question_count: usize,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let mut next = Self::start(pool, question_count, rng)?;
        while next.session_id == self.session_id {
            next.session_id = SessionId(rng.random());
        }
        tracing::info!(previous = %self.session_id, session_id = %next.session_id, "quiz session restarted");
        Ok(next)
    }

    /// 現在の問題。全問終わっていれば `Progress::Complete`
    #[must_use]
    pub fn current_question(&self) -> Progress<'_> {
        match self.questions.get(self.current_index) {
            Some(question) => Progress::Current(question),
            None => Progress::Complete,
        }
    }

    /// 回答を判定する。正解時のみスコアと問題番号が進む
    ///
    /// # Errors
    ///
    /// 全問終了後に呼ばれた場合は `QuizError::SessionComplete`。
    pub fn submit_answer(&mut self, chosen: &str) -> Result<SubmitOutcome, QuizError> {
        let Progress::Current(question) = self.current_question() else {
            return Err(QuizError::SessionComplete);
        };

        if chosen != question.item.correct_answer {
            let hint = question.item.hint;
            tracing::debug!(session_id = %self.session_id, index = self.current_index, "incorrect answer");
            return Ok(SubmitOutcome::Incorrect { hint });
        }

        self.score += POINTS_PER_QUESTION;
        self.current_index += 1;
        tracing::debug!(session_id = %self.session_id, score = self.score, "correct answer");

        if self.is_complete() {
            self.completed_at = Some(Utc::now());
            tracing::info!(session_id = %self.session_id, score = self.score, "quiz session complete");
        }
        Ok(SubmitOutcome::Correct)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current_index == self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// 満点 (= 20 × 問題数、100点への正規化はしない)
    #[must_use]
    pub fn max_score(&self) -> u32 {
        POINTS_PER_QUESTION * self.questions.len() as u32
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[cfg(test)]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// 開始から完了までの所要時間 (未完了なら `None`)
    #[must_use]
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.completed_at.map(|done| done - self.started_at)
    }
}
