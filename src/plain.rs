// ============================================
// src/plain.rs
// 全画面UIを使わない行単位モード (一覧表示・クイズ)
// ============================================

use std::thread;
use std::time::Duration;

use anyhow::Result;
use console::{Term, style};
use dialoguer::{Confirm, Select};
use rand::rngs::StdRng;

use crate::app::AUDIO_NOTICE;
use crate::content::{QUIZ_POOL, SENTENCE_LIST, VOCAB_LIST};
use crate::quiz::{Progress, QuizSession, SubmitOutcome};
use crate::speech::{Speaker, SpeechReport};

/// 選択肢の末尾に付ける「音声を聞く」項目
const PLAY_ITEM: &str = "🎧 播放題目音檔";

/// 単語と例文を一覧表示する
pub fn print_reference(term: &Term) -> Result<()> {
    term.write_line(&style("📝 核心單字 (構詞分析)").bold().cyan().to_string())?;
    for entry in VOCAB_LIST {
        term.write_line(&format!(
            "  {} {}  {}  {}  {}",
            entry.icon,
            style(entry.headword).bold().blue(),
            entry.gloss,
            style(format!("[{}]", entry.morphology)).cyan(),
            style(format!("src: {}", entry.source_tag)).dim().italic(),
        ))?;
    }

    term.write_line("")?;
    term.write_line(&style("🗣️ 實用句型 (Data-Driven)").bold().cyan().to_string())?;
    for entry in SENTENCE_LIST {
        term.write_line(&format!(
            "  {} {}\n     {}  {}",
            entry.icon,
            style(entry.text).bold().blue(),
            entry.gloss,
            style(format!("src: {}", entry.source_tag)).dim().italic(),
        ))?;
    }
    Ok(())
}

/// 行単位でクイズを遊ぶ。Esc で中断
pub fn run_quiz(term: &Term, question_count: usize, mut rng: StdRng, speaker: &Speaker) -> Result<()> {
    let mut session = QuizSession::start(QUIZ_POOL, question_count, &mut rng)?;

    loop {
        while let Progress::Current(question) = session.current_question() {
            let number = session.current_index() + 1;
            let total = session.question_count();
            let prompt = question.item.prompt;
            let audio_text = question.item.audio_text;
            let options = question.shuffled_options.clone();

            term.write_line("")?;
            term.write_line(&style(format!("Question {number} / {total}")).bold().to_string())?;
            term.write_line(&style(prompt).bold().blue().to_string())?;

            let mut items: Vec<&str> = options.clone();
            items.push(PLAY_ITEM);

            let Some(choice) = Select::new()
                .with_prompt("請選擇正確答案：")
                .items(&items)
                .default(0)
                .interact_on_opt(term)?
            else {
                return Ok(());
            };

            let Some(chosen) = options.get(choice) else {
                speak_and_report(term, speaker, audio_text)?;
                continue;
            };

            match session.submit_answer(chosen)? {
                SubmitOutcome::Correct => {
                    term.write_line(&style("🎉 答對了！").green().bold().to_string())?;
                }
                SubmitOutcome::Incorrect { hint } => {
                    term.write_line(&style(format!("不對喔！提示：{hint}")).red().to_string())?;
                }
            }
        }

        for line in summary_lines(&session) {
            term.write_line(&line)?;
        }

        let again = Confirm::new()
            .with_prompt("🔄 再來一局 (重新抽題)？")
            .default(true)
            .interact_on_opt(term)?;
        if again != Some(true) {
            return Ok(());
        }
        session = session.restart(QUIZ_POOL, question_count, &mut rng)?;
    }
}

/// 完了時の表示
fn summary_lines(session: &QuizSession) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        style("🏆 挑戰成功！").bold().cyan().to_string(),
        format!("本次得分：{} / {}", session.score(), session.max_score()),
        "你已經學會時間與天氣的說法了！".to_string(),
    ];
    if let Some(elapsed) = session.elapsed() {
        lines.push(format!("Time: {:.1}s", elapsed.num_milliseconds() as f64 / 1000.0));
    }
    lines
}

/// 読み上げて結果を少しだけ待ち、失敗なら一言出す
///
/// 前回待ちきれなかった結果は先に捨てる。
fn speak_and_report(term: &Term, speaker: &Speaker, text: &str) -> Result<Option<SpeechReport>> {
    while speaker.poll().is_some() {}
    speaker.speak(text);

    for _ in 0..100 {
        match speaker.poll() {
            Some(report) if report.text == text => {
                if report.is_failure() {
                    term.write_line(&style(AUDIO_NOTICE).dim().to_string())?;
                }
                return Ok(Some(report));
            }
            Some(_) => {}
            None => thread::sleep(Duration::from_millis(50)),
        }
    }
    Ok(None)
}
