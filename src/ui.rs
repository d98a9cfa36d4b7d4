// ============================================
// src/ui.rs
// UI描画
// ============================================

use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};

use crate::app::{AppState, Feedback, Tab};
use crate::content::{SENTENCE_LIST, SentenceEntry, VOCAB_LIST, VocabEntry};
use crate::quiz::{Progress, QuizQuestion, QuizSession};

const SKY: Color = Color::Rgb(2, 119, 189); // #0277BD
const DEEP_SKY: Color = Color::Rgb(1, 87, 155); // #01579B
const LIGHT_SKY: Color = Color::Rgb(179, 229, 252); // #B3E5FC

pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // [0] タイトル
            Constraint::Length(3), // [1] タブ
            Constraint::Min(5),    // [2] 本体
            Constraint::Length(1), // [3] 操作説明・音声の通知
        ])
        .split(f.area());

    draw_title(f, chunks[0]);
    draw_tabs(f, chunks[1], app.tab);
    match app.tab {
        Tab::Reference => draw_reference(f, chunks[2], app.reference_cursor),
        Tab::Challenge => draw_challenge(f, chunks[2], app),
    }
    draw_footer(f, chunks[3], app);
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![
        Line::from("Unit 38: O Romi'ad").style(Style::default().fg(SKY).bold()),
        Line::from("時間與天氣 (Time & Weather)").style(Style::default().fg(Color::Gray)),
    ])
    .centered();
    f.render_widget(title, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, current: Tab) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
        .block(Block::default().borders(Borders::ALL))
        .select(current.index())
        .highlight_style(Style::default().fg(DEEP_SKY).bg(LIGHT_SKY).bold());
    f.render_widget(tabs, area);
}

// --------------------------------------------------
// 詞彙與句型
// --------------------------------------------------

fn vocab_item(entry: &VocabEntry) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(vec![
            Span::raw(format!("{} ", entry.icon)),
            Span::styled(entry.headword, Style::default().fg(SKY).bold()),
            Span::raw("  "),
            Span::styled(entry.gloss, Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::raw("   "),
            Span::styled(
                format!(" {} ", entry.morphology),
                Style::default().fg(DEEP_SKY).bg(LIGHT_SKY),
            ),
            Span::styled(
                format!("  src: {}", entry.source_tag),
                Style::default().fg(Color::DarkGray).italic(),
            ),
        ]),
    ])
}

fn sentence_item(entry: &SentenceEntry) -> ListItem<'static> {
    ListItem::new(vec![
        Line::from(vec![
            Span::raw(format!("{} ", entry.icon)),
            Span::styled(entry.text, Style::default().fg(SKY).bold()),
        ]),
        Line::from(vec![
            Span::raw("   "),
            Span::styled(entry.gloss, Style::default().fg(Color::Gray)),
            Span::styled(
                format!("  src: {}", entry.source_tag),
                Style::default().fg(Color::DarkGray).italic(),
            ),
        ]),
    ])
}

fn draw_reference(f: &mut Frame, area: Rect, cursor: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    // カーソルは単語 -> 例文の通し番号
    let (vocab_selected, sentence_selected) = if cursor < VOCAB_LIST.len() {
        (Some(cursor), None)
    } else {
        (None, Some(cursor - VOCAB_LIST.len()))
    };

    let highlight = Style::default().bg(Color::Rgb(225, 245, 254)).fg(Color::Black);

    let vocab = List::new(VOCAB_LIST.iter().map(vocab_item))
        .block(Block::default().borders(Borders::ALL).title("📝 核心單字 (構詞分析)"))
        .highlight_style(highlight)
        .highlight_symbol("🔊 ");
    let mut vocab_state = ListState::default().with_selected(vocab_selected);
    f.render_stateful_widget(vocab, chunks[0], &mut vocab_state);

    let sentences = List::new(SENTENCE_LIST.iter().map(sentence_item))
        .block(Block::default().borders(Borders::ALL).title("🗣️ 實用句型 (Data-Driven)"))
        .highlight_style(highlight)
        .highlight_symbol("▶️ ");
    let mut sentence_state = ListState::default().with_selected(sentence_selected);
    f.render_stateful_widget(sentences, chunks[1], &mut sentence_state);
}

// --------------------------------------------------
// 隨機挑戰
// --------------------------------------------------

fn draw_challenge(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("🎲 隨機評量");
    let inner = block.inner(area);
    f.render_widget(block, area);

    match app.session.current_question() {
        Progress::Current(question) => draw_question(f, inner, app, question),
        Progress::Complete => draw_summary(f, inner, &app.session),
    }
}

fn draw_question(f: &mut Frame, area: Rect, app: &AppState, question: &QuizQuestion) {
    let session = &app.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // [0] 進捗ゲージ
            Constraint::Length(1), // [1] 何問目か
            Constraint::Length(1), // [2] 判定 (正解・ヒント)
            Constraint::Length(2), // [3] 問題文
            Constraint::Length(5), // [4] 選択肢
            Constraint::Min(1),    // [5] 操作説明
        ])
        .split(area);

    let ratio = if session.question_count() > 0 {
        session.current_index() as f64 / session.question_count() as f64
    } else {
        0.0
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Rgb(3, 169, 244)).bg(Color::Black))
        .ratio(ratio);
    f.render_widget(gauge, chunks[0]);

    f.render_widget(
        Paragraph::new(format!(
            "Question {} / {}",
            session.current_index() + 1,
            session.question_count()
        ))
        .bold(),
        chunks[1],
    );

    let feedback = match app.feedback {
        Some(Feedback::Correct) => Line::from("🎉 答對了！").style(Style::default().fg(Color::Green).bold()),
        Some(Feedback::Incorrect { hint }) => {
            Line::from(format!("不對喔！提示：{hint}")).style(Style::default().fg(Color::Red))
        }
        None => Line::default(),
    };
    f.render_widget(Paragraph::new(feedback), chunks[2]);

    f.render_widget(
        Paragraph::new(vec![
            Line::from(question.item.prompt).style(Style::default().fg(Color::White).bold()),
            Line::from("🎧 [p] 播放題目音檔").style(Style::default().fg(Color::DarkGray)),
        ])
        .wrap(Wrap { trim: true }),
        chunks[3],
    );

    let options = List::new(
        question
            .shuffled_options
            .iter()
            .map(|option| ListItem::new(*option)),
    )
    .block(Block::default().borders(Borders::TOP).title("請選擇正確答案："))
    .highlight_style(Style::default().fg(DEEP_SKY).bg(LIGHT_SKY).add_modifier(Modifier::BOLD))
    .highlight_symbol("● ");
    let mut option_state = ListState::default().with_selected(Some(app.choice_cursor()));
    f.render_stateful_widget(options, chunks[4], &mut option_state);

    f.render_widget(
        Paragraph::new(Line::from("[Enter] 送出答案").style(Style::default().fg(Color::DarkGray))),
        chunks[5],
    );
}

fn draw_summary(f: &mut Frame, area: Rect, session: &QuizSession) {
    let elapsed = session
        .elapsed()
        .map(|d| format!("Time: {:.1}s", d.num_milliseconds() as f64 / 1000.0))
        .unwrap_or_default();

    let summary = Paragraph::new(vec![
        Line::from(""),
        Line::from("🏆 挑戰成功！").style(Style::default().fg(DEEP_SKY).bold()),
        Line::from(format!(
            "本次得分：{} / {}",
            session.score(),
            session.max_score()
        ))
        .style(Style::default().fg(Color::White).bold()),
        Line::from("你已經學會時間與天氣的說法了！"),
        Line::from(elapsed).style(Style::default().fg(Color::Gray)),
        Line::from(""),
        Line::from("🔄 [r] 再來一局 (重新抽題)").style(Style::default().fg(SKY)),
    ])
    .centered()
    .block(Block::default().style(Style::default().bg(Color::Rgb(1, 40, 70))));

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Rgb(3, 169, 244)).bg(Color::Black))
        .ratio(1.0);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    f.render_widget(gauge, chunks[0]);
    f.render_widget(summary, chunks[1]);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &AppState) {
    let help = match app.tab {
        Tab::Reference => "[Tab] 切換  [↑↓] 選擇  [Enter/p] 聽發音  [q] 離開",
        Tab::Challenge if app.session.is_complete() => "[Tab] 切換  [r] 再來一局  [q] 離開",
        Tab::Challenge => "[Tab] 切換  [↑↓] 選擇  [Enter] 送出  [p] 播放  [q] 離開",
    };

    let mut spans = vec![Span::styled(help, Style::default().fg(Color::DarkGray))];
    if let Some(notice) = app.audio_notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice, Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::Speaker;
    use crossterm::event::KeyCode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::backend::TestBackend;

    fn render(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 45)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> AppState {
        AppState::new(5, StdRng::seed_from_u64(7), Speaker::disabled()).unwrap()
    }

    #[test]
    fn reference_tab_lists_vocabulary() {
        let screen = render(&app());
        assert!(screen.contains("Unit 38: O Romi'ad"));
        assert!(screen.contains("Romi'ad"));
        assert!(screen.contains("Ma-Romi'ad"));
        assert!(screen.contains("src: Row 1690"));
    }

    #[test]
    fn challenge_tab_shows_progress() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        let screen = render(&app);
        assert!(screen.contains("Question 1 / 5"));
    }

    #[test]
    fn hint_is_shown_above_the_prompt() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        let Progress::Current(question) = app.session.current_question() else {
            panic!("quiz should be in progress");
        };
        let hint = question.item.hint;
        let wrong = question
            .shuffled_options
            .iter()
            .position(|option| *option != question.item.correct_answer)
            .unwrap();
        for _ in 0..wrong {
            app.handle_key(KeyCode::Down);
        }
        app.handle_key(KeyCode::Enter);

        let screen = render(&app);
        let rows: Vec<&str> = screen.lines().collect();
        let label = rows.iter().position(|row| row.contains("Question 1 / 5")).unwrap();
        let token = hint.split_whitespace().next().unwrap();
        assert!(rows[label + 1].contains(token), "{}", rows[label + 1]);

        // 次の操作で消える
        app.handle_key(KeyCode::Down);
        let screen = render(&app);
        let rows: Vec<&str> = screen.lines().collect();
        assert!(!rows[label + 1].contains(token));
    }

    #[test]
    fn summary_shows_score() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        while let Progress::Current(question) = app.session.current_question() {
            let answer = question.item.correct_answer;
            app.session.submit_answer(answer).unwrap();
        }
        let screen = render(&app);
        assert!(screen.contains("100 / 100"));
        assert!(screen.contains("[r]"));
    }
}
