/*
 * src/content.rs
 * 教材データ (単語・例文・クイズ問題) を管理するモジュール
 */

/// 単語カード
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub headword: &'static str,   // アミ語 (表示・発音用)
    pub gloss: &'static str,      // 中国語訳
    pub icon: &'static str,       // 絵文字
    pub source_tag: &'static str, // 出典
    pub morphology: &'static str, // 構詞 (例: "Ma-'Orad")
}

/// 例文
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SentenceEntry {
    pub text: &'static str,
    pub gloss: &'static str,
    pub icon: &'static str,
    pub source_tag: &'static str,
}

/// クイズ問題のテンプレート
///
/// `options` は重複なし、`correct_answer` は必ず `options` のどれか。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuizItem {
    pub prompt: &'static str,
    pub audio_text: &'static str, // 発音させるテキスト
    pub options: [&'static str; 3],
    pub correct_answer: &'static str,
    pub hint: &'static str,
}

const fn vocab(
    headword: &'static str,
    gloss: &'static str,
    icon: &'static str,
    source_tag: &'static str,
    morphology: &'static str,
) -> VocabEntry {
    VocabEntry { headword, gloss, icon, source_tag, morphology }
}

const fn sentence(
    text: &'static str,
    gloss: &'static str,
    icon: &'static str,
    source_tag: &'static str,
) -> SentenceEntry {
    SentenceEntry { text, gloss, icon, source_tag }
}

/// 単語リスト (Unit 38: 時間と天気、18語)
pub const VOCAB_LIST: &[VocabEntry] = &[
    // 日・天気
    vocab("Romi'ad", "日子 / 天氣 (詞根)", "📅", "Row 1690", "Root"),
    vocab("Maromi'ad", "整天 / 度過一天", "⏳", "Grammar", "Ma-Romi'ad"),
    vocab("'Orad", "雨 (詞根)", "💧", "Row 3484", "Root"),
    vocab("Ma'orad", "下雨", "🌧️", "Standard", "Ma-'Orad"),
    vocab("Cidal", "太陽 (詞根)", "☀️", "Standard", "Root"),
    vocab("Macidal", "出太陽 / 晴天", "🌤️", "Standard", "Ma-Cidal"),
    vocab("Fali", "風 (詞根)", "🍃", "Row 555", "Root"),
    vocab("Mifali", "刮風", "💨", "Standard", "Mi-Fali"),

    // 年・日付
    vocab("Heca", "年 / 歲 (詞根)", "🎂", "Root", "Root"),
    vocab("Mihecaan", "年份 / 歲數", "🗓️", "Row 321", "Mi-Heca-an"),
    vocab("Anini", "今天 / 現在", "👇", "Row 1690", "Time"),
    vocab("Cila", "前/後一天 (詞根)", "📆", "Root", "Root"),
    vocab("Nacila", "昨天", "⏪", "Row 321", "Na-Cila (Past)"),
    vocab("Anocila", "明天", "⏩", "Row 485", "Ano-Cila (Fut)"),

    // 時刻
    vocab("Toki", "時間 / 鐘錶", "⌚", "Row 676", "Loan"),
    vocab("Fulad", "月亮 / 月份", "🌙", "Standard", "Noun"),
    vocab("Sananal", "早晨", "🌅", "Standard", "Time"),
    vocab("Dadaya", "晚上", "🌃", "Standard", "Time"),
];

/// 例文リスト (9文)
pub const SENTENCE_LIST: &[SentenceEntry] = &[
    sentence("Ma'orad anini a romi'ad.", "今天是下雨天。", "🌧️", "Standard Pattern"),
    sentence("Macidal i nacila.", "昨天是晴天。", "☀️", "Standard Pattern"),
    sentence("Pina to ko mihecaan iso?", "你幾歲了？", "🎂", "Standard Question"),
    sentence("Mifali to i papotal.", "外面在颳風了。", "💨", "Standard Pattern"),
    sentence("Pina ko toki anini?", "現在幾點鐘？", "⌚", "Row 676"),
    sentence("Malikat ko fulad i dadaya.", "晚上的月亮很亮。", "🌕", "Standard Pattern"),
    sentence("Maromi'ad ciira a matayal.", "他工作了一整天。", "⏳", "Standard Pattern"),
    sentence("Anocila a tayra kako i Taypak.", "我明天要去台北。", "🚄", "Standard Pattern"),
    sentence(
        "Mica'edongay kako to mi'acaan no miso a riko' i nacila a miheca.",
        "我穿著你去年買的衣服。",
        "👗",
        "Row 321",
    ),
];

/// クイズ問題プール (5問)
pub const QUIZ_POOL: &[QuizItem] = &[
    QuizItem {
        prompt: "Ma'orad anini a romi'ad.",
        audio_text: "Ma'orad anini a romi'ad",
        options: ["今天是下雨天", "今天是晴天", "今天是陰天"],
        correct_answer: "今天是下雨天",
        hint: "Ma'orad (下雨) (Standard)",
    },
    QuizItem {
        prompt: "Pina to ko mihecaan iso?",
        audio_text: "Pina to ko mihecaan iso",
        options: ["你幾歲了？", "你有多少錢？", "你有幾個小孩？"],
        correct_answer: "你幾歲了？",
        hint: "Mihecaan (歲數/年) (Standard)",
    },
    QuizItem {
        prompt: "單字測驗：Anocila",
        audio_text: "Anocila",
        options: ["明天", "昨天", "今天"],
        correct_answer: "明天",
        hint: "Ano- (未來) + Cila",
    },
    QuizItem {
        prompt: "單字測驗：Nacila",
        audio_text: "Nacila",
        options: ["昨天", "明天", "後天"],
        correct_answer: "昨天",
        hint: "Na- (過去) + Cila",
    },
    QuizItem {
        prompt: "Maromi'ad ciira a matayal.",
        audio_text: "Maromi'ad ciira a matayal",
        options: ["他工作了一整天", "他不想工作", "他剛開始工作"],
        correct_answer: "他工作了一整天",
        hint: "Ma-romi'ad (度過一天/整天)",
    },
];
