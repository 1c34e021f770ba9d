//! Plain-text cleanup and presentation of provider output
//!
//! Providers are asked for plain text but still sneak markdown through, so
//! every study result is scrubbed and re-indented before it reaches the user.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,!?;:\-()"']"#).expect("valid charset pattern"));
static DOUBLE_STOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\s*\.").expect("valid stop pattern"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.!?])").expect("valid punct pattern"));
static SENTENCE_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])\s*([A-Z])").expect("valid gap pattern"));

/// Markup tokens removed from provider output, longest form first.
const MARKUP_TOKENS: &[&str] = &[
    "**", "*", "##", "#", "---", "--", "__", "_", "~~", "~", "```", "`", "||", "|", ">>", ">",
    "<<", "<",
];

/// Normalize scraped or extracted text: collapse whitespace, drop characters
/// outside the prose charset, and fix sentence spacing.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = WHITESPACE.replace_all(text.trim(), " ");
    let text = DISALLOWED.replace_all(&text, "");
    let text = DOUBLE_STOP.replace_all(&text, ".");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "${1}");
    let text = SENTENCE_GAP.replace_all(&text, "${1} ${2}");
    text.trim().to_string()
}

/// Remove markdown control characters the model was told not to use.
pub fn strip_markup(text: &str) -> String {
    let mut out = text.to_string();
    for token in MARKUP_TOKENS {
        out = out.replace(token, "");
    }
    out
}

/// Re-indent a summary: bullets get inset, key sections get a marker.
pub fn format_summary(content: &str) -> String {
    let content = strip_markup(content);
    let mut lines = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_bullet(line) {
            lines.push(format!("    {}", strip_bullet(line)));
        } else if line.starts_with("Key")
            || line.starts_with("Main")
            || line.starts_with("Important")
            || line.starts_with("Summary")
            || line.starts_with("🔑")
        {
            lines.push(format!("\n🔑 {}", line));
        } else {
            lines.push(line.to_string());
        }
    }

    lines.join("\n")
}

/// Number the questions of a quiz and inset options and answers.
pub fn format_mcq(content: &str) -> String {
    let content = strip_markup(content);
    let mut lines = Vec::new();
    let mut question = 1;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Q:") || line.starts_with("Question:") || line.contains('?') {
            lines.push(format!("\n❓ Question {}:", question));
            let text = line
                .trim_start_matches("Q:")
                .trim_start_matches("Question:")
                .trim();
            lines.push(format!("    {}", text));
            question += 1;
        } else if ["A)", "B)", "C)", "D)"].iter().any(|p| line.starts_with(p)) {
            lines.push(format!("        {}", line));
        } else if line.starts_with("Answer:")
            || line.starts_with("Correct:")
            || line.starts_with("Explanation:")
        {
            lines.push(format!("    ✅ {}", line));
        } else {
            lines.push(format!("    {}", line));
        }
    }

    lines.join("\n")
}

/// Pair question and answer lines into numbered cards.
pub fn format_flashcards(content: &str) -> String {
    let content = strip_markup(content);
    let mut lines = Vec::new();
    let mut card = 1;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("Q:")
            || line.starts_with("Question:")
            || line.starts_with("Front:")
            || line.contains('?')
        {
            lines.push(format!("\n🃏 Card {}:", card));
            let text = line
                .trim_start_matches("Q:")
                .trim_start_matches("Question:")
                .trim_start_matches("Front:")
                .trim();
            lines.push(format!("    ❓ {}", text));
            card += 1;
        } else if line.starts_with("A:") || line.starts_with("Answer:") || line.starts_with("Back:")
        {
            let text = line
                .trim_start_matches("A:")
                .trim_start_matches("Answer:")
                .trim_start_matches("Back:")
                .trim();
            lines.push(format!("    ✅ {}", text));
        } else {
            lines.push(format!("    {}", line));
        }
    }

    lines.join("\n")
}

fn is_bullet(line: &str) -> bool {
    line.starts_with('•')
        || line.starts_with('-')
        || line.starts_with('*')
        || ["1.", "2.", "3.", "4.", "5."]
            .iter()
            .any(|p| line.starts_with(p))
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(['•', '-', '*']).trim()
}
