//! Response parsing — turns raw generated text into structured values.
//!
//! All heuristics live here as small pure functions so the orchestration
//! loops stay free of inline text munging.

use std::sync::OnceLock;

use regex::Regex;

/// Placeholder written into both fields when a labeled-pair response does
/// not carry the expected two lines.
pub const MALFORMED_FIELD: &str = "[ERROR] malformed response";

/// Substrings that mark a generated title as reading like a sentence
/// instead of a role name. One corrective retry is issued when any appear.
pub const BANNED_TITLE_PHRASES: &[&str] = &["する", "です", "募集"];

/// Reserved marker: everything from this substring on is dropped from a
/// normalized title.
const VARIATION_MARKER: &str = "バリエーション";

const TITLE_LABEL: &str = "職種名";
const DETAIL_LABEL: &str = "仕事内容";

fn bullet_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-\d\.・\s]+").expect("bullet prefix regex compiles"))
}

/// Strips a leading bullet/numbering run (hyphen, digits, period, middle
/// dot, whitespace) and trims. Idempotent: a stripped line is unchanged by
/// a second pass.
pub fn strip_bullet_prefix(line: &str) -> &str {
    let rest = match bullet_prefix_re().find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    };
    rest.trim()
}

/// Splits a decomposition response into task labels: one per non-blank
/// line, bullet prefixes removed. Lines that were nothing but bullets
/// disappear.
pub fn split_task_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_bullet_prefix)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Same line discipline as [`split_task_lines`] but capped at `limit`
/// candidates. A shortfall is accepted as-is — never padded, never retried.
pub fn split_variation_lines(raw: &str, limit: usize) -> Vec<String> {
    let mut lines = split_task_lines(raw);
    lines.truncate(limit);
    lines
}

pub fn first_line(raw: &str) -> &str {
    raw.trim().lines().next().unwrap_or_default().trim()
}

/// Cleans a variant-title response: first line only, bullet prefix
/// removed, truncated at the variation marker if the model rambled on.
pub fn clean_variant_title(raw: &str) -> String {
    strip_bullet_prefix(first_line(raw))
        .split(VARIATION_MARKER)
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// True when a generated title contains a banned sentence-like phrase and
/// needs the one-shot corrective retry.
pub fn needs_title_fix(title: &str) -> bool {
    BANNED_TITLE_PHRASES.iter().any(|p| title.contains(p))
}

fn strip_label<'a>(line: &'a str, label: &str) -> &'a str {
    let line = line.trim();
    match line.strip_prefix(label) {
        Some(rest) => rest.trim_start_matches([':', '：', ' ', '　']).trim(),
        None => line,
    }
}

/// Parses the combined duplication response: line 0 is the labeled title,
/// line 1 the labeled detail. Fewer than two non-blank lines resolves both
/// fields to [`MALFORMED_FIELD`] rather than raising.
pub fn parse_labeled_pair(raw: &str) -> (String, String) {
    let lines: Vec<&str> = raw
        .trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return (MALFORMED_FIELD.to_string(), MALFORMED_FIELD.to_string());
    }

    (
        strip_label(lines[0], TITLE_LABEL).to_string(),
        strip_label(lines[1], DETAIL_LABEL).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bullet_prefix_variants() {
        assert_eq!(strip_bullet_prefix("- 部品の組立"), "部品の組立");
        assert_eq!(strip_bullet_prefix("・検品作業"), "検品作業");
        assert_eq!(strip_bullet_prefix("1. 梱包"), "梱包");
        assert_eq!(strip_bullet_prefix("  3・ 出荷準備"), "出荷準備");
    }

    #[test]
    fn test_strip_bullet_prefix_is_idempotent() {
        let once = strip_bullet_prefix("- 2名での検品");
        assert_eq!(strip_bullet_prefix(once), once);
        let plain = strip_bullet_prefix("部品の組立");
        assert_eq!(strip_bullet_prefix(plain), plain);
    }

    #[test]
    fn test_split_task_lines_drops_blanks_and_bullet_only_lines() {
        let raw = "- 部品の組立\n\n・検品作業\n---\n2. 梱包";
        assert_eq!(split_task_lines(raw), vec!["部品の組立", "検品作業", "梱包"]);
    }

    #[test]
    fn test_split_variation_lines_truncates_but_never_pads() {
        let raw = "- 組立スタッフ\n- 製造オペレーター\n- ライン作業員";
        assert_eq!(split_variation_lines(raw, 2).len(), 2);
        assert_eq!(split_variation_lines(raw, 5).len(), 3);
    }

    #[test]
    fn test_clean_variant_title_takes_first_line_only() {
        assert_eq!(clean_variant_title("組立スタッフ\n他の案:\n検品係"), "組立スタッフ");
    }

    #[test]
    fn test_clean_variant_title_strips_bullet_prefix() {
        // single-variant responses still come back bulleted
        assert_eq!(clean_variant_title("- 組立スタッフ"), "組立スタッフ");
        assert_eq!(
            clean_variant_title("1. 組立スタッフ バリエーション2"),
            "組立スタッフ"
        );
    }

    #[test]
    fn test_clean_variant_title_truncates_at_marker() {
        assert_eq!(
            clean_variant_title("組立スタッフ バリエーション1"),
            "組立スタッフ"
        );
    }

    #[test]
    fn test_needs_title_fix_on_banned_phrases() {
        assert!(needs_title_fix("部品を組み立てるお仕事です"));
        assert!(needs_title_fix("組立スタッフ募集"));
        assert!(needs_title_fix("検品する人"));
        assert!(!needs_title_fix("組立スタッフ"));
    }

    #[test]
    fn test_parse_labeled_pair_happy_path() {
        let raw = "職種名: 組立スタッフ\n仕事内容: 部品を組み立てるお仕事です。";
        let (title, detail) = parse_labeled_pair(raw);
        assert_eq!(title, "組立スタッフ");
        assert_eq!(detail, "部品を組み立てるお仕事です。");
    }

    #[test]
    fn test_parse_labeled_pair_fullwidth_colon() {
        let raw = "職種名：検品係\n仕事内容：完成品の検査を行います。";
        let (title, detail) = parse_labeled_pair(raw);
        assert_eq!(title, "検品係");
        assert_eq!(detail, "完成品の検査を行います。");
    }

    #[test]
    fn test_parse_labeled_pair_short_response_degrades() {
        let (title, detail) = parse_labeled_pair("組立スタッフ");
        assert_eq!(title, MALFORMED_FIELD);
        assert_eq!(detail, MALFORMED_FIELD);

        let (title, detail) = parse_labeled_pair("");
        assert_eq!(title, MALFORMED_FIELD);
        assert_eq!(detail, MALFORMED_FIELD);
    }

    #[test]
    fn test_parse_labeled_pair_unlabeled_lines_pass_through() {
        let (title, detail) = parse_labeled_pair("組立スタッフ\n部品を組み立てます。");
        assert_eq!(title, "組立スタッフ");
        assert_eq!(detail, "部品を組み立てます。");
    }
}
