//! Tokenizer adapter — wraps the morphological tokenizer behind a trait and
//! derives the prefix/suffix decoration used when re-titling split tasks.

/// Opaque tokenization capability: text in, ordered surface forms out.
///
/// The default [`CharClassTokenizer`] segments on character-class runs,
/// which is enough for the particle-boundary scan below. A dictionary-based
/// morphological analyzer can be swapped in behind this seam without
/// touching the pipelines.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Kanji,
    Hiragana,
    Katakana,
    Alnum,
    Other,
}

fn class_of(c: char) -> CharClass {
    match c {
        '\u{3040}'..='\u{309F}' => CharClass::Hiragana,
        '\u{30A0}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' => CharClass::Katakana,
        '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}' | '々' | '〆' => CharClass::Kanji,
        _ if c.is_alphanumeric() => CharClass::Alnum,
        _ => CharClass::Other,
    }
}

/// Splits text into runs of a single character class. Whitespace is dropped,
/// matching what a morphological analyzer does with it.
#[derive(Debug, Default, Clone)]
pub struct CharClassTokenizer;

impl Tokenizer for CharClassTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_class = None;

        for c in text.chars() {
            if c.is_whitespace() {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                    current_class = None;
                }
                continue;
            }
            let class = class_of(c);
            if current_class.is_some() && current_class != Some(class) {
                tokens.push(std::mem::take(&mut current));
            }
            current.push(c);
            current_class = Some(class);
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        tokens
    }
}

/// Derives the title decoration carried onto every split task:
///
/// - prefix: all token surfaces up to and including the first one ending in
///   the particle "の" (covers "での"); empty when no such token exists.
///   First match wins.
/// - suffix: the last whitespace-delimited segment of the raw title, when
///   the title contains any whitespace; otherwise empty. Only the final
///   segment is used no matter how many separators appear.
pub fn extract_prefix_suffix(tokenizer: &dyn Tokenizer, title: &str) -> (String, String) {
    let tokens = tokenizer.tokenize(title);

    let mut prefix = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.ends_with('の') {
            prefix = tokens[..=i].concat();
            break;
        }
    }

    let suffix = if title.chars().any(char::is_whitespace) {
        title
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string()
    } else {
        String::new()
    };

    (prefix, suffix)
}

/// Re-titles one split task: `prefix + task`, then an ideographic space and
/// the suffix when a suffix exists.
pub fn format_task(task: &str, prefix: &str, suffix: &str) -> String {
    let mut result = format!("{prefix}{task}");
    if !suffix.is_empty() {
        result.push('　');
        result.push_str(suffix);
    }
    result
}
