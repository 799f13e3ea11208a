//! Splits chat text into comparable word tokens.
//!
//! Words are whitespace-delimited chunks with Unicode punctuation (`\p{P}`)
//! trimmed from both ends, in any script. Symbols and emoji (`\p{S}`) are
//! never trimmed, so `-❇"` becomes `❇` and `$5` stays `$5`.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// A single word of a message, trimmed and lower-cased for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub normalized: String,
    /// Byte range of the kept text inside the source message.
    pub span: Range<usize>,
}

/// Leading and trailing punctuation around the kept core (group 1).
static EDGE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\p{P}*(.*?)\p{P}*$").unwrap());

/// Whitespace-delimited chunks with their byte offsets.
fn chunks(message: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = None;

    for (i, c) in message.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, &message[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &message[s..]));
    }

    out
}

/// Tokenize a message.
///
/// A chunk made only of punctuation is dropped, unless it is a single
/// character: a lone `?` or `!` stays a token of its own.
pub fn tokenize(message: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    for (start, chunk) in chunks(message) {
        let Some(core) = EDGE_PUNCTUATION.captures(chunk).and_then(|caps| caps.get(1)) else {
            continue;
        };

        let (offset, kept) = if !core.as_str().is_empty() {
            (core.start(), core.as_str())
        } else if chunk.chars().count() == 1 {
            (0, chunk)
        } else {
            continue;
        };

        let begin = start + offset;
        tokens.push(Token {
            normalized: kept.to_lowercase(),
            span: begin..begin + kept.len(),
        });
    }

    tokens
}

/// Canonical lookup form of a trigger: its tokens joined by single spaces.
///
/// Empty when the text has no tokens at all.
pub fn normalize(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|t| t.normalized)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(message: &str) -> Vec<String> {
        tokenize(message).into_iter().map(|t| t.normalized).collect()
    }

    #[test]
    fn test_splits_on_whitespace_runs() {
        assert_eq!(words("  foo   bar\tbaz\n"), vec!["foo", "bar", "baz"]);
        assert!(words("   ").is_empty());
    }

    #[test]
    fn test_strips_edge_punctuation() {
        assert_eq!(
            words("This is a message, where the \"foo\" text is embedded..."),
            vec!["this", "is", "a", "message", "where", "the", "foo", "text", "is", "embedded"]
        );
        assert_eq!(words("hi\""), vec!["hi"]);
        assert_eq!(words("«bonjour»"), vec!["bonjour"]);
    }

    #[test]
    fn test_keeps_inner_punctuation() {
        assert_eq!(words("don't e-mail foo.bar"), vec!["don't", "e-mail", "foo.bar"]);
    }

    #[test]
    fn test_lowercases_unicode() {
        assert_eq!(words("LoReM ÄÖÜ ΣΟΦΙΑ"), vec!["lorem", "äöü", "σοφια"]);
    }

    #[test]
    fn test_symbols_survive() {
        assert_eq!(words("❇"), vec!["❇"]);
        assert_eq!(words("-❇\""), vec!["❇"]);
        assert_eq!(words("$5 +1"), vec!["$5", "+1"]);
    }

    #[test]
    fn test_non_latin_punctuation() {
        assert_eq!(words("नमस्ते।"), vec!["नमस्ते"]);
        assert_eq!(words("مرحبا، يا صديقي"), vec!["مرحبا", "يا", "صديقي"]);
        assert_eq!(words("բարեւ։"), vec!["բարեւ"]);
        assert_eq!(words("ｆｏｏ．"), vec!["ｆｏｏ"]);
        assert_eq!(words("foo‽"), vec!["foo"]);
        assert_eq!(words("「こんにちは」"), vec!["こんにちは"]);
    }

    #[test]
    fn test_lone_punctuation() {
        assert_eq!(words("?"), vec!["?"]);
        assert_eq!(words("what ... now"), vec!["what", "now"]);
    }

    #[test]
    fn test_spans_point_into_message() {
        let message = "say \"Hello\", world";
        let tokens = tokenize(message);
        assert_eq!(&message[tokens[1].span.clone()], "Hello");
        assert_eq!(&message[tokens[2].span.clone()], "world");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Good   Morning! "), "good morning");
        assert_eq!(normalize("lOrEm"), "lorem");
        assert_eq!(normalize("..."), "");
    }
}
