use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Rejoin words split across a line break by a hyphen.
///
/// Only joins when the continuation starts lowercase, so `"detec-\ntion"`
/// becomes `"detection"` while `"GPT-\n4"` and `"Jean-\nPaul"` keep the hyphen.
pub fn rejoin_hyphenated(text: &str) -> String {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{Ll})").unwrap());
    RE.replace_all(text, "$1$2").into_owned()
}

/// Collapse every run of whitespace (including newlines) to a single space
/// and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize raw extracted text before segmentation.
///
/// Line endings become `\n`, form feeds (page breaks) become paragraph
/// breaks, ligatures are expanded and the result is NFC-normalized so that
/// visually identical text compares equal.
pub fn prepare_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n").replace('\u{000C}', "\n\n");
    let text = expand_ligatures(&text);
    let text = rejoin_hyphenated(&text);
    text.nfc().collect()
}

/// Split already-collapsed text into sentences.
///
/// A sentence ends at `.`, `!` or `?` (optionally followed by closing quotes
/// or brackets) when whitespace follows. The terminator stays with its
/// sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut after_terminator = false;

    while let Some(c) = chars.next() {
        if c.is_whitespace() && after_terminator {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
            after_terminator = false;
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            continue;
        }
        current.push(c);
        after_terminator = match c {
            '.' | '!' | '?' => true,
            '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}' => after_terminator,
            _ => false,
        };
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_ligatures() {
        assert_eq!(expand_ligatures("e\u{FB03}cient"), "efficient");
        assert_eq!(expand_ligatures("\u{FB01}nd \u{FB02}ow"), "find flow");
    }

    #[test]
    fn test_rejoin_hyphenated_syllable_break() {
        assert_eq!(rejoin_hyphenated("detec-\ntion"), "detection");
        assert_eq!(rejoin_hyphenated("detec- \n tion works"), "detection works");
    }

    #[test]
    fn test_rejoin_hyphenated_keeps_proper_nouns_and_numbers() {
        assert_eq!(rejoin_hyphenated("Jean-\nPaul"), "Jean-\nPaul");
        assert_eq!(rejoin_hyphenated("GPT-\n4"), "GPT-\n4");
        assert_eq!(rejoin_hyphenated("well-known"), "well-known");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn test_prepare_text_nfc_and_page_breaks() {
        // "e" + combining acute -> precomposed "é"
        let prepared = prepare_text("cafe\u{0301}\u{000C}next\r\nline");
        assert_eq!(prepared, "caf\u{00E9}\n\nnext\nline");
    }

    #[test]
    fn test_split_sentences() {
        let s = split_sentences("First one. Second one! Third? Trailing");
        assert_eq!(s, vec!["First one.", "Second one!", "Third?", "Trailing"]);
    }

    #[test]
    fn test_split_sentences_keeps_decimals_and_quotes() {
        let s = split_sentences("Pi is 3.14 today. He said \"stop.\" Then left.");
        assert_eq!(s, vec!["Pi is 3.14 today.", "He said \"stop.\"", "Then left."]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }
}
