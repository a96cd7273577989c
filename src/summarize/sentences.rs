//! Rule-based sentence splitting for transcripts.
//!
//! Transcript text is messy: cues span lines, abbreviations and decimals are
//! common, and quotes wrap terminators. The splitter scans for `.`, `!` and
//! `?` and only accepts a boundary when the surrounding context looks like a
//! real sentence break. Whitespace inside a sentence is collapsed to single
//! spaces, so rejoining the sentences reproduces the input modulo whitespace.

/// Lowercase words that end with a period without ending a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "cf", "al",
    "approx", "dept", "est", "fig", "no", "inc", "ltd", "co", "corp", "gen", "rev", "capt", "sgt",
    "col", "lt", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "mon", "tue", "wed", "thu", "fri", "sat", "sun",
];

/// Split `text` into ordered sentences.
///
/// Returns an empty vector for blank input. Text without any terminator
/// comes back as a single sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    split_with_mode(text, false)
}

/// Split like [`split_sentences`] but without requiring the next sentence to
/// start with an uppercase letter, digit or opening quote.
///
/// Auto-generated captions often drop capitalization entirely; under the
/// strict rule such text collapses into one giant sentence. The abbreviation
/// and decimal guards still apply.
pub(crate) fn split_sentences_relaxed(text: &str) -> Vec<String> {
    split_with_mode(text, true)
}

fn split_with_mode(text: &str, relaxed: bool) -> Vec<String> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let ch = chars[i].1;
        if !is_terminator(ch) {
            i += 1;
            continue;
        }

        // Absorb terminator runs ("...", "?!") and trailing closers so the
        // quote or bracket stays attached to its sentence.
        let mut j = i + 1;
        while j < chars.len() && is_terminator(chars[j].1) {
            j += 1;
        }
        while j < chars.len() && is_closer(chars[j].1) {
            j += 1;
        }

        if is_boundary(text, &chars, i, j, ch, relaxed) {
            let end = if j < chars.len() {
                chars[j].0
            } else {
                text.len()
            };
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
        }
        i = j;
    }

    if start < text.len() {
        push_sentence(&mut sentences, &text[start..]);
    }

    sentences
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | ')' | ']' | '\u{2019}' | '\u{201d}')
}

fn is_opener(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '(' | '[' | '\u{2018}' | '\u{201c}')
}

/// Decide whether the terminator at `chars[i]` (with closers absorbed up to
/// `chars[j]`) ends a sentence.
fn is_boundary(
    text: &str,
    chars: &[(usize, char)],
    i: usize,
    j: usize,
    ch: char,
    relaxed: bool,
) -> bool {
    let next = chars[j..].iter().map(|&(_, c)| c).find(|c| !c.is_whitespace());

    // End of input always closes the sentence.
    let Some(next) = next else {
        return true;
    };

    if ch == '.' {
        // Decimal or version number: digit on both sides, no space.
        let prev = chars[..i].last().map(|&(_, c)| c);
        let immediate = chars.get(i + 1).map(|&(_, c)| c);
        if prev.is_some_and(|c| c.is_ascii_digit()) && immediate.is_some_and(|c| c.is_ascii_digit())
        {
            return false;
        }

        if is_abbreviation(word_before(text, chars[i].0)) {
            return false;
        }
    }

    // Relaxed mode breaks on any terminator directly followed by whitespace,
    // so "example.com" style tokens stay whole.
    if relaxed {
        return chars[j].1.is_whitespace();
    }

    // Only break when the next text plausibly starts a sentence.
    next.is_uppercase() || next.is_ascii_digit() || is_opener(next)
}

/// The word immediately preceding byte offset `end`, including internal
/// periods ("e.g", "u.s").
fn word_before(text: &str, end: usize) -> &str {
    let head = &text[..end];
    let start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '.')
        .last()
        .map(|(idx, _)| idx)
        .unwrap_or(end);
    &head[start..]
}

fn is_abbreviation(word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let lowered = word.to_lowercase();
    if ABBREVIATIONS.contains(&lowered.as_str()) {
        return true;
    }
    // Single initials and dotted acronyms: "J", "u.s".
    lowered
        .split('.')
        .all(|part| part.chars().count() == 1 && part.chars().all(|c| c.is_alphabetic()))
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if !normalized.is_empty() {
        sentences.push(normalized);
    }
}
