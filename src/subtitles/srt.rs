//! SRT subtitle cleanup.

use std::sync::OnceLock;

use regex::Regex;

fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[.*?\]").expect("valid annotation regex"))
}

/// Extract clean spoken text from SRT subtitle content.
///
/// Drops cue indices and timestamp lines, strips `[music]`-style
/// annotations, and collapses multi-line cues into single lines joined by
/// spaces.
pub fn raw_text(srt: &str) -> String {
    let normalized = srt.replace("\r\n", "\n");
    let mut cues: Vec<String> = Vec::new();

    for block in normalized.trim().split("\n\n") {
        let parts: Vec<&str> = block.trim().lines().collect();

        // A well-formed cue is index, timestamp, then at least one text line.
        if parts.len() < 3 {
            continue;
        }

        let cleaned: Vec<String> = parts[2..]
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| annotation_pattern().replace_all(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        let cue_text = cleaned.join(" ");
        if !cue_text.is_empty() {
            cues.push(cue_text);
        }
    }

    cues.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:04,000\nHello there.\n\n2\n00:00:04,500 --> 00:00:07,000\nWelcome to\nthe show.\n";

    #[test]
    fn extracts_text_and_drops_metadata() {
        assert_eq!(raw_text(SAMPLE), "Hello there. Welcome to the show.");
    }

    #[test]
    fn strips_bracketed_annotations() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n[music] And we're back.\n\n2\n00:00:02,000 --> 00:00:03,000\n[applause]\n";
        assert_eq!(raw_text(srt), "And we're back.");
    }

    #[test]
    fn collapses_multi_line_cues() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\nfirst line\nsecond line\n";
        assert_eq!(raw_text(srt), "first line second line");
    }

    #[test]
    fn skips_malformed_blocks() {
        let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n\nnot a cue\n";
        assert_eq!(raw_text(srt), "");
    }

    #[test]
    fn handles_crlf_line_endings() {
        let srt = "1\r\n00:00:01,000 --> 00:00:02,000\r\nHello.\r\n";
        assert_eq!(raw_text(srt), "Hello.");
    }

    #[test]
    fn empty_input_yields_empty_text() {
        assert_eq!(raw_text(""), "");
    }
}
