//! Document segmentation.
//!
//! Splits extracted raw text into titled sections. The sole boundary signal
//! is a numbered heading line (`12. Some Title`); everything between two
//! headings becomes the body of the first, and text before the first heading
//! is discarded. Documents that do not follow the numbered-heading
//! convention segment to nothing.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use docent_core::types::Section;

/// A line opens a new section iff it starts with one or more digits, a
/// literal period, and a single space.
fn title_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\. ").expect("Invalid title regex"))
}

/// Collapse runs of two or more newlines into one, normalizing extraction
/// artifacts such as page breaks.
fn blank_run_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("Invalid blank-run regex"))
}

/// True if the line would open a new section.
pub fn is_title_line(line: &str) -> bool {
    title_pattern().is_match(line)
}

/// Segment raw document text into an ordered sequence of sections.
///
/// Walks the lines in order, accumulating body text under the most recent
/// heading. Empty lines are skipped; trailing whitespace is trimmed from
/// every body. Two adjacent headings produce a section with an empty body,
/// which is valid and indexable.
pub fn segment(raw_text: &str) -> Vec<Section> {
    let normalized = blank_run_pattern().replace_all(raw_text, "\n");

    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for line in normalized.lines() {
        let line = line.trim();
        if is_title_line(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section::new(line, String::new()));
        } else if !line.is_empty() {
            if let Some(ref mut section) = current {
                section.body.push_str(line);
                section.body.push(' ');
            }
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }

    for section in &mut sections {
        section.body = section.body.trim_end().to_string();
    }

    debug!(section_count = sections.len(), "Document segmented");
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_question_document() {
        let raw = "1. What is X?\nX is a thing.\n2. What is Y?\nY is another thing.";
        let sections = segment(raw);
        assert_eq!(
            sections,
            vec![
                Section::new("1. What is X?", "X is a thing."),
                Section::new("2. What is Y?", "Y is another thing."),
            ]
        );
    }

    #[test]
    fn test_multi_line_body_joined_with_spaces() {
        let raw = "1. Heading\nfirst line\nsecond line\nthird line";
        let sections = segment(raw);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "first line second line third line");
    }

    #[test]
    fn test_leading_prose_is_discarded() {
        let raw = "cover page text\nmore preamble\n1. Real section\ncontent";
        let sections = segment(raw);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "1. Real section");
        assert_eq!(sections[0].body, "content");
    }

    #[test]
    fn test_no_title_lines_yields_empty() {
        let raw = "just some text\nwith no numbered headings\nat all";
        assert!(segment(raw).is_empty());
    }

    #[test]
    fn test_adjacent_titles_give_empty_body() {
        let raw = "1. First\n2. Second\nbody of second";
        let sections = segment(raw);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "");
        assert_eq!(sections[1].body, "body of second");
    }

    #[test]
    fn test_blank_line_runs_are_collapsed() {
        let raw = "1. Heading\nline one\n\n\n\nline two";
        let sections = segment(raw);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body, "line one line two");
    }

    #[test]
    fn test_title_detection() {
        assert!(is_title_line("1. Short"));
        assert!(is_title_line("142. A longer numbered heading"));
        assert!(!is_title_line("No leading number"));
        assert!(!is_title_line("1.No space after period"));
        assert!(!is_title_line("a. lettered heading"));
        assert!(!is_title_line(""));
    }

    #[test]
    fn test_title_count_matches_section_count() {
        let raw = (1..=7)
            .map(|i| format!("{}. Question {}\nAnswer {}.", i, i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let sections = segment(&raw);
        assert_eq!(sections.len(), 7);
        for (i, section) in sections.iter().enumerate() {
            assert_eq!(section.title, format!("{}. Question {}", i + 1, i + 1));
        }
    }

    #[test]
    fn test_idempotent_on_canonical_output() {
        let raw = "intro noise\n1. Alpha\na line\nanother line\n\n2. Beta\n3. Gamma\nbody";
        let first = segment(raw);

        let rejoined = first
            .iter()
            .map(|s| format!("{}\n{}", s.title, s.body))
            .collect::<Vec<_>>()
            .join("\n");
        let second = segment(&rejoined);

        assert_eq!(first, second);
    }

    #[test]
    fn test_windows_line_endings() {
        let raw = "1. Heading\r\nbody line\r\n2. Next\r\nmore";
        let sections = segment(raw);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].body, "body line");
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("").is_empty());
    }
}
