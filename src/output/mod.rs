//! Output renderers: terminal, markdown, JSON.

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::models::{ChangelogResult, Section};

/// A finished run plus the label of the source it was read from.
#[derive(Debug, Clone)]
pub struct ChangelogReport {
    pub result: ChangelogResult,
    pub source: String,
}

impl ChangelogReport {
    pub fn new(result: ChangelogResult, source: impl Into<String>) -> Self {
        Self {
            result,
            source: source.into(),
        }
    }

    /// `"Last 3 commits"` style subtitle.
    pub fn subtitle(&self) -> String {
        let count = self.result.commit_count.unwrap_or(0);
        let noun = if count == 1 { "commit" } else { "commits" };
        format!("Last {count} {noun}")
    }
}

/// Trait for rendering a changelog report to an output format.
pub trait OutputRenderer {
    /// Render the report to a string.
    fn render(&self, report: &ChangelogReport) -> String;
}

/// Strip a leading list marker (`-`, `*`, `•`) from a body line.
pub(crate) fn bullet_text(line: &str) -> &str {
    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return rest.trim_start();
        }
    }
    line
}

/// Split a trailing parenthetical off a bullet: `"x (y)"` → `("x", Some("(y)"))`.
pub(crate) fn split_trailer(text: &str) -> (&str, Option<&str>) {
    if text.ends_with(')') {
        if let Some(open) = text.rfind(" (") {
            return (&text[..open], Some(&text[open + 1..]));
        }
    }
    (text, None)
}

/// Sections that carry something to show.
pub(crate) fn visible(sections: &[Section]) -> impl Iterator<Item = &Section> {
    sections.iter().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_markers_are_stripped() {
        assert_eq!(bullet_text("- Add login"), "Add login");
        assert_eq!(bullet_text("*   Fix crash"), "Fix crash");
        assert_eq!(bullet_text("• Docs"), "Docs");
        assert_eq!(bullet_text("Plain line"), "Plain line");
    }

    #[test]
    fn trailer_is_split_off() {
        assert_eq!(
            split_trailer("Add login (2024-01-03, alice)"),
            ("Add login", Some("(2024-01-03, alice)"))
        );
        assert_eq!(split_trailer("No trailer"), ("No trailer", None));
        assert_eq!(split_trailer("(only)"), ("(only)", None));
    }

    #[test]
    fn subtitle_pluralizes() {
        let one = ChangelogReport::new(
            ChangelogResult::generated("x".into(), vec![], 1, 0),
            "pasted text",
        );
        assert_eq!(one.subtitle(), "Last 1 commit");
        let many = ChangelogReport::new(
            ChangelogResult::generated("x".into(), vec![], 12, 0),
            "pasted text",
        );
        assert_eq!(many.subtitle(), "Last 12 commits");
    }
}
