//! Splits a raw completion into display sections.
//!
//! Purely structural: lines are trimmed and grouped, never rewritten,
//! dropped or reordered. Flattening the sections back out gives exactly
//! the non-blank lines of the input.

use crate::models::Section;

/// Prefixes that mark a category heading by default.
///
/// `#` covers markdown headings; the glyphs cover emoji-led headings
/// (feature, bugfix, performance, tooling, documentation).
pub const DEFAULT_HEADING_MARKERS: &[&str] = &["#", "✨", "🐛", "⚡", "🔧", "📝"];

/// Ordered set of heading prefixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingMarkers(Vec<String>);

impl HeadingMarkers {
    pub fn new(markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(
            markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        )
    }

    pub fn is_heading(&self, line: &str) -> bool {
        self.0.iter().any(|m| line.starts_with(m.as_str()))
    }
}

impl Default for HeadingMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_HEADING_MARKERS.iter().copied())
    }
}

/// Segment `raw` into sections.
///
/// Blank lines close the current block. Inside a block a heading line
/// opens a new section; any other line joins the current one. Lines that
/// appear before any heading in a block form a section without a heading.
pub fn render_sections(raw: &str, markers: &HeadingMarkers) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<Section> = None;

    for line in raw.lines().map(str::trim) {
        if line.is_empty() {
            // Block boundary. A heading followed by a blank line keeps
            // collecting: its bullets usually come in the next block.
            if let Some(section) = current.take() {
                if section.lines.is_empty() && section.heading.is_some() {
                    current = Some(section);
                } else {
                    sections.push(section);
                }
            }
            continue;
        }

        if markers.is_heading(line) {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = Some(Section {
                heading: Some(line.to_string()),
                lines: Vec::new(),
            });
        } else {
            current
                .get_or_insert_with(Section::default)
                .lines
                .push(line.to_string());
        }
    }

    if let Some(section) = current {
        sections.push(section);
    }
    sections
}

/// Flatten sections back into their lines, headings first within each section.
pub fn flatten(sections: &[Section]) -> Vec<&str> {
    sections
        .iter()
        .flat_map(|s| s.heading.as_deref().into_iter().chain(s.lines.iter().map(String::as_str)))
        .collect()
}
