//! Markdown renderer, suitable for pasting into a release or CHANGELOG.md.

use crate::output::{visible, ChangelogReport, OutputRenderer};

pub struct MarkdownRenderer;

impl OutputRenderer for MarkdownRenderer {
    fn render(&self, report: &ChangelogReport) -> String {
        let result = &report.result;
        if !result.success {
            return format!(
                "> **Error:** {}\n",
                result.error.as_deref().unwrap_or("changelog generation failed")
            );
        }

        let mut output = format!("# CHANGELOG\n\n*{}*\n\n---\n\n", report.subtitle());
        for section in visible(&result.sections) {
            if let Some(title) = section.title() {
                output.push_str(&format!("\n### {title}\n\n"));
            }
            for line in &section.lines {
                output.push_str(line);
                output.push_str("\n\n");
            }
        }
        if let Some(ref warning) = result.warning {
            output.push_str(&format!("> {warning}\n\n"));
        }
        output
    }
}
