//! Terminal renderer: banner, colored category headings, bullet lines.

use colored::{Color, Colorize};

use crate::output::{bullet_text, split_trailer, visible, ChangelogReport, OutputRenderer};

const RULE_WIDTH: usize = 70;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, report: &ChangelogReport) -> String {
        let result = &report.result;
        let mut output = String::new();

        if !result.success {
            let kind = result
                .error_kind
                .map(|k| format!(" ({k})"))
                .unwrap_or_default();
            output.push_str(&format!(
                " {} {}{}\n",
                "✖".red().bold(),
                result.error.as_deref().unwrap_or("changelog generation failed").red(),
                kind.dimmed()
            ));
            return output;
        }

        let rule = "=".repeat(RULE_WIDTH);
        output.push_str(&format!("\n{}\n", rule.yellow()));
        output.push_str(&format!("{}\n", "CHANGELOG".yellow().bold()));
        output.push_str(&format!(
            "{}\n",
            format!("({}, {})", report.subtitle(), report.source).dimmed()
        ));
        output.push_str(&format!("{}\n\n", rule.yellow()));

        for section in visible(&result.sections) {
            if let Some(title) = section.title() {
                let color = heading_color(title);
                output.push_str(&format!(
                    "{}\n",
                    format!("*** {} ***", title.to_uppercase()).color(color).bold()
                ));
            }
            for line in &section.lines {
                let (text, trailer) = split_trailer(bullet_text(line));
                match trailer {
                    Some(trailer) => output.push_str(&format!(
                        "  • {} {}\n",
                        text,
                        trailer.yellow().bold()
                    )),
                    None => output.push_str(&format!("  • {text}\n")),
                }
            }
            output.push('\n');
        }

        if let Some(ref warning) = result.warning {
            output.push_str(&format!(" {} {}\n\n", "⚠".yellow().bold(), warning.yellow()));
        }

        output.push_str(&format!("{}\n", "─".repeat(RULE_WIDTH).dimmed()));
        output.push_str(&format!(" {}\n", crate::constants::AI_DISCLOSURE.dimmed()));
        output
    }
}

/// Pick a heading color from the category name.
fn heading_color(title: &str) -> Color {
    let lower = title.to_lowercase();
    if lower.contains("feature") {
        Color::Green
    } else if lower.contains("fix") || lower.contains("bug") {
        Color::Red
    } else if lower.contains("improve") || lower.contains("perf") {
        Color::Blue
    } else if lower.contains("doc") {
        Color::Cyan
    } else if lower.contains("delet") || lower.contains("remov") {
        Color::Magenta
    } else {
        Color::Yellow
    }
}
