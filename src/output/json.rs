//! JSON output renderer.
//!
//! Outputs the [`ChangelogResult`](crate::models::ChangelogResult) as-is,
//! with the source label alongside.

use crate::output::{ChangelogReport, OutputRenderer};

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, report: &ChangelogReport) -> String {
        let mut value = serde_json::to_value(&report.result).unwrap_or_default();
        if let Some(map) = value.as_object_mut() {
            map.insert("source".into(), report.source.clone().into());
        }
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangelogResult, ErrorKind, Section};

    #[test]
    fn render_success() {
        let result = ChangelogResult::generated(
            "## Features:\n- Add login".into(),
            vec![Section {
                heading: Some("## Features:".into()),
                lines: vec!["- Add login".into()],
            }],
            2,
            0,
        );
        let output = JsonRenderer.render(&ChangelogReport::new(result, "pasted text"));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["commit_count"], 2);
        assert_eq!(parsed["source"], "pasted text");
        assert_eq!(parsed["sections"][0]["lines"][0], "- Add login");
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn render_failure() {
        let result = ChangelogResult::failed(ErrorKind::Validation, "no commits to process", None);
        let output = JsonRenderer.render(&ChangelogReport::new(result, "pasted text"));
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["error_kind"], "validation");
        assert_eq!(parsed["error"], "no commits to process");
        assert!(parsed.get("notes").is_none());
    }
}
