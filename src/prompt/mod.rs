//! Prompt construction for changelog generation.
//!
//! [`build_prompt`] is a pure function of the request and the size bound:
//! the same input always produces a byte-identical prompt.

use crate::models::{ChangelogRequest, CommitRecord};

/// Fixed system instruction block sent with every request.
pub const SYSTEM_PROMPT: &str = "\
You are a technical writer producing release notes that end users can read.

Turn the commit list you are given into a short, categorized changelog.

Categories, in this order:
- Features: new capabilities
- Fixes: problems that were solved
- Improvements: existing behavior that got better or faster
- Documentation: docs, comments and guides
- Other: configuration, dependencies and changes whose intent is unclear

Rules:
- Write each category as a markdown heading of the form `## <Category>:`.
- Leave out categories with no entries.
- One bullet (`- `) per change, one or two lines, in plain everyday language.
- Mention the affected file or area when the commit message names it.
- End every bullet with ` - by <author>` using the author from the commit line.
- Do not include commit hashes.
- Skip merge commits, version bumps, work-in-progress commits and trivial housekeeping.
- Output only the changelog, with no preamble or closing remarks.";

/// A fully built request for the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogPrompt {
    pub system: String,
    pub user: String,
    /// Number of commits serialized into `user`.
    pub included: usize,
    /// Number of commits dropped to respect the size bound.
    pub omitted: usize,
}

/// Serialize one commit as a single prompt line.
///
/// `<hash> <subject> (author: <author>)`, or without the hash prefix when
/// the record has none.
pub fn format_commit_line(record: &CommitRecord) -> String {
    match record.hash.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(hash) => format!("{hash} {} (author: {})", record.subject(), record.author),
        None => format!("{} (author: {})", record.subject(), record.author),
    }
}

/// Build the prompt for a request.
///
/// The serialized commit list is capped at `max_chars` characters. Records
/// are taken in input order (newest first), so the oldest ones are the first
/// to be dropped. At least one record is always included; a first line longer
/// than the bound is cut at a character boundary.
pub fn build_prompt(request: &ChangelogRequest, max_chars: usize) -> ChangelogPrompt {
    let max_chars = max_chars.max(1);
    let mut block = String::new();
    let mut used = 0usize;
    let mut included = 0usize;

    for record in &request.commits {
        let line = format_commit_line(record);
        let len = line.chars().count();
        let cost = if included == 0 { len } else { len + 1 };

        if included == 0 && len > max_chars {
            block.extend(line.chars().take(max_chars));
            included = 1;
            break;
        }
        if used + cost > max_chars {
            break;
        }
        if included > 0 {
            block.push('\n');
        }
        block.push_str(&line);
        used += cost;
        included += 1;
    }

    let omitted = request.commits.len() - included;
    if omitted > 0 {
        tracing::warn!(
            included,
            omitted,
            max_chars,
            "commit list exceeds prompt size bound, dropping oldest commits"
        );
    }

    let from = request.from_ref.as_deref().unwrap_or("start");
    let to = request.to_ref.as_deref().unwrap_or("HEAD");
    let user = format!(
        "Here is the commit log to convert into a changelog:\n\n\
         Commits from {from} to {to}:\n\n\
         {block}\n"
    );

    ChangelogPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        included,
        omitted,
    }
}
