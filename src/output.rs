use eyre::Result;

use crate::{ResolvedChannel, VideoRecord};

/// Render video records as a TSV table (header + one row per video).
/// Comments and caption text stay in the JSON rendering; the table carries
/// counts and the caption tier.
pub fn render_tsv(records: &[VideoRecord]) -> String {
    let mut lines =
        vec!["video_id\ttitle\tviews\tlikes\tdislikes\tupload_date\tcomments\tcaption".to_string()];
    for record in records {
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.video_id,
            cell(&record.title),
            opt_count(record.views),
            opt_count(record.likes),
            opt_count(record.dislikes),
            record.upload_date.as_deref().unwrap_or(""),
            record.comments.len(),
            record.caption,
        ));
    }
    lines.join("\n")
}

pub fn render_json(records: &[VideoRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn render_resolved_tsv(resolved: &[ResolvedChannel]) -> String {
    let mut lines = vec!["channel_name\tchannel_id".to_string()];
    for row in resolved {
        lines.push(format!("{}\t{}", cell(&row.channel_name), row.channel_id));
    }
    lines.join("\n")
}

pub fn render_resolved_json(resolved: &[ResolvedChannel]) -> Result<String> {
    Ok(serde_json::to_string_pretty(resolved)?)
}

fn opt_count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// Keep free-text fields from breaking the row structure
fn cell(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}
