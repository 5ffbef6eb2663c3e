//! Terminal rendering for command results.

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;

use std::fmt::Write as _;

use serde::Serialize;
use session::library::{Answer, Document, QueryRecord};
use session::tier::{tier_label, trial_status};
use session::{Session, TrialStatus, UserProfile};

use crate::CliError;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

/// `whoami`: the profile plus everything derived from it.
#[must_use]
pub fn render_session(session: &Session) -> String {
    let Some(user) = &session.user else {
        return "not logged in".to_owned();
    };
    let limits = session.tier_limits();
    let mut out = String::new();
    let _ = writeln!(out, "{} <{}> (id {})", user.username, user.email, user.id);
    let _ = writeln!(out, "role:      {}", user.role);
    let _ = writeln!(out, "tier:      {}", tier_label(user));
    let _ = writeln!(out, "trial:     {}", trial_text(user));
    let _ = writeln!(out, "documents: {}", limits.documents);
    let _ = write!(out, "questions: {} per day", limits.queries_per_day);
    if !user.is_active {
        out.push_str("\naccount is deactivated");
    }
    out
}

#[must_use]
pub fn trial_text(user: &UserProfile) -> String {
    match trial_status(user) {
        TrialStatus::Inactive => "none".to_owned(),
        TrialStatus::Active => format!("{} days left", user.days_left_in_trial),
        TrialStatus::Ending => format!("ending, {} days left", user.days_left_in_trial),
        TrialStatus::Expired => "expired".to_owned(),
    }
}

#[must_use]
pub fn render_users(users: &[UserProfile]) -> String {
    if users.is_empty() {
        return "no users".to_owned();
    }
    let mut out = format!("{:>5}  {:<20} {:<30} {:<6} {:<16} {}", "ID", "USERNAME", "EMAIL", "ROLE", "TIER", "TRIAL");
    for user in users {
        let name = if user.is_active { user.username.clone() } else { format!("{} (inactive)", user.username) };
        let _ = write!(
            out,
            "\n{:>5}  {:<20} {:<30} {:<6} {:<16} {}",
            user.id,
            name,
            user.email,
            user.role.as_str(),
            tier_label(user),
            trial_text(user)
        );
    }
    out
}

#[must_use]
pub fn render_documents(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "no documents".to_owned();
    }
    let mut out = format!("{:>5}  {:<40} {:>9}  {:<10} {}", "ID", "FILE", "SIZE", "UPLOADED", "STATUS");
    for doc in documents {
        let status =
            if doc.is_processed { format!("{} chunks", doc.chunk_count) } else { "processing".to_owned() };
        let _ = write!(
            out,
            "\n{:>5}  {:<40} {:>9}  {:<10} {}",
            doc.id,
            doc.original_filename,
            format_size(doc.file_size),
            date_part(&doc.uploaded_at),
            status
        );
    }
    out
}

#[must_use]
pub fn render_answer(answer: &Answer) -> String {
    let mut out = answer.answer.trim().to_owned();
    if let Some(warning) = &answer.warning {
        let _ = write!(out, "\n\nwarning: {warning}");
    }
    if !answer.sources.is_empty() {
        let _ = write!(out, "\n\nsources ({}):", answer.source_count.max(answer.sources.len()));
        for (i, source) in answer.sources.iter().enumerate() {
            let _ = write!(out, "\n  [{}] {:.0}%  {}", i + 1, source.relevance * 100.0, excerpt(&source.content, 100));
        }
    }
    if let Some(secs) = answer.processing_time {
        let _ = write!(out, "\n\n({secs:.1}s)");
    }
    out
}

#[must_use]
pub fn render_history(records: &[QueryRecord]) -> String {
    if records.is_empty() {
        return "no questions yet".to_owned();
    }
    let mut out = String::new();
    for record in records {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        let when = record.timestamp.as_deref().map(date_part).unwrap_or_default();
        let _ = write!(out, "#{} {when}\nQ: {}\nA: {}", record.id, record.question, excerpt(&record.answer, 200));
    }
    out
}

/// Human-readable byte count, base 1024.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 { format!("{bytes} B") } else { format!("{size:.1} {}", UNITS[unit]) }
}

fn date_part(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}

/// First `max` characters of `text` on one line.
fn excerpt(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
