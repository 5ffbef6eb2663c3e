use super::*;
use session::library::Source;
use session::{Role, Tier};

fn user(tier: Tier) -> UserProfile {
    UserProfile {
        id: 1,
        username: "anna".into(),
        email: "anna@example.nl".into(),
        role: Role::User,
        tier,
        is_active: true,
        is_trial_active: false,
        days_left_in_trial: 0,
        created_at: None,
    }
}

#[test]
fn session_without_user_reads_not_logged_in() {
    let session = Session { token: None, user: None, loading: false };
    assert_eq!(render_session(&session), "not logged in");
}

#[test]
fn session_shows_trial_tier_and_limits() {
    let mut profile = user(Tier::Free);
    profile.is_trial_active = true;
    profile.days_left_in_trial = 3;
    let session = Session { token: Some("t".into()), user: Some(profile), loading: false };

    let text = render_session(&session);
    assert!(text.contains("tier:      premium (trial)"));
    assert!(text.contains("trial:     ending, 3 days left"));
    assert!(text.contains("documents: unlimited"));
}

#[test]
fn basic_limits_render_as_numbers() {
    let session = Session { token: Some("t".into()), user: Some(user(Tier::Basic)), loading: false };
    let text = render_session(&session);
    assert!(text.contains("documents: 50"));
    assert!(text.contains("questions: 100 per day"));
}

#[test]
fn trial_text_per_status() {
    let mut profile = user(Tier::Basic);
    assert_eq!(trial_text(&profile), "none");
    profile.is_trial_active = true;
    profile.days_left_in_trial = 10;
    assert_eq!(trial_text(&profile), "10 days left");
    profile.days_left_in_trial = 0;
    assert_eq!(trial_text(&profile), "expired");
}

#[test]
fn users_table_marks_inactive() {
    let mut inactive = user(Tier::Basic);
    inactive.is_active = false;
    let table = render_users(&[user(Tier::Premium), inactive]);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("   ID"));
    assert!(lines[1].contains("premium"));
    assert!(lines[2].contains("anna (inactive)"));
    assert_eq!(render_users(&[]), "no users");
}

#[test]
fn sizes_are_human_readable() {
    assert_eq!(format_size(512), "512 B");
    assert_eq!(format_size(2048), "2.0 KB");
    assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
}

#[test]
fn answer_lists_sources_and_timing() {
    let answer = Answer {
        answer: "  Zie artikel 3.  ".into(),
        sources: vec![Source {
            id: 1,
            content: "Artikel 3\nDe gemeente...".into(),
            metadata: serde_json::Value::Null,
            relevance: 0.82,
        }],
        source_count: 1,
        document_filter: None,
        processing_time: Some(2.345),
        warning: None,
    };
    let text = render_answer(&answer);
    assert!(text.starts_with("Zie artikel 3."));
    assert!(text.contains("[1] 82%  Artikel 3 De gemeente..."));
    assert!(text.ends_with("(2.3s)"));
}

#[test]
fn long_excerpts_are_cut() {
    let text = "woord ".repeat(100);
    let cut = excerpt(&text, 20);
    assert!(cut.ends_with("..."));
    assert!(cut.chars().count() <= 23);
}

#[test]
fn empty_history_message() {
    assert_eq!(render_history(&[]), "no questions yet");
}
