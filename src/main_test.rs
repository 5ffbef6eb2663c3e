use super::*;
use std::sync::atomic::{AtomicBool, Ordering};

#[test]
fn registration_requires_matching_passwords() {
    assert!(matches!(validate_registration("secret1", "secret2"), Err(CliError::PasswordMismatch)));
}

#[test]
fn registration_requires_minimum_length() {
    assert!(matches!(validate_registration("abc", "abc"), Err(CliError::PasswordTooShort)));
    assert!(validate_registration("abcdef", "abcdef").is_ok());
}

#[test]
fn password_error_names_minimum() {
    assert_eq!(CliError::PasswordTooShort.to_string(), "password must be at least 6 characters");
}

#[test]
fn role_and_tier_parsers() {
    assert_eq!(parse_role("admin"), Ok(Role::Admin));
    assert!(parse_role("root").is_err());
    assert_eq!(parse_tier("white_label"), Ok(Tier::WhiteLabel));
    assert!(parse_tier("gold").is_err());
}

#[test]
fn cli_parses_user_update() {
    let cli = Cli::try_parse_from(["ragopmaat", "users", "update", "3", "--tier", "premium", "--active", "false"]).unwrap();
    let Command::Users(UsersCommand { command: UsersSubcommand::Update { id, tier, active, role, .. } }) = cli.command
    else {
        panic!("expected users update");
    };
    assert_eq!(id, 3);
    assert_eq!(tier, Some(Tier::Premium));
    assert_eq!(active, Some(false));
    assert_eq!(role, None);
}

#[test]
fn cli_trial_defaults_to_fourteen_days() {
    let cli = Cli::try_parse_from(["ragopmaat", "users", "trial", "5"]).unwrap();
    let Command::Users(UsersCommand { command: UsersSubcommand::Trial { id, days } }) = cli.command else {
        panic!("expected users trial");
    };
    assert_eq!((id, days), (5, 14));
}

#[test]
fn unsupported_file_lists_extensions() {
    let message = CliError::UnsupportedFile("photo.png".into()).to_string();
    assert!(message.contains("photo.png"));
    assert!(message.contains("pdf, docx, md, txt"));
}

#[tokio::test]
async fn slow_notice_fires_for_pending_work() {
    let fired = AtomicBool::new(false);
    let value = with_slow_notice(
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            42
        },
        Duration::from_millis(10),
        || fired.store(true, Ordering::SeqCst),
    )
    .await;
    assert_eq!(value, 42);
    assert!(fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn slow_notice_stays_quiet_for_fast_work() {
    let fired = AtomicBool::new(false);
    let value = with_slow_notice(async { "done" }, Duration::from_secs(5), || fired.store(true, Ordering::SeqCst)).await;
    assert_eq!(value, "done");
    assert!(!fired.load(Ordering::SeqCst));
}
