//! `ragopmaat`: command-line client for the RAG op Maat document assistant.
//!
//! Every command builds one `SessionStore`, restores the persisted session and
//! waits for it to resolve before deciding anything that depends on who is
//! logged in. Admin commands are sent as-is; the backend decides.

mod config;
mod output;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

use std::future::Future;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use session::library::{Answer, Question, SUPPORTED_EXTENSIONS, is_supported_file};
use session::types::{DEFAULT_TRIAL_DAYS, NewUser, Role, Tier, TrialGrant, UserUpdate};
use session::{ApiError, AuthError, HttpBackend, RegistrationError, SessionStore};
use tracing_subscriber::EnvFilter;

use crate::config::{CliContext, DEFAULT_SLOW_ANSWER_SECS};
use crate::output::print_json;

/// Shortest password the registration form accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not logged in; run `ragopmaat login` first")]
    NotLoggedIn,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least {min} characters", min = MIN_PASSWORD_LEN)]
    PasswordTooShort,
    #[error("unsupported file type `{0}`; expected one of: {exts}", exts = SUPPORTED_EXTENSIONS.join(", "))]
    UnsupportedFile(String),
    #[error("nothing to update; pass at least one field")]
    EmptyUpdate,
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Registration(#[from] RegistrationError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "ragopmaat", about = "RAG op Maat document assistant CLI")]
struct Cli {
    /// Backend base URL (overrides RAG_API_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Token file (overrides RAG_TOKEN_PATH).
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,

    /// Print raw JSON instead of formatted text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[arg(long, env = "RAG_SLOW_ANSWER_SECS", default_value_t = DEFAULT_SLOW_ANSWER_SECS)]
    slow_answer_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "RAG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Show the current user, tier and limits.
    Whoami,
    Users(UsersCommand),
    Docs(DocsCommand),
    Ask {
        question: String,
        /// Only search this document.
        #[arg(long)]
        document: Option<i64>,
    },
    History(HistoryCommand),
    /// List subscription plans.
    Plans,
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_parser = parse_role, default_value = "user")]
        role: Role,
        #[arg(long, value_parser = parse_tier, default_value = "basic")]
        tier: Tier,
        #[arg(long, default_value_t = false)]
        inactive: bool,
        /// Start a trial right away.
        #[arg(long, default_value_t = false)]
        trial: bool,
    },
    Update {
        id: i64,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
        #[arg(long, value_parser = parse_tier)]
        tier: Option<Tier>,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        trial: Option<bool>,
    },
    Delete {
        id: i64,
    },
    Trial {
        id: i64,
        #[arg(long, default_value_t = DEFAULT_TRIAL_DAYS)]
        days: u32,
    },
}

#[derive(Args, Debug)]
struct DocsCommand {
    #[command(subcommand)]
    command: DocsSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocsSubcommand {
    List,
    Upload { path: PathBuf },
    Delete { id: i64 },
}

#[derive(Args, Debug)]
struct HistoryCommand {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand, Debug)]
enum HistorySubcommand {
    List,
    Delete { id: i64 },
    Clear,
}

fn parse_role(raw: &str) -> Result<Role, String> {
    [Role::User, Role::Admin]
        .into_iter()
        .find(|role| role.as_str() == raw)
        .ok_or_else(|| format!("unknown role `{raw}`; expected user or admin"))
}

fn parse_tier(raw: &str) -> Result<Tier, String> {
    [Tier::Free, Tier::Basic, Tier::Premium, Tier::WhiteLabel]
        .into_iter()
        .find(|tier| tier.as_str() == raw)
        .ok_or_else(|| format!("unknown tier `{raw}`; expected free, basic, premium or white_label"))
}

// =============================================================================
// ENTRY
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CliContext::new(cli.base_url.as_deref(), cli.token_path, cli.slow_answer_secs, cli.json);

    match run(&ctx, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(ctx: &CliContext, command: Command) -> Result<(), CliError> {
    let (backend, store) = ctx.connect().await?;

    match command {
        Command::Login { email, password } => {
            let user = store.login(&email, &password).await?;
            if ctx.json {
                print_json(&user)?;
            } else {
                println!("logged in as {} ({})", user.username, store.effective_tier());
            }
            Ok(())
        }
        Command::Logout => {
            store.logout();
            println!("logged out");
            Ok(())
        }
        Command::Register { username, email, password, confirm } => {
            validate_registration(&password, &confirm)?;
            let registered = store.register(&username, &email, &password).await?;
            if ctx.json {
                print_json(&registered)?;
            } else {
                println!("account created for {}; log in with `ragopmaat login`", registered.username);
            }
            Ok(())
        }
        Command::Whoami => {
            require_session(&store)?;
            let session = store.session();
            if ctx.json {
                print_json(&serde_json::json!({
                    "user": session.user,
                    "is_admin": session.is_admin(),
                    "is_in_trial": session.is_in_trial(),
                    "effective_tier": session.effective_tier(),
                    "limits": session.tier_limits(),
                }))
            } else {
                println!("{}", output::render_session(&session));
                Ok(())
            }
        }
        Command::Users(users) => run_users(ctx, &store, users).await,
        Command::Docs(docs) => {
            require_session(&store)?;
            run_docs(ctx, &backend, docs).await
        }
        Command::Ask { question, document } => {
            require_session(&store)?;
            let question = Question { question: &question, document_id: document };
            let answer = ask_with_notice(&backend, &question, ctx.slow_answer_after).await?;
            if ctx.json { print_json(&answer) } else { print_text(&output::render_answer(&answer)) }
        }
        Command::History(history) => {
            require_session(&store)?;
            run_history(ctx, &backend, history).await
        }
        Command::Plans => print_json(&backend.subscriptions().await?),
    }
}

async fn run_users(ctx: &CliContext, store: &SessionStore, users: UsersCommand) -> Result<(), CliError> {
    require_session(store)?;
    match users.command {
        UsersSubcommand::List => {
            let users = store.list_users().await?;
            if ctx.json { print_json(&users) } else { print_text(&output::render_users(&users)) }
        }
        UsersSubcommand::Create { username, email, password, role, tier, inactive, trial } => {
            let new_user = NewUser { username, email, password, role, tier, is_active: !inactive, start_trial: trial };
            print_json(&store.create_user(&new_user).await?)
        }
        UsersSubcommand::Update { id, username, email, password, role, tier, active, trial } => {
            let update = UserUpdate { username, email, password, role, tier, is_active: active, start_trial: trial };
            if update.is_empty() {
                return Err(CliError::EmptyUpdate);
            }
            print_json(&store.update_user(id, &update).await?)
        }
        UsersSubcommand::Delete { id } => print_json(&store.delete_user(id).await?),
        UsersSubcommand::Trial { id, days } => print_json(&store.start_trial(id, TrialGrant { days }).await?),
    }
}

async fn run_docs(ctx: &CliContext, backend: &HttpBackend, docs: DocsCommand) -> Result<(), CliError> {
    match docs.command {
        DocsSubcommand::List => {
            let documents = backend.list_documents().await?;
            if ctx.json { print_json(&documents) } else { print_text(&output::render_documents(&documents)) }
        }
        DocsSubcommand::Upload { path } => {
            let name = path.display().to_string();
            if !is_supported_file(&name) {
                return Err(CliError::UnsupportedFile(name));
            }
            let document = backend.upload_path(&path).await?;
            if ctx.json {
                print_json(&document)
            } else {
                print_text(&format!("uploaded {} (id {})", document.original_filename, document.id))
            }
        }
        DocsSubcommand::Delete { id } => print_json(&backend.delete_document(id).await?),
    }
}

async fn run_history(ctx: &CliContext, backend: &HttpBackend, history: HistoryCommand) -> Result<(), CliError> {
    match history.command {
        HistorySubcommand::List => {
            let records = backend.list_queries().await?;
            if ctx.json { print_json(&records) } else { print_text(&output::render_history(&records)) }
        }
        HistorySubcommand::Delete { id } => print_json(&backend.delete_query(id).await?),
        HistorySubcommand::Clear => print_json(&backend.clear_queries().await?),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn require_session(store: &SessionStore) -> Result<(), CliError> {
    if store.is_authenticated() { Ok(()) } else { Err(CliError::NotLoggedIn) }
}

/// Checks the registration form applies before anything is sent.
pub fn validate_registration(password: &str, confirm: &str) -> Result<(), CliError> {
    if password != confirm {
        return Err(CliError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CliError::PasswordTooShort);
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
fn print_text(text: &str) -> Result<(), CliError> {
    println!("{text}");
    Ok(())
}

async fn ask_with_notice(backend: &HttpBackend, question: &Question<'_>, after: Duration) -> Result<Answer, ApiError> {
    with_slow_notice(backend.ask(question), after, || {
        eprintln!("This is taking longer than expected; still waiting for an answer...");
    })
    .await
}

/// Await `work`, calling `notice` once if it is still pending after `after`.
/// The countdown is local; it never cancels the request.
pub async fn with_slow_notice<F: Future>(work: F, after: Duration, notice: impl FnOnce()) -> F::Output {
    tokio::pin!(work);
    tokio::select! {
        output = &mut work => output,
        () = tokio::time::sleep(after) => {
            notice();
            work.await
        }
    }
}
