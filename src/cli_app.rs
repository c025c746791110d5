//! Top-level CLI definition and dispatch.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use colored::{Colorize, control};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use nightlight::api::errors::UserFacing;
use nightlight::api::models::{
    Message, NotificationKind, Person, ResetPasswordRequest, SignUpRequest, UserNotification,
};
use nightlight::app::model::empty_states;
use nightlight::app::validation::{self, required};
use nightlight::app::ClientContext;
use nightlight::core::config::Config;
use nightlight::logger::activity::ActivityEvent;
use nightlight::paging::{FetchOutcome, ListKey, PageSource, PaginatedViewModel};
use nightlight::store::preferences::Theme;

/// Nightlight command-line client.
#[derive(Debug, Parser)]
#[command(
    name = "nightlight",
    author,
    version,
    about = "Nightlight - kind messages, from the terminal",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login(LoginArgs),
    /// Create an account and sign in.
    Signup(SignupArgs),
    /// Forget the stored session.
    Logout,
    /// Choose a new password with an emailed reset token.
    ResetPassword(ResetPasswordArgs),
    /// Show the signed-in account.
    Whoami,
    /// Fetch your public profile from the server.
    Profile,
    /// List the message feed.
    Feed(FeedArgs),
    /// List the most helpful people.
    People(PagesArgs),
    /// List your notifications.
    Notifications(PagesArgs),
    /// Post a new message.
    Post(PostArgs),
    /// Show or change the color theme.
    Theme(ThemeArgs),
    /// View configuration state.
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
struct LoginArgs {
    username: String,
    /// Password; read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct SignupArgs {
    username: String,
    email: String,
    /// Password; read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct ResetPasswordArgs {
    /// Token from the reset email.
    token: String,
    /// New password; read from stdin when omitted.
    #[arg(long)]
    password: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct PagesArgs {
    /// Number of pages to load.
    #[arg(long, default_value_t = 1, value_name = "N")]
    pages: usize,
}

#[derive(Debug, Clone, Args)]
struct FeedArgs {
    /// Show saved messages instead of the feed.
    #[arg(long)]
    saved: bool,
    #[command(flatten)]
    pages: PagesArgs,
}

#[derive(Debug, Clone, Args)]
struct PostArgs {
    /// Message text.
    text: String,
}

#[derive(Debug, Clone, Args)]
struct ThemeArgs {
    /// New theme (system, light, dark). Prints the current one when omitted.
    value: Option<Theme>,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print the config file path.
    Path,
    /// Print the effective configuration.
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input, or a request the server rejected.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

impl From<nightlight::core::errors::NightlightError> for CliError {
    fn from(err: nightlight::core::errors::NightlightError) -> Self {
        Self::Runtime(format!("[{}] {err}", err.code()))
    }
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Login(args) => run_login(cli, args),
        Command::Signup(args) => run_signup(cli, args),
        Command::Logout => run_logout(cli),
        Command::ResetPassword(args) => run_reset_password(cli, args),
        Command::Whoami => run_whoami(cli),
        Command::Profile => run_profile(cli),
        Command::Feed(args) => {
            let ctx = open_context(cli)?;
            let (source, list) = if args.saved {
                (ctx.services.saved_source(), ListKey::Saved)
            } else {
                (ctx.services.feed_source(), ListKey::Feed)
            };
            run_list(cli, &ctx, &source, list, args.pages.pages, message_row)
        }
        Command::People(args) => {
            let ctx = open_context(cli)?;
            let source = ctx.services.helpful_source();
            run_list(cli, &ctx, &source, ListKey::HelpfulPeople, args.pages, person_row)
        }
        Command::Notifications(args) => {
            let ctx = open_context(cli)?;
            let source = ctx.services.notification_source();
            run_list(
                cli,
                &ctx,
                &source,
                ListKey::Notifications,
                args.pages,
                notification_row,
            )
        }
        Command::Post(args) => run_post(cli, args),
        Command::Theme(args) => run_theme(cli, args),
        Command::Config(args) => run_config(cli, args),
    }
}

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Ok(Config::load(cli.config.as_deref())?)
}

fn open_context(cli: &Cli) -> Result<ClientContext, CliError> {
    let config = load_config(cli)?;
    Ok(ClientContext::from_config(config)?)
}

fn user_error<E: UserFacing>(err: &E) -> CliError {
    let fields = err.field_errors();
    if fields.is_empty() {
        return CliError::User(err.user_message());
    }
    let lines: Vec<String> = fields
        .iter()
        .map(|reason| format!("{}: {}", reason.property, reason.message()))
        .collect();
    CliError::User(lines.join("\n"))
}

fn read_password(given: Option<&String>) -> Result<String, CliError> {
    if let Some(password) = given {
        return Ok(password.clone());
    }
    if io::stdin().is_terminal() {
        eprint!("password: ");
        io::stderr().flush()?;
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ──────────────────── session commands ────────────────────

fn run_login(cli: &Cli, args: &LoginArgs) -> Result<(), CliError> {
    let password = read_password(args.password.as_ref())?;
    if args.username.trim().is_empty() || password.is_empty() {
        return Err(CliError::User("username and password are required".into()));
    }
    let ctx = open_context(cli)?;
    let session = ctx
        .services
        .auth
        .sign_in(args.username.trim(), &password)
        .map_err(|err| user_error(&err))?;

    match output_mode(cli) {
        OutputMode::Human => println!(
            "Signed in as {} ({} tokens)",
            session.username.bold(),
            session.token_balance
        ),
        OutputMode::Json => write_json_line(&json!({
            "command": "login",
            "username": session.username,
            "token_balance": session.token_balance,
        }))?,
    }
    Ok(())
}

fn run_signup(cli: &Cli, args: &SignupArgs) -> Result<(), CliError> {
    let request = SignUpRequest {
        username: args.username.trim().to_string(),
        email: args.email.trim().to_string(),
        password: read_password(args.password.as_ref())?,
    };
    let local = validation::check_sign_up(&request);
    if !local.is_empty() {
        let lines: Vec<String> = local.iter().map(|r| r.message()).collect();
        return Err(CliError::User(lines.join("\n")));
    }

    let ctx = open_context(cli)?;
    let session = ctx
        .services
        .auth
        .sign_up(&request)
        .map_err(|err| user_error(&err))?;

    match output_mode(cli) {
        OutputMode::Human => println!("Welcome, {}!", session.username.bold()),
        OutputMode::Json => write_json_line(&json!({
            "command": "signup",
            "username": session.username,
        }))?,
    }
    Ok(())
}

fn run_logout(cli: &Cli) -> Result<(), CliError> {
    let ctx = open_context(cli)?;
    ctx.services
        .auth
        .sign_out()
        .map_err(|err| user_error(&err))?;
    match output_mode(cli) {
        OutputMode::Human => println!("Signed out."),
        OutputMode::Json => write_json_line(&json!({"command": "logout", "ok": true}))?,
    }
    Ok(())
}

fn run_reset_password(cli: &Cli, args: &ResetPasswordArgs) -> Result<(), CliError> {
    let token = args.token.trim();
    if token.is_empty() {
        return Err(CliError::User(required("token").message()));
    }
    let password = read_password(args.password.as_ref())?;
    if let Some(reason) = validation::check_password(&password) {
        return Err(CliError::User(reason.message()));
    }

    let ctx = open_context(cli)?;
    ctx.services
        .auth
        .reset_password(&ResetPasswordRequest {
            token: token.to_string(),
            password,
        })
        .map_err(|err| user_error(&err))?;

    match output_mode(cli) {
        OutputMode::Human => println!("Password changed. Sign in with the new one."),
        OutputMode::Json => write_json_line(&json!({"command": "reset-password", "ok": true}))?,
    }
    Ok(())
}

fn run_profile(cli: &Cli) -> Result<(), CliError> {
    let ctx = open_context(cli)?;
    if !ctx.credentials.is_signed_in()? {
        return Err(CliError::User(
            "not signed in; run `nightlight login` first".into(),
        ));
    }
    let person = ctx.services.people.me().map_err(|err| user_error(&err))?;

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", person_row(&person));
            println!("  Joined: {}", person.created_at.format("%Y-%m-%d"));
        }
        OutputMode::Json => write_json_line(&json!({
            "command": "profile",
            "profile": serde_json::to_value(&person)?,
        }))?,
    }
    Ok(())
}

fn run_whoami(cli: &Cli) -> Result<(), CliError> {
    let ctx = open_context(cli)?;
    let credentials = &ctx.credentials;
    let signed_in = credentials.is_signed_in()?;
    let username = credentials.username()?;
    let balance = credentials.token_balance()?;
    let since = credentials.account_created_at()?;

    match output_mode(cli) {
        OutputMode::Human => {
            if !signed_in {
                println!("Not signed in.");
                return Ok(());
            }
            println!("{}", username.unwrap_or_default().bold());
            println!("  Tokens: {balance}");
            if let Some(since) = since {
                println!("  Member since: {}", since.format("%Y-%m-%d"));
            }
        }
        OutputMode::Json => write_json_line(&json!({
            "command": "whoami",
            "signed_in": signed_in,
            "username": username,
            "token_balance": balance,
            "account_created_at": since.map(|at| at.to_rfc3339()),
        }))?,
    }
    Ok(())
}

// ──────────────────── lists ────────────────────

/// Fetch up to `pages` pages into a fresh view model. Returns the list and
/// the failure copy of the fetch that stopped it, if one did.
fn load_pages<S>(
    source: &S,
    list: ListKey,
    pages: usize,
    page_size: usize,
    mut log: impl FnMut(ActivityEvent),
) -> (PaginatedViewModel<S::Item>, Option<String>)
where
    S: PageSource,
    S::Error: UserFacing,
{
    let mut vm = PaginatedViewModel::new(page_size, empty_states(list));
    for page in 0..pages.max(1) {
        let from_start = page == 0;
        // Nothing else is in flight here, so the pager alone decides.
        if !from_start && !vm.pager().can_fetch_next_page() {
            break;
        }
        log(ActivityEvent::PageFetchStarted {
            list: list.label().to_string(),
            from_start,
        });
        let started = Instant::now();
        let Some(outcome) = vm.fetch_blocking(source, from_start) else {
            break;
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let items = match outcome {
            FetchOutcome::Replaced { count } => count,
            FetchOutcome::Appended(range) => range.len(),
            FetchOutcome::Discarded => continue,
            FetchOutcome::Failed(err) => {
                let message = err.user_message();
                log(ActivityEvent::PageFetchFailed {
                    list: list.label().to_string(),
                    message: message.clone(),
                });
                return (vm, Some(message));
            }
        };
        log(ActivityEvent::PageFetchCompleted {
            list: list.label().to_string(),
            items: items as u64,
            total: vm.data().total_count(),
            duration_ms,
        });
    }
    (vm, None)
}

/// Load up to `pages` pages through the view model and print them.
fn run_list<S>(
    cli: &Cli,
    ctx: &ClientContext,
    source: &S,
    list: ListKey,
    pages: usize,
    render: fn(&S::Item) -> String,
) -> Result<(), CliError>
where
    S: PageSource,
    S::Item: Serialize,
    S::Error: UserFacing,
{
    let (vm, failure) = load_pages(
        source,
        list,
        pages,
        ctx.config.paging.page_size,
        |event| ctx.logger.send(event),
    );

    let empty = vm.empty_state();
    match output_mode(cli) {
        OutputMode::Human => {
            for item in vm.items() {
                println!("{}", render(item));
            }
            if let Some(empty) = empty {
                println!("{}", empty.title.bold());
                println!("{}", empty.subtitle.dimmed());
            } else {
                println!(
                    "{}",
                    format!(
                        "showing {} of {}",
                        vm.data().item_count(),
                        vm.data().total_count()
                    )
                    .dimmed()
                );
            }
        }
        OutputMode::Json => write_json_line(&json!({
            "command": list.label(),
            "items": serde_json::to_value(vm.items())?,
            "total": vm.data().total_count(),
            "exhausted": vm.pager().is_exhausted(),
            "empty_state": empty,
        }))?,
    }

    match failure {
        Some(message) => Err(CliError::Runtime(message)),
        None => Ok(()),
    }
}

fn message_row(message: &Message) -> String {
    let heart = if message.is_loved {
        format!("♥{}", message.love_count).red().to_string()
    } else {
        format!("♡{}", message.love_count)
    };
    let saved = if message.is_saved { " [saved]" } else { "" };
    format!(
        "{}  {}  {}  {heart}{saved}",
        message.id.dimmed(),
        format!("@{}", message.author.username).bold(),
        message.body
    )
}

fn person_row(person: &Person) -> String {
    let bio = person.bio.as_deref().unwrap_or("");
    format!(
        "{}  helped {}  {}",
        format!("@{}", person.username).bold(),
        person.help_count,
        bio.dimmed()
    )
}

fn notification_row(notification: &UserNotification) -> String {
    let what = match notification.kind {
        NotificationKind::Love => "loved your message",
        NotificationKind::Appreciation => "appreciated your message",
        NotificationKind::Reply => "replied to you",
        NotificationKind::System => "system notice",
        NotificationKind::Unknown => "activity",
    };
    let actor = notification
        .actor
        .as_ref()
        .map(|actor| format!("@{} ", actor.username))
        .unwrap_or_default();
    let marker = if notification.seen { " " } else { "*" };
    format!(
        "{marker} {}  {actor}{what}",
        notification.created_at.format("%Y-%m-%d %H:%M")
    )
}

// ──────────────────── post ────────────────────

fn run_post(cli: &Cli, args: &PostArgs) -> Result<(), CliError> {
    let local = validation::check_post(&args.text);
    if let Some(reason) = local.first() {
        return Err(CliError::User(reason.message()));
    }
    let ctx = open_context(cli)?;
    let message = ctx
        .services
        .messages
        .post(args.text.trim())
        .map_err(|err| user_error(&err))?;

    match output_mode(cli) {
        OutputMode::Human => println!("Posted {}", message.id.bold()),
        OutputMode::Json => write_json_line(&json!({
            "command": "post",
            "message": serde_json::to_value(&message)?,
        }))?,
    }
    Ok(())
}

// ──────────────────── theme / config ────────────────────

fn run_theme(cli: &Cli, args: &ThemeArgs) -> Result<(), CliError> {
    let mut ctx = open_context(cli)?;
    if let Some(theme) = args.value {
        ctx.theme.set(theme);
        ctx.preferences.theme = theme;
        if !ctx.save_preferences() {
            return Err(CliError::Runtime(format!(
                "could not save {}",
                ctx.preferences_path.display()
            )));
        }
    }
    let current = ctx.theme.current();
    match output_mode(cli) {
        OutputMode::Human => println!("{current}"),
        OutputMode::Json => write_json_line(&json!({
            "command": "theme",
            "theme": current.to_string(),
        }))?,
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => write_json_line(&json!({
                    "command": "config path",
                    "path": path.to_string_lossy(),
                    "exists": exists,
                }))?,
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;
            match output_mode(cli) {
                OutputMode::Human => println!("{}", config.to_toml()?),
                OutputMode::Json => write_json_line(&json!({
                    "command": "config show",
                    "config": serde_json::to_value(&config)?,
                    "hash": config.stable_hash()?,
                }))?,
            }
            Ok(())
        }
    }
}

// ──────────────────── output ────────────────────

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("NIGHTLIGHT_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use nightlight::api::errors::MessageError;
    use nightlight::api::page::{Cursor, Page, PageMetadata, PageRequest};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feed_flags_parse() {
        let cli = Cli::try_parse_from(["nightlight", "feed", "--saved", "--pages", "3"]).unwrap();
        let Command::Feed(args) = cli.command else {
            panic!("expected feed");
        };
        assert!(args.saved);
        assert_eq!(args.pages.pages, 3);
    }

    #[test]
    fn theme_value_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["nightlight", "theme", "Dark"]).unwrap();
        let Command::Theme(args) = cli.command else {
            panic!("expected theme");
        };
        assert_eq!(args.value, Some(Theme::Dark));
    }

    #[test]
    fn output_mode_resolution() {
        assert_eq!(resolve_output_mode(true, None, true), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("human"), false), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, Some(" JSON "), true), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, None, true), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, Some("weird"), false), OutputMode::Json);
    }

    struct TwoPages;

    impl PageSource for TwoPages {
        type Item = u32;
        type Error = MessageError;

        fn fetch_page(&self, request: &PageRequest) -> Result<Page<u32>, MessageError> {
            let (start, end, data) = match request.cursor.as_ref().map(Cursor::as_str) {
                None => ("a", Some(Cursor::new("b")), vec![1, 2]),
                Some(_) => ("b", None, vec![3]),
            };
            Ok(Page {
                metadata: PageMetadata {
                    start: Cursor::new(start),
                    end,
                    total: 3,
                },
                data,
            })
        }
    }

    struct Down;

    impl PageSource for Down {
        type Item = u32;
        type Error = MessageError;

        fn fetch_page(&self, _request: &PageRequest) -> Result<Page<u32>, MessageError> {
            Err(MessageError::Unknown)
        }
    }

    #[test]
    fn load_pages_logs_only_fetches_that_ran() {
        let mut events = Vec::new();
        let (vm, failure) = load_pages(&TwoPages, ListKey::Feed, 5, 2, |e| events.push(e));
        assert_eq!(failure, None);
        assert_eq!(vm.items(), &[1, 2, 3]);

        let started = events
            .iter()
            .filter(|e| matches!(e, ActivityEvent::PageFetchStarted { .. }))
            .count();
        assert_eq!(started, 2, "exhausted list must not log a third fetch");
        let page_sizes: Vec<u64> = events
            .iter()
            .filter_map(|e| match e {
                ActivityEvent::PageFetchCompleted { items, total, .. } => {
                    assert_eq!(*total, 3);
                    Some(*items)
                }
                _ => None,
            })
            .collect();
        assert_eq!(page_sizes, vec![2, 1]);
    }

    #[test]
    fn load_pages_stops_at_the_first_failure() {
        let mut events = Vec::new();
        let (vm, failure) = load_pages(&Down, ListKey::HelpfulPeople, 3, 10, |e| events.push(e));
        assert!(failure.is_some());
        assert!(vm.empty_state().is_some());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], ActivityEvent::PageFetchFailed { .. }));
    }

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(CliError::User("x".into()).exit_code(), 1);
        assert_eq!(CliError::Runtime("x".into()).exit_code(), 2);
    }
}
