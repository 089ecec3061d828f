use chrono::NaiveDate;
use clap::{Arg, ArgAction, ArgMatches, Command};
use lume_swipe::config::{LoggingSettings, Settings};
use lume_swipe::core::GestureMapper;
use lume_swipe::models::{Credentials, Gender, RegistrationForm, SwipeAction, UploadFile};
use lume_swipe::services::{ApiClient, ApiError, AuthSession, FieldErrors, FileSessionStore, Swiper};
use lume_swipe::views::{
    form_error_message, render_match_dialog, render_swipe_screen, MatchesView, ProfileView,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type Auth = AuthSession<FileSessionStore>;

/// Failures of a CLI command
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Cannot read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let matches = build_cli().get_matches();

    let settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&settings.logging);
    info!("Starting Lume swipe client against {}", settings.api.base_url);

    let api = match ApiClient::from_settings(&settings.api) {
        Ok(api) => api,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let session_path = settings
        .storage
        .session_path
        .clone()
        .unwrap_or_else(FileSessionStore::default_path);
    let mut auth = AuthSession::new(api, FileSessionStore::new(session_path));
    auth.restore().await;

    let outcome = match matches.subcommand() {
        Some(("login", sub)) => login_command(&mut auth, sub).await,
        Some(("register", sub)) => register_command(&mut auth, sub).await,
        Some(("logout", _)) => {
            auth.logout();
            println!("Logged out");
            Ok(())
        }
        Some(("profile", _)) => profile_command(&mut auth).await,
        Some(("matches", _)) => matches_command(&mut auth).await,
        Some(("upload", sub)) => upload_command(&mut auth, sub).await,
        Some(("swipe", _)) => swipe_command(&mut auth, &settings).await,
        _ => {
            let _ = build_cli().print_help();
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            match &e {
                CliError::Api(api) if api.is_unauthorized() && !auth.is_logged_in() => {
                    eprintln!("Not logged in. Run `lume-swipe login` first.");
                }
                CliError::Api(api) => eprintln!("{}", form_error_message(api)),
                CliError::ReadFile { .. } => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging; LOG_LEVEL and LOG_FORMAT override the configuration
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn build_cli() -> Command {
    Command::new("lume-swipe")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Lume Team")
        .about("Swipe through the Lume discovery feed from the terminal")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .help("Configuration file (defaults to config/default.toml + environment)"),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("login")
                .about("Log in and persist the session")
                .arg(Arg::new("username").short('u').long("username").required(true))
                .arg(Arg::new("password").short('p').long("password").required(true)),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account with a full profile")
                .arg(Arg::new("username").long("username").required(true))
                .arg(Arg::new("email").long("email").required(true))
                .arg(Arg::new("password").long("password").required(true))
                .arg(Arg::new("first-name").long("first-name").default_value(""))
                .arg(Arg::new("last-name").long("last-name").default_value(""))
                .arg(Arg::new("bio").long("bio").required(true))
                .arg(
                    Arg::new("gender")
                        .long("gender")
                        .required(true)
                        .value_parser(["male", "female", "other"]),
                )
                .arg(
                    Arg::new("birth-date")
                        .long("birth-date")
                        .value_name("YYYY-MM-DD")
                        .required(true),
                )
                .arg(
                    Arg::new("like")
                        .long("like")
                        .action(ArgAction::Append)
                        .help("Interest tag, repeatable"),
                )
                .arg(
                    Arg::new("cover")
                        .long("cover")
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the persisted session"))
        .subcommand(Command::new("profile").about("Show your profile"))
        .subcommand(Command::new("matches").about("List your matches"))
        .subcommand(
            Command::new("upload")
                .about("Upload an image")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("cover")
                        .long("cover")
                        .action(ArgAction::SetTrue)
                        .help("Also use the upload as your cover image"),
                ),
        )
        .subcommand(Command::new("swipe").about("Swipe through the discovery feed"))
}

fn arg(sub: &ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name).cloned().unwrap_or_default()
}

async fn read_upload(path: &Path) -> Result<UploadFile, CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());
    Ok(UploadFile::new(name, bytes))
}

async fn login_command(auth: &mut Auth, sub: &ArgMatches) -> Result<(), CliError> {
    let credentials = Credentials {
        username: arg(sub, "username"),
        password: arg(sub, "password"),
    };
    let session = auth.login(&credentials).await?;
    println!("Welcome back, {}!", session.display_name());
    Ok(())
}

async fn register_command(auth: &mut Auth, sub: &ArgMatches) -> Result<(), CliError> {
    let birth_date = NaiveDate::parse_from_str(&arg(sub, "birth-date"), "%Y-%m-%d").map_err(|e| {
        let mut fields = FieldErrors::default();
        fields.insert("birth_date", e.to_string());
        CliError::Api(ApiError::ValidationFailed(fields))
    })?;
    let gender: Gender = arg(sub, "gender").parse().map_err(|e: String| {
        let mut fields = FieldErrors::default();
        fields.insert("gender", e);
        CliError::Api(ApiError::ValidationFailed(fields))
    })?;

    let mut form = RegistrationForm {
        username: arg(sub, "username"),
        email: arg(sub, "email"),
        password: arg(sub, "password"),
        first_name: arg(sub, "first-name"),
        last_name: arg(sub, "last-name"),
        bio: arg(sub, "bio"),
        gender,
        birth_date,
        likes: Vec::new(),
    };
    for like in sub.get_many::<String>("like").into_iter().flatten() {
        form.add_like(like);
    }

    let cover = match sub.get_one::<PathBuf>("cover") {
        Some(path) => Some(read_upload(path).await?),
        None => None,
    };

    let session = auth.register(&form, cover.as_ref()).await?;
    println!("Welcome to Lume, {}!", session.display_name());
    Ok(())
}

async fn profile_command(auth: &mut Auth) -> Result<(), CliError> {
    let api = auth.client()?;
    let result = api.get_profile().await;
    if auth.observe(&result) {
        return Err(ApiError::Unauthorized.into());
    }
    let view = ProfileView::from_result(result, auth.session());
    println!("{}", view.render());
    Ok(())
}

async fn matches_command(auth: &mut Auth) -> Result<(), CliError> {
    let api = auth.client()?;
    let own_id = auth.require_session()?.user_id();
    let result = api.get_matches().await;
    if auth.observe(&result) {
        return Err(ApiError::Unauthorized.into());
    }
    println!("{}", MatchesView::from_result(result, own_id).render());
    Ok(())
}

async fn upload_command(auth: &mut Auth, sub: &ArgMatches) -> Result<(), CliError> {
    let api = auth.client()?;
    let path = sub
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_default();
    let file = read_upload(&path).await?;
    let result = api.upload_file(&file, sub.get_flag("cover")).await;
    if auth.observe(&result) {
        return Err(ApiError::Unauthorized.into());
    }
    println!("Uploaded: {}", result?.url);
    Ok(())
}

/// Input accepted by the swipe prompt
#[derive(Debug, Clone, Copy, PartialEq)]
enum SwipeInput {
    Decide(SwipeAction),
    Drag(f64),
    Reload,
    Help,
    Quit,
    Unknown,
}

fn parse_swipe_input(line: &str) -> SwipeInput {
    let mut parts = line.split_whitespace();
    match parts.next().map(str::to_ascii_lowercase).as_deref() {
        Some("l") | Some("like") | Some("right") => SwipeInput::Decide(SwipeAction::Like),
        Some("p") | Some("pass") | Some("left") => SwipeInput::Decide(SwipeAction::Pass),
        Some("d") | Some("drag") => parts
            .next()
            .and_then(|dx| dx.parse::<f64>().ok())
            .map(SwipeInput::Drag)
            .unwrap_or(SwipeInput::Unknown),
        Some("r") | Some("reload") | Some("refresh") => SwipeInput::Reload,
        Some("?") | Some("h") | Some("help") => SwipeInput::Help,
        Some("q") | Some("quit") | Some("exit") => SwipeInput::Quit,
        _ => SwipeInput::Unknown,
    }
}

const SWIPE_HELP: &str = "Commands: [l]ike, [p]ass, drag <dx>, [r]eload, [q]uit";

async fn swipe_command(auth: &mut Auth, settings: &Settings) -> Result<(), CliError> {
    let api = auth.client()?;
    let mut swiper = Swiper::new(api, GestureMapper::new(settings.swipe.commit_threshold));

    println!("Finding amazing people for you...");
    let loaded = swiper.reload().await;
    if auth.observe(&loaded) {
        return Err(ApiError::Unauthorized.into());
    }
    println!("{}\n\n{}", render_swipe_screen(swiper.engine()), SWIPE_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_lost = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };

                match parse_swipe_input(&line) {
                    SwipeInput::Decide(action) => {
                        if swiper.commit_detached(action).is_none() {
                            println!("No more cards. Type `reload` to check again.");
                            continue;
                        }
                    }
                    SwipeInput::Drag(dx) => {
                        if swiper.release_drag_detached(dx).is_none() {
                            println!("(card returns to rest)");
                            continue;
                        }
                    }
                    SwipeInput::Reload => {
                        let loaded = swiper.reload().await;
                        if auth.observe(&loaded) {
                            session_lost = true;
                            break;
                        }
                    }
                    SwipeInput::Help | SwipeInput::Unknown => {
                        println!("{}", SWIPE_HELP);
                        continue;
                    }
                    SwipeInput::Quit => break,
                }
                println!("\n{}", render_swipe_screen(swiper.engine()));
            }
            Some(done) = swiper.next_completion(), if swiper.in_flight() > 0 => {
                if let Some(matched) = &done.matched {
                    println!("\n{}\n", render_match_dialog(matched));
                }
                if done.error.as_ref().is_some_and(|e| e.is_unauthorized()) {
                    auth.logout();
                    session_lost = true;
                    break;
                }
                if done.spliced && done.position + 1 == swiper.engine().cursor() {
                    println!("\n{}", render_swipe_screen(swiper.engine()));
                }
            }
        }
    }

    // Let outstanding submissions land before exiting
    while swiper.in_flight() > 0 && !session_lost {
        match swiper.next_completion().await {
            Some(done) => {
                if let Some(matched) = &done.matched {
                    println!("\n{}\n", render_match_dialog(matched));
                }
            }
            None => break,
        }
    }

    if session_lost {
        return Err(ApiError::Unauthorized.into());
    }
    Ok(())
}
