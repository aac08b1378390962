use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use reflectiv_core::{
    ChatSession, Config, Message, ReflectivClient, RoleplayAction, RoleplayRequest,
    RoleplaySession, WORKER_URL_ENV,
};

mod ui;

#[derive(Parser)]
#[command(name = "reflectiv")]
#[command(about = "ReflectivAI sales coaching assistant: coach chat, roleplay, and worker status")]
struct Cli {
    /// Chat worker base URL (overrides config file and REFLECTIV_WORKER_URL)
    #[arg(long, global = true)]
    worker_url: Option<String>,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive coach chat
    Chat,
    /// Ask the coach a single question
    Ask {
        /// Your question
        question: String,
    },
    /// Run a roleplay scenario interactively
    Roleplay {
        /// Scenario identifier
        scenario: String,
    },
    /// Send a single roleplay turn
    Turn {
        #[arg(value_enum)]
        action: ActionArg,
        /// Scenario identifier
        scenario: String,
        /// What you say in this turn
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Check whether the chat worker is reachable
    Status {
        /// Keep polling until interrupted
        #[arg(short, long)]
        watch: bool,
    },
    /// Save the worker URL to the config file
    SetWorker {
        url: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionArg {
    Start,
    Respond,
    Analyze,
}

impl From<ActionArg> for RoleplayAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Start => RoleplayAction::Start,
            ActionArg::Respond => RoleplayAction::Respond,
            ActionArg::Analyze => RoleplayAction::Analyze,
        }
    }
}

/// Hands out a fresh cancellation token per request; Ctrl-C cancels whichever is current
#[derive(Clone)]
struct Interrupts {
    current: Arc<watch::Sender<CancellationToken>>,
}

impl Interrupts {
    fn new() -> Self {
        let (current, _) = watch::channel(CancellationToken::new());
        Self {
            current: Arc::new(current),
        }
    }

    fn listen() -> Self {
        let interrupts = Self::new();
        let handle = interrupts.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling in-flight request");
                handle.interrupt();
            }
        });
        interrupts
    }

    fn interrupt(&self) {
        self.current.borrow().cancel();
    }

    fn next_request(&self) -> CancellationToken {
        let token = CancellationToken::new();
        self.current.send_replace(token.clone());
        token
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let interrupts = Interrupts::listen();

    match cli.command {
        Commands::Chat => run_chat(build_client(cli.worker_url.as_deref())?, &interrupts).await?,
        Commands::Ask { question } => {
            let client = build_client(cli.worker_url.as_deref())?;
            ask(&client, &question, cli.json, &interrupts.next_request()).await?
        }
        Commands::Roleplay { scenario } => {
            let client = build_client(cli.worker_url.as_deref())?;
            run_roleplay(client, &scenario, &interrupts).await?
        }
        Commands::Turn {
            action,
            scenario,
            input,
        } => {
            let client = build_client(cli.worker_url.as_deref())?;
            let request = RoleplayRequest::new(action.into(), scenario)
                .with_user_input(input.unwrap_or_default());
            let reply = client
                .send_roleplay(&request, &interrupts.next_request())
                .await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                ui::print_roleplay_reply(&reply);
            }
        }
        Commands::Status { watch } => {
            let client = build_client(cli.worker_url.as_deref())?;
            show_status(&client, watch, cli.json, &interrupts.next_request()).await?
        }
        Commands::SetWorker { url } => {
            Config::save_worker_url(&url)?;
            println!("{} {}", "✓ Worker URL saved:".green(), url.bold());
        }
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = std::env::var("REFLECTIV_LOG").unwrap_or_else(|_| "warn".to_string());
        match level.parse::<tracing_subscriber::EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: REFLECTIV_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'warn'",
                    level, e
                );
                tracing_subscriber::EnvFilter::new("warn")
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_client(cli_override: Option<&str>) -> Result<ReflectivClient> {
    let config = Config::load()?;
    let env_override = std::env::var(WORKER_URL_ENV).ok();
    let worker_url = cli_override.or(env_override.as_deref());

    let client_config = config.client_config(worker_url);
    info!(worker = %client_config.base_url, "using chat worker");
    Ok(ReflectivClient::new(client_config)?)
}

async fn ask(
    client: &ReflectivClient,
    question: &str,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let reply = client.send_coach(&[Message::user(question)], cancel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        ui::print_message(&reply);
    }
    Ok(())
}

async fn run_chat(client: ReflectivClient, interrupts: &Interrupts) -> Result<()> {
    let mut session = ChatSession::new(client);

    println!("\n{}", "💬 ReflectivAI Coach".bold().blue());
    println!("{}", "Type /clear to start over, /quit to exit.".dimmed());

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        match input.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                println!("{}", "Conversation cleared".dimmed());
                continue;
            }
            _ => {}
        }

        let cancel = interrupts.next_request();
        match session.send_message(&input, &cancel).await {
            Ok(Some(reply)) => ui::print_message(reply),
            Ok(None) => {}
            Err(e) => ui::print_error(&e),
        }
    }

    Ok(())
}

async fn run_roleplay(
    client: ReflectivClient,
    scenario: &str,
    interrupts: &Interrupts,
) -> Result<()> {
    let mut session = RoleplaySession::new(client, scenario);

    println!("\n{}", format!("🎭 Roleplay: {}", session.scenario_id()).bold().blue());
    println!("{}", "Type /analyze for a scored debrief, /quit to exit.".dimmed());

    match session.start(&interrupts.next_request()).await {
        Ok(reply) => ui::print_roleplay_reply(&reply),
        Err(e) => {
            ui::print_error(&e);
            return Ok(());
        }
    }

    loop {
        let input: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("You")
            .interact_text()?;

        let cancel = interrupts.next_request();
        let result = match input.trim() {
            "/quit" | "/exit" => break,
            "/analyze" => session.analyze(&cancel).await,
            _ => session.respond(&input, &cancel).await,
        };

        match result {
            Ok(reply) => ui::print_roleplay_reply(&reply),
            Err(e) => ui::print_error(&e),
        }
    }

    Ok(())
}

async fn show_status(
    client: &ReflectivClient,
    watch: bool,
    json: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    if !watch {
        let report = client.check_status().await;
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            ui::print_status(client.status_url(), &report);
        }
        return Ok(());
    }

    let reports = client.watch_status(client.config().status_interval);
    tokio::pin!(reports);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            next = reports.next() => match next {
                Some(report) if json => println!("{}", serde_json::to_string(&report)?),
                Some(report) => ui::print_status(client.status_url(), &report),
                None => break,
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_cancels_only_the_current_request() {
        let interrupts = Interrupts::new();

        let first = interrupts.next_request();
        interrupts.interrupt();
        assert!(first.is_cancelled());

        let second = interrupts.next_request();
        assert!(!second.is_cancelled());
        interrupts.interrupt();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_turn_action_parses_from_action_names() {
        let cli = Cli::try_parse_from(["reflectiv", "turn", "respond", "payer-1", "-i", "hi"])
            .unwrap();
        match cli.command {
            Commands::Turn { action, input, .. } => {
                assert_eq!(RoleplayAction::from(action), RoleplayAction::Respond);
                assert_eq!(input.as_deref(), Some("hi"));
            }
            _ => panic!("expected turn command"),
        }

        assert!(Cli::try_parse_from(["reflectiv", "turn", "debrief", "payer-1"]).is_err());
    }
}
