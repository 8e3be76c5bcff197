//! The `gonepal` command line: a chat REPL and a trip planner.

#[macro_use]
extern crate tracing;

use std::io::{IsTerminal as _, Write as _};
use std::pin::pin;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use gonepal::Session;
use gonepal::core::planner::{
    Budget, Difficulty, Interest, Refinement, TripDuration,
};
use gonepal::core::{ChatWidget, PlanError, Planner, SubmitError};
use gonepal::render::Renderer;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::time::sleep;

const BAR_CHAR: &str = "▎";

/// Ask the GoNepal travel assistant from your terminal.
#[derive(Parser)]
#[command(name = "gonepal", version)]
struct Cli {
    /// Print replies without colors.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the assistant. This is the default.
    Chat,
    /// Plan a trip, then refine the plan.
    Plan(PlanArgs),
}

#[derive(Args)]
struct PlanArgs {
    /// Adventure, Culture, Nature, Spirituality or Family.
    #[arg(long)]
    interest: Interest,
    /// "3 days", "5 days", "7 days" or "10+ days".
    #[arg(long)]
    duration: TripDuration,
    /// Easy, Moderate or Challenging. Any if omitted.
    #[arg(long)]
    difficulty: Option<Difficulty>,
    /// Budget, Mid-range or Luxury. Any if omitted.
    #[arg(long)]
    budget: Option<Budget>,
}

enum ReplCommand<'a> {
    Quit,
    ShowSystem,
    SetSystem(&'a str),
    ClearSystem,
    Unknown(&'a str),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(use_colors(cli.plain, std::io::stderr().is_terminal()))
        .init();

    let renderer = if use_colors(cli.plain, std::io::stdout().is_terminal()) {
        Renderer::styled()
    } else {
        Renderer::plain()
    };
    let mut stdin = io::BufReader::new(io::stdin());

    let session = match Session::from_env() {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            eprintln!(
                "Set OPENROUTER_API_KEY in the environment or in a .env file."
            );
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(session.chat(), &mut stdin, renderer).await,
        Command::Plan(args) => {
            if !run_plan(session.planner(), args, &mut stdin, renderer).await {
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

async fn run_chat<R: AsyncBufRead + Unpin>(
    chat: &ChatWidget,
    input: &mut R,
    renderer: Renderer,
) {
    println!("Namaste! Ask me anything about traveling in Nepal.");
    println!("Commands: /system [text], /clear-system, /quit");

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(input).await else {
            break;
        };
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(command) = parse_command(line.trim()) {
            match command {
                ReplCommand::Quit => break,
                ReplCommand::ShowSystem => {
                    let prompt = chat.system_prompt();
                    if prompt.is_empty() {
                        println!("(no system prompt)");
                    } else {
                        println!("{prompt}");
                    }
                }
                ReplCommand::SetSystem(prompt) => {
                    chat.set_system_prompt(prompt);
                    println!("System prompt replaced.");
                }
                ReplCommand::ClearSystem => {
                    chat.set_system_prompt("");
                    println!("System prompt cleared.");
                }
                ReplCommand::Unknown(name) => {
                    eprintln!(
                        "unknown command /{name}, try /system, /clear-system \
                         or /quit"
                    );
                }
            }
            continue;
        }

        match with_spinner("🤔 Thinking...", chat.submit(line)).await {
            Ok(reply) => {
                print_reply(&renderer, &reply.message.content, reply.is_apology())
            }
            Err(SubmitError::Empty) => {}
            Err(err) => eprintln!("{err}"),
        }
    }
}

/// Returns `false` if no itinerary could be planned.
async fn run_plan<R: AsyncBufRead + Unpin>(
    planner: &Planner,
    args: PlanArgs,
    input: &mut R,
    renderer: Renderer,
) -> bool {
    planner.update_preferences(|prefs| {
        prefs.interest = Some(args.interest);
        prefs.duration = Some(args.duration);
        prefs.difficulty = args.difficulty;
        prefs.budget = args.budget;
    });

    let result = with_spinner("🗺️  Planning your trip...", planner.plan()).await;
    if !show_plan(&renderer, result) {
        return false;
    }

    loop {
        print!(
            "Refine? [c]heaper, [a]dventurous, [r]elaxed, or describe a change \
             ([q]uit): "
        );
        std::io::stdout().flush().ok();

        let Some(line) = read_line(input).await else {
            break;
        };
        let Some(refinement) = parse_refinement(line.trim()) else {
            break;
        };
        let result =
            with_spinner("🤔 Refining...", planner.refine(refinement)).await;
        show_plan(&renderer, result);
    }
    true
}

fn show_plan(renderer: &Renderer, result: Result<String, PlanError>) -> bool {
    match result {
        Ok(itinerary) => {
            print_reply(renderer, &itinerary, false);
            true
        }
        Err(err) => {
            eprintln!("Could not prepare the plan: {err}");
            false
        }
    }
}

fn print_reply(renderer: &Renderer, content: &str, is_apology: bool) {
    let bar = match (renderer.is_styled(), is_apology) {
        (false, _) => BAR_CHAR.to_owned(),
        (true, false) => BAR_CHAR.bright_cyan().to_string(),
        (true, true) => BAR_CHAR.bright_yellow().to_string(),
    };

    println!();
    let rendered = renderer.render(content);
    for (idx, line) in rendered.lines().enumerate() {
        let prefix = if idx == 0 { "🤖 " } else { "   " };
        println!("{bar}{prefix}{line}");
    }
    println!();
}

/// Drives `fut` to completion while a spinner shows `message`.
async fn with_spinner<F: Future>(message: &'static str, fut: F) -> F::Output {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(progress_style);
    progress_bar.set_message(message);

    let mut fut = pin!(fut);
    let output = loop {
        progress_bar.inc(1);
        select! {
            output = &mut fut => break output,
            _ = sleep(Duration::from_millis(100)) => {}
        }
    };

    // Finish the progress bar before printing anything else.
    progress_bar.finish_and_clear();
    output
}

fn parse_command(line: &str) -> Option<ReplCommand<'_>> {
    let rest = line.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    Some(match (name, arg) {
        ("quit" | "exit", _) => ReplCommand::Quit,
        ("system", "") => ReplCommand::ShowSystem,
        ("system", prompt) => ReplCommand::SetSystem(prompt),
        ("clear-system", _) => ReplCommand::ClearSystem,
        _ => ReplCommand::Unknown(name),
    })
}

fn parse_refinement(input: &str) -> Option<Refinement> {
    match input.to_ascii_lowercase().as_str() {
        "" | "q" | "quit" => None,
        "c" | "cheaper" => Some(Refinement::Cheaper),
        "a" | "adventurous" => Some(Refinement::MoreAdventurous),
        "r" | "relaxed" => Some(Refinement::MoreRelaxed),
        _ => Some(Refinement::Custom(input.to_owned())),
    }
}

/// Colors are only used on a terminal, and never with `--plain`.
#[inline]
fn use_colors(plain: bool, is_terminal: bool) -> bool {
    !plain && is_terminal
}

/// Reads one line from `input`, which must outlive the loop reading it so
/// that lines buffered past the current one are kept.
async fn read_line<R: AsyncBufRead + Unpin>(input: &mut R) -> Option<String> {
    let mut line = String::new();

    match input.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
