//! NeuroShell - Entry Point
//!
//! Sets up logging and configuration, wires the local accessors into a
//! dispatcher, then either runs one command (`--command`) or starts the
//! interactive prompt.

use clap::Parser;
use neuro_shell::command::TaskDispatcher;
use neuro_shell::core::error::Result;
use neuro_shell::core::{config, set_config, ShellConfig};
use neuro_shell::intent::{CommandInterpreter, IntentLabel};
use neuro_shell::services::Services;
use neuro_shell::ui::builtins::{self, HELP_TEXT};
use neuro_shell::ui::render::{
    render_activity, render_envelope, render_history, render_interpretation, render_summary,
};
use neuro_shell::ui::{Builtin, LogCategory, ShellState};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Keyword-driven command shell
#[derive(Parser, Debug)]
#[command(name = "neuro-shell")]
#[command(about = "Run commands against the local system, files and network")]
struct Args {
    /// TOML file overriding the default configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single command and exit
    #[arg(long, short)]
    command: Option<String>,

    /// Print the one-shot result as JSON
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Records shown by the `history` built-in
    #[arg(long)]
    history_limit: Option<usize>,
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive session: interpreter, dispatcher and terminal state
struct Session {
    interpreter: CommandInterpreter,
    dispatcher: TaskDispatcher,
    state: ShellState,
    history_limit: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("neuro_shell=info")),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(path) = &args.config {
        let loaded = ShellConfig::load(path)?;
        if set_config(loaded).is_err() {
            tracing::warn!("config already initialized; ignoring {}", path.display());
        }
    }

    let dispatcher = TaskDispatcher::new(Services::local()?);
    register_category_modules(&dispatcher);

    let mut session = Session {
        interpreter: CommandInterpreter::new(),
        dispatcher,
        state: ShellState::new(),
        history_limit: args.history_limit.unwrap_or(config().history_limit),
    };

    let origin = match &args.config {
        Some(path) => format!("Configuration loaded from {}", path.display()),
        None => "Using default configuration".to_string(),
    };
    session.state.log(origin, LogCategory::System);

    if let Some(command) = args.command {
        return run_once(&mut session, &command, args.json);
    }

    tracing::info!("NeuroShell starting...");
    println!("\n=== NEUROSHELL ===");
    println!("Type 'help' for available commands\n");

    loop {
        print!("$ ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let line = if Builtin::parse(input) == Some(Builtin::Repeat) {
            match session.state.previous_input() {
                Some(previous) => previous.to_string(),
                None => {
                    println!("No previous command");
                    continue;
                }
            }
        } else {
            input.to_string()
        };
        session.state.record_input(&line);

        match session.execute_line(&line)? {
            Flow::Continue => {}
            Flow::Quit => break,
        }
    }

    let summary = session.dispatcher.status_summary();
    tracing::info!(
        total = summary.total_tasks,
        failed = summary.failed_tasks,
        "NeuroShell exiting"
    );
    Ok(())
}

fn register_category_modules(dispatcher: &TaskDispatcher) {
    for label in IntentLabel::ALL {
        let description = match label {
            IntentLabel::FileOperation => "Directory listing and file operations",
            IntentLabel::NetworkOperation => "Web search, weather and connectivity",
            IntentLabel::SystemOperation => "System status, processes and health",
            IntentLabel::General => "Echo of unrecognized commands",
        };
        dispatcher.register_module(label.as_str(), description);
    }
}

fn run_once(session: &mut Session, command: &str, json: bool) -> Result<()> {
    let interpreted = session.interpreter.interpret(command);
    let envelope = session
        .dispatcher
        .submit_with_intent(command, Some(interpreted.detected_intent));

    if json {
        let output = serde_json::json!({
            "interpretation": interpreted,
            "result": envelope,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_interpretation(&interpreted));
        print!("{}", render_envelope(&envelope));
    }
    Ok(())
}

impl Session {
    fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let Some(builtin) = Builtin::parse(line) else {
            self.execute_command(line);
            return Ok(Flow::Continue);
        };

        match builtin {
            Builtin::Help => println!("{}", HELP_TEXT),
            Builtin::Clear => builtins::clear_screen(&mut io::stdout())?,
            Builtin::Pwd => println!("{}", builtins::current_directory()?),
            Builtin::List => match builtins::list_current_directory() {
                Ok(listing) => print!("{}", listing),
                Err(e) => println!("Error: {}", e),
            },
            Builtin::History => {
                print!("{}", render_history(&self.dispatcher.history(self.history_limit)))
            }
            Builtin::Log => print!("{}", render_activity(&self.state.activity_log)),
            Builtin::Status => print!("{}", render_summary(&self.dispatcher.status_summary())),
            // Resolved by the prompt loop before dispatch
            Builtin::Repeat => {}
            Builtin::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn execute_command(&mut self, line: &str) {
        self.state
            .log(format!("Command: {}", line), LogCategory::Command);

        let interpreted = self.interpreter.interpret(line);
        print!("{}", render_interpretation(&interpreted));

        let envelope = self
            .dispatcher
            .submit_with_intent(line, Some(interpreted.detected_intent));
        print!("{}", render_envelope(&envelope));

        let (message, category) = if envelope.is_success() {
            ("Command executed successfully".to_string(), LogCategory::Success)
        } else {
            ("Command failed".to_string(), LogCategory::Failure)
        };
        self.state.log(message, category);
    }
}
