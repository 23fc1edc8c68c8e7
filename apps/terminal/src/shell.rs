//! # Shell
//!
//! Line-oriented front end over the command layer.
//!
//! Interactive mode uses a `rustyline` editor with command completion and a
//! history file. When `DUKA_SCRIPT` is set, commands are read from stdin
//! instead, one per line, and `#` starts a comment.
//!
//! Async commands run on a runtime owned by the shell via `block_on`; the
//! editor itself stays on the calling thread.

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use duka_core::SummaryPeriod;

use crate::commands::{assistant, draft, sale, summary};
use crate::error::{ApiError, ShellError};
use crate::output;
use crate::AppContext;

pub const SCRIPT_ENV: &str = "DUKA_SCRIPT";

const COMMANDS: &[&str] = &[
    "add", "set", "rm", "customer", "tender", "show", "record", "today", "summary", "ask", "clear",
    "help", "quit", "exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// Result of one input line: text to print and whether to keep going.
#[derive(Debug, Clone)]
pub struct ShellReply {
    pub control: LoopControl,
    pub output: String,
}

impl ShellReply {
    fn print(output: impl Into<String>) -> Self {
        ShellReply {
            control: LoopControl::Continue,
            output: output.into(),
        }
    }
}

pub struct Shell {
    app: AppContext,
    runtime: Runtime,
}

impl Shell {
    pub fn new(app: AppContext, runtime: Runtime) -> Self {
        Shell { app, runtime }
    }

    pub fn app(&self) -> &AppContext {
        &self.app
    }

    /// Runs interactively, or from stdin when [`SCRIPT_ENV`] is set.
    pub fn run(&self) -> Result<(), ShellError> {
        if std::env::var_os(SCRIPT_ENV).is_some() {
            self.run_script(io::stdin().lock())
        } else {
            self.run_interactive()
        }
    }

    fn run_interactive(&self) -> Result<(), ShellError> {
        let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
        editor.set_helper(Some(CommandHelper::new(COMMANDS)));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

        let history = history_path();
        if let Some(path) = &history {
            editor.load_history(path).ok();
        }

        println!(
            "Welcome to {}. Type 'help' for commands.",
            self.app.config.store_name
        );

        loop {
            match editor.readline("duka> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();

                    let reply = self.handle_line(trimmed);
                    if !reply.output.is_empty() {
                        println!("{}", reply.output);
                    }
                    if reply.control == LoopControl::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Type 'quit' to leave.");
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(path) = &history {
            save_history(&mut editor, path);
        }
        Ok(())
    }

    /// Executes each line of `input` in order.
    pub fn run_script<R: BufRead>(&self, input: R) -> Result<(), ShellError> {
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let reply = self.handle_line(trimmed);
            if !reply.output.is_empty() {
                println!("{}", reply.output);
            }
            if reply.control == LoopControl::Exit {
                break;
            }
        }
        Ok(())
    }

    /// Parses and executes one command line.
    pub fn handle_line(&self, line: &str) -> ShellReply {
        let tokens = match split(line) {
            Ok(tokens) => tokens,
            Err(err) => return ShellReply::print(format!("! {err}")),
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return ShellReply::print("");
        };

        let command = raw.to_lowercase();
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        debug!(%command, args = args.len(), "Dispatching shell command");

        match self.dispatch(&command, &args) {
            Ok(reply) => reply,
            Err(err) => ShellReply::print(format!("! {}", err.message)),
        }
    }

    fn dispatch(&self, command: &str, args: &[&str]) -> Result<ShellReply, ApiError> {
        let app = &self.app;
        let config = &app.config;

        let text = match command {
            "help" => output::help(),
            "quit" | "exit" => {
                return Ok(ShellReply {
                    control: LoopControl::Exit,
                    output: "Goodbye.".to_string(),
                })
            }
            "add" => {
                let view = draft::add_line(
                    &app.draft,
                    args.first().copied(),
                    args.get(1).copied(),
                    args.get(2).copied(),
                );
                output::draft(&view, config)
            }
            "set" => {
                let [position, field, value @ ..] = args else {
                    return Err(usage("set <line> <field> <value>"));
                };
                let view = draft::update_line(&app.draft, parse_position(position)?, field, &value.join(" "))?;
                output::draft(&view, config)
            }
            "rm" => {
                let [position] = args else {
                    return Err(usage("rm <line>"));
                };
                let view = draft::remove_line(&app.draft, parse_position(position)?)?;
                output::draft(&view, config)
            }
            "customer" => {
                let value = args.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
                let view = match args.first().map(|s| s.to_ascii_lowercase()).as_deref() {
                    Some("name") => draft::set_customer(&app.draft, Some(&value), None),
                    Some("email") => draft::set_customer(&app.draft, None, Some(&value)),
                    _ => return Err(usage("customer name|email <value>")),
                };
                output::draft(&view, config)
            }
            "tender" => {
                let [amount] = args else {
                    return Err(usage("tender <amount>"));
                };
                output::draft(&draft::set_tendered(&app.draft, amount), config)
            }
            "show" => {
                let view = draft::get_draft(&app.draft);
                let cards = summary::summary_cards(&app.ledger, config, app.clock.as_ref());
                format!("{}\n\n{}", output::draft(&view, config), output::cards(&cards))
            }
            "record" => {
                let receipt = self.runtime.block_on(sale::record_sale(
                    &app.draft,
                    &app.ledger,
                    config,
                    &app.remote,
                    app.clock.as_ref(),
                    &app.recording_busy,
                ))?;
                output::receipt(receipt.as_ref(), config)
            }
            "today" => output::sales_log(&sale::todays_sales(&app.ledger, app.clock.as_ref()), config),
            "summary" => {
                let period = match args.first() {
                    Some(raw) => raw.parse::<SummaryPeriod>()?,
                    None => SummaryPeriod::Daily,
                };
                summary::summary(&app.ledger, config, app.clock.as_ref(), period).message
            }
            "ask" => {
                let reply = self.runtime.block_on(assistant::submit_text(
                    &app.draft,
                    &app.ledger,
                    config,
                    &app.remote,
                    app.clock.as_ref(),
                    &app.assistant_busy,
                    &args.join(" "),
                ))?;
                output::assistant(&reply, config)
            }
            "clear" => output::draft(&draft::clear_draft(&app.draft), config),
            other => {
                return Err(ApiError::validation(format!(
                    "Unknown command '{other}'. Type 'help' for the list."
                )))
            }
        };

        Ok(ShellReply::print(text))
    }
}

fn usage(text: &str) -> ApiError {
    ApiError::validation(format!("Usage: {text}"))
}

fn parse_position(raw: &str) -> Result<usize, ApiError> {
    raw.parse::<usize>()
        .map_err(|_| ApiError::validation(format!("Line must be a number, got '{raw}'")))
}

fn history_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "duka", "pos").map(|dirs| dirs.data_dir().join("history.txt"))
}

fn save_history(editor: &mut Editor<CommandHelper, DefaultHistory>, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(error = %e, "Could not create history directory");
            return;
        }
    }
    if let Err(e) = editor.save_history(path) {
        warn!(error = %e, "Could not save shell history");
    }
}

// =============================================================================
// Completion
// =============================================================================

struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: &[&str]) -> Self {
        let mut commands: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        commands.sort();
        Self { commands }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        // only the first word is a command
        if prefix.trim_start().contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }

        let start = prefix.len() - prefix.trim_start().len();
        let needle = prefix[start..].to_ascii_lowercase();
        let candidates = self
            .commands
            .iter()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}
