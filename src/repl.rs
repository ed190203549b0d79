//! Interactive terminal surface.
//!
//! One line per turn, exit on `quit`/`exit`/`q` or Ctrl-C. The active
//! document's name is printed each turn while a session is open. All
//! workflow prompts go through [`TerminalPrompter`] so the dialog logic
//! stays testable.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::agent::{AgentError, Prompter, RouterAgent};

/// Tokens that end the session.
const EXIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

pub(crate) fn is_exit_command(input: &str) -> bool {
    EXIT_COMMANDS.contains(&input.trim().to_lowercase().as_str())
}

// ─── TerminalPrompter ────────────────────────────────────────────────────────

/// Real-terminal implementation of the workflow [`Prompter`].
pub struct TerminalPrompter {
    editor: DefaultEditor,
}

impl TerminalPrompter {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }

    fn readline(&mut self, prompt: &str) -> Result<String, AgentError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(&line);
                Ok(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                Err(AgentError::InputClosed)
            }
            Err(e) => {
                tracing::warn!(error = %e, "readline failed");
                Err(AgentError::InputClosed)
            }
        }
    }
}

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> Result<String, AgentError> {
        self.readline(&prompt.blue().to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message.cyan());
    }
}

// ─── REPL ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!("{}", "deskmate — terminal AI assistant".green().bold());
    println!("{}", "Available commands:".blue());
    println!("  • Weather queries (e.g., 'weather in New York')");
    println!("  • File/folder search (e.g., 'find file example.txt')");
    println!("  • Email generation (e.g., 'write email about project update')");
    println!("  • Document analysis (e.g., 'summarize the document')");
    println!("  • General questions");
    println!();
}

/// Run the read-eval-print loop until the user quits or interrupts.
pub async fn run(agent: &mut RouterAgent) -> anyhow::Result<()> {
    print_banner();

    let mut prompter = TerminalPrompter::new()?;

    loop {
        if let Some(name) = agent.document_name() {
            println!("{}", format!("Current document: {name}").magenta());
        }

        let line = match prompter.readline(&"Enter your question (or 'quit' to exit): ".bold().to_string()) {
            Ok(line) => line,
            // Ctrl-C / Ctrl-D at the top level is a normal way out
            Err(AgentError::InputClosed) => {
                println!("\nGoodbye!");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            println!("Goodbye!");
            return Ok(());
        }

        let reply = agent.respond(query, &mut prompter).await;
        println!("\n{} {}\n", "Assistant:".green().bold(), reply);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
