// UI layer: a numbered text menu driven over a `Prompt`.
// The terminal implementation uses `dialoguer` for input and `crossterm`
// colours for output; tests drive the same loop with scripted input.

use crate::api::{ApiClient, Session};
use crate::config::ApiSettings;
use crate::error::{AuthError, ClientError, ClientResult};
use crossterm::style::Stylize;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Duration;

const MENU: &str = "\n=== RLE Encoding Client ===\n1. Encode text\n2. Exit";

/// Console seam for the interactive loop.
pub trait Prompt {
    /// Show `prompt` and read one line of input, without the line ending.
    /// End of input is reported as `io::ErrorKind::UnexpectedEof`.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    fn say(&mut self, line: &str);

    fn alert(&mut self, line: &str);

    fn success(&mut self, line: &str) {
        self.say(line);
    }
}

/// Prompt backed by the real terminal. Falls back to plain stdin reads
/// when input is piped, since `dialoguer` needs a TTY.
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        TerminalPrompt {
            interactive: io::stdin().is_terminal(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        if self.interactive {
            // `allow_empty` so blank text reaches validation instead of
            // silently re-prompting.
            return Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text();
        }

        print!("{prompt}: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn alert(&mut self, line: &str) {
        println!("{}", line.red());
    }

    fn success(&mut self, line: &str) {
        println!("{}", line.green());
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MenuChoice {
    Encode,
    Exit,
    Invalid(String),
}

impl MenuChoice {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "1" => MenuChoice::Encode,
            "2" => MenuChoice::Exit,
            other => MenuChoice::Invalid(other.to_string()),
        }
    }
}

/// Authenticate with the configured credentials, then run the menu.
///
/// A rejected login or an unusable token response is reported and ends
/// the run normally, before any text is requested. Transport failures are
/// returned to the caller.
pub fn run<P: Prompt>(settings: &ApiSettings, prompt: &mut P) -> ClientResult<()> {
    let api = ApiClient::new(settings)?;

    let session = match with_spinner("Logging in...", || api.login(&settings.credentials)) {
        Ok(session) => session,
        Err(AuthError::Transport(e)) => return Err(ClientError::Transport(e)),
        Err(e) => {
            tracing::warn!(error = %e, "authentication failed");
            prompt.alert(&format!("Auth failed: {e}"));
            prompt.alert("Failed to get token");
            return Ok(());
        }
    };

    main_menu(&session, prompt)
}

/// Main interactive menu. Loops until the user picks "2" or input ends.
pub fn main_menu<P: Prompt>(session: &Session, prompt: &mut P) -> ClientResult<()> {
    loop {
        prompt.say(MENU);
        let line = match prompt.read_line("Select an option") {
            Ok(line) => line,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("input closed at menu, exiting");
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match MenuChoice::parse(&line) {
            MenuChoice::Encode => handle_encode(session, prompt)?,
            MenuChoice::Exit => break,
            MenuChoice::Invalid(other) => {
                prompt.alert(&format!("Invalid option '{other}'. Please choose 1 or 2."));
            }
        }
    }
    prompt.say("Goodbye!");
    Ok(())
}

/// Ask for text and encode it. Only transport failures escape.
fn handle_encode<P: Prompt>(session: &Session, prompt: &mut P) -> ClientResult<()> {
    let text = prompt.read_line("Enter text to encode")?;

    match with_spinner("Encoding...", || session.encode(&text)) {
        Ok(encoded) => prompt.success(&format!("Encoded result: {encoded}")),
        Err(e) if e.is_recoverable() => prompt.alert(&e.to_string()),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Run `work` behind a spinner on stderr. indicatif hides it when stderr
/// is not a terminal.
fn with_spinner<T>(message: &'static str, work: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let out = work();
    spinner.finish_and_clear();
    out
}
