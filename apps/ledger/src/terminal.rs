//! Terminal renditions of the mount, prompt and modal seams.

use std::{
    io::{self, BufRead, Write},
    sync::{Arc, Mutex, PoisonError},
};

use client_core::{
    ui::{EventKind, Fragment, Mount, Prompt, Region},
    Modal,
};
use tracing::{debug, info, warn};

/// Prints every region change to stdout, prefixed by the unit it belongs to.
pub struct TerminalMount {
    label: &'static str,
}

impl TerminalMount {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

fn region_heading(region: Region) -> &'static str {
    match region {
        Region::Title => "title",
        Region::Content => "transactions",
        Region::AccountList => "accounts",
        Region::AccountSelect => "account choices",
        Region::UserName => "user",
    }
}

impl Mount for TerminalMount {
    fn bind(&self, events: &[EventKind]) {
        debug!(unit = self.label, ?events, "listeners bound");
    }

    fn replace(&self, region: Region, fragments: Vec<Fragment>) {
        // The form drop-down is only needed to resolve account ids.
        if region == Region::AccountSelect {
            debug!(unit = self.label, count = fragments.len(), "account choices refreshed");
            return;
        }
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "[{}] {}:", self.label, region_heading(region));
        if fragments.is_empty() {
            let _ = writeln!(out, "  (empty)");
        }
        for fragment in fragments {
            match fragment.id {
                Some(id) => {
                    let _ = writeln!(out, "  #{id} {}", fragment.text);
                }
                None => {
                    let _ = writeln!(out, "  {}", fragment.text);
                }
            }
        }
    }

    fn set_text(&self, region: Region, text: &str) {
        println!("[{}] {}: {text}", self.label, region_heading(region));
    }

    fn set_active(&self, region: Region, id: &str, active: bool) {
        if active {
            println!("[{}] {} #{id} selected", self.label, region_heading(region));
        } else {
            debug!(unit = self.label, id, "selection cleared");
        }
    }

    fn reset(&self) {
        debug!(unit = self.label, "form reset");
    }
}

/// The one reader of standard input. Repl commands and confirmation answers share it so a
/// buffered read never swallows lines meant for the other.
pub struct Console {
    input: Mutex<Box<dyn BufRead + Send>>,
}

impl Console {
    pub fn stdin() -> Self {
        Self::from_reader(io::BufReader::new(io::stdin()))
    }

    pub fn from_reader(reader: impl BufRead + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(reader)),
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    pub fn read_line(&self) -> io::Result<Option<String>> {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

pub struct TerminalPrompt {
    console: Arc<Console>,
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(console: Arc<Console>, assume_yes: bool) -> Self {
        Self {
            console,
            assume_yes,
        }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            info!(question, "confirmed by --yes");
            return true;
        }
        print!("{question} [y/N] ");
        let _ = io::stdout().flush();

        match self.console.read_line() {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(err) => {
                warn!(error = %err, "confirmation could not be read");
                false
            }
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "д" | "да"
    )
}

/// Forms are driven straight from the command line, so a modal is only a log line.
pub struct TerminalModal {
    name: &'static str,
}

impl TerminalModal {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Modal for TerminalModal {
    fn open(&self) {
        info!(modal = self.name, "modal opened");
    }

    fn close(&self) {
        debug!(modal = self.name, "modal closed");
    }
}
