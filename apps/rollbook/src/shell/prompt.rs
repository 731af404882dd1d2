//! Line-oriented prompting over any `BufRead` / `Write` pair.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

/// Why a prompt could not produce an answer.
#[derive(Debug, Error)]
pub enum PromptError {
    /// Input reached end of file.
    #[error("Input closed")]
    Closed,

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One selectable line of a menu.
#[derive(Debug, Clone, Copy)]
pub struct MenuEntry<A> {
    pub label: &'static str,
    pub action: A,
}

/// Reads answers from `input` and writes prompts to `output`.
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print one line.
    pub fn say(&mut self, message: impl Display) -> Result<(), PromptError> {
        writeln!(self.output, "{message}")?;
        Ok(())
    }

    /// Ask once and return the trimmed answer, which may be empty.
    pub fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_string())
    }

    /// Ask until the answer is not blank.
    pub fn ask_nonempty(&mut self, prompt: &str) -> Result<String, PromptError> {
        loop {
            let answer = self.ask(prompt)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.say("A value is required.")?;
        }
    }

    /// Ask until the answer parses as `T`.
    pub fn ask_parsed<T: FromStr>(&mut self, prompt: &str) -> Result<T, PromptError> {
        loop {
            let answer = self.ask(prompt)?;
            match answer.parse() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(format!("'{answer}' is not a valid number."))?,
            }
        }
    }

    /// Yes/no question; only `y` or `yes` count as yes.
    pub fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        let answer = self.ask(prompt)?.to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Show a numbered menu and return the chosen entry's action.
    pub fn choose<A: Copy>(
        &mut self,
        title: &str,
        entries: &[MenuEntry<A>],
    ) -> Result<A, PromptError> {
        loop {
            self.say("")?;
            self.say(title)?;
            for (index, entry) in entries.iter().enumerate() {
                self.say(format_args!("{}. {}", index + 1, entry.label))?;
            }

            let answer = self.ask("Enter choice: ")?;
            let picked = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| entries.get(i));
            match picked {
                Some(entry) => return Ok(entry.action),
                None => self.say("Invalid choice.")?,
            }
        }
    }

    /// Hand back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

// =============================================================================
// TESTS
// =============================================================================
