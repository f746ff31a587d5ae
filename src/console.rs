// ⌨️ Console - line-based prompts for the text front-end
//
// Validates primitive input (words, numbers, dates, yes/no) and retries until
// the user types something valid or the cancel sentinel. Generic over the
// reader and writer so whole sessions can be scripted in tests.

use crate::entities::{ContractDate, DATE_FORMAT};
use crate::selection::{Choice, CANCEL_CHOICE};
use anyhow::{Context as AnyhowContext, Result};
use std::fmt;
use std::io::{BufRead, Write};

pub const SEPARATOR_LINE: &str =
    "===============================================================";

const INVALID_INPUT: &str = "Invalid input. Please try again.";

/// Raised when the input stream closes; the front-end ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndOfInput;

impl fmt::Display for EndOfInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "end of input")
    }
}

impl std::error::Error for EndOfInput {}

pub fn is_end_of_input(err: &anyhow::Error) -> bool {
    err.downcast_ref::<EndOfInput>().is_some()
}

/// Token count a word prompt accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordCount {
    Exactly(usize),
    Between(usize, usize),
    Any,
}

impl WordCount {
    fn accepts(&self, n: usize) -> bool {
        match *self {
            WordCount::Exactly(k) => n == k,
            WordCount::Between(lo, hi) => (lo..=hi).contains(&n),
            WordCount::Any => n >= 1,
        }
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
    cancel_token: String,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, cancel_token: &str) -> Self {
        Console {
            input,
            output,
            cancel_token: cancel_token.trim().to_lowercase(),
        }
    }

    pub fn cancel_token(&self) -> &str {
        &self.cancel_token
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, message: impl fmt::Display) -> Result<()> {
        writeln!(self.output, "{}", message).context("Failed to write to console")
    }

    /// Print the prompt and read one trimmed line
    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.say(prompt)?;
        self.output.flush().context("Failed to flush console")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read from console")?;
        if read == 0 {
            return Err(EndOfInput.into());
        }

        Ok(line.trim().to_string())
    }

    fn is_cancel(&self, line: &str) -> bool {
        line.to_lowercase() == self.cancel_token
    }

    /// Whitespace-separated words; `None` when the user cancels
    pub fn read_words(
        &mut self,
        prompt: &str,
        count: WordCount,
        alphabetical: bool,
    ) -> Result<Option<Vec<String>>> {
        loop {
            let line = self.read_line(prompt)?;
            if self.is_cancel(&line) {
                return Ok(None);
            }

            let words: Vec<String> = line.split_whitespace().map(str::to_string).collect();

            if !count.accepts(words.len()) {
                self.say(INVALID_INPUT)?;
                continue;
            }

            if alphabetical && !words.iter().all(|w| w.chars().all(char::is_alphabetic)) {
                self.say("You must enter strictly alphabetical strings. Try again.")?;
                continue;
            }

            return Ok(Some(words));
        }
    }

    /// Free text of one or more words, re-joined with single spaces
    pub fn read_text(&mut self, prompt: &str) -> Result<Option<String>> {
        Ok(self
            .read_words(prompt, WordCount::Any, false)?
            .map(|words| words.join(" ")))
    }

    /// Integer in 1..=max
    pub fn read_menu_choice(&mut self, prompt: &str, max: usize) -> Result<usize> {
        loop {
            let line = self.read_line(prompt)?;

            match line.parse::<usize>() {
                Ok(v) if (1..=max).contains(&v) => return Ok(v),
                _ => self.say(INVALID_INPUT)?,
            }
        }
    }

    /// Only "y" or "n" (any case) are accepted
    pub fn read_yes_no(&mut self, prompt: &str) -> Result<bool> {
        loop {
            let line = self.read_line(prompt)?.to_lowercase();
            match line.as_str() {
                "y" => return Ok(true),
                "n" => return Ok(false),
                _ => self.say("Invalid answer. Try again.")?,
            }
        }
    }

    pub fn read_date(&mut self, prompt: &str) -> Result<Option<ContractDate>> {
        loop {
            let line = self.read_line(prompt)?;
            if self.is_cancel(&line) {
                return Ok(None);
            }

            match ContractDate::parse(&line) {
                Ok(date) => return Ok(Some(date)),
                Err(_) => self.say(format!(
                    "Invalid date string. The date must be in the format {} Try again.",
                    DATE_FORMAT
                ))?,
            }
        }
    }

    /// Non-negative finite amount
    pub fn read_money(&mut self, prompt: &str) -> Result<Option<f64>> {
        loop {
            let line = self.read_line(prompt)?;
            if self.is_cancel(&line) {
                return Ok(None);
            }

            match line.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => return Ok(Some(v)),
                _ => self.say("You must insert a positive value")?,
            }
        }
    }

    /// Render a numbered candidate list and read the pick
    pub fn choose(&mut self, header: &str, labels: &[String]) -> Result<Choice> {
        self.say(header)?;
        for (i, label) in labels.iter().enumerate() {
            self.say(format!("{}) {}", i + 1, label))?;
        }

        let prompt = format!(
            "Type the number corresponding to your choice. Insert {} to cancel the operation.",
            CANCEL_CHOICE
        );
        loop {
            let line = self.read_line(&prompt)?;
            let choice = line.parse::<i64>().ok().map(Choice::from_menu_value);

            match choice {
                Some(Ok(Choice::Cancel)) => return Ok(Choice::Cancel),
                Some(Ok(Choice::Pick(position))) if position <= labels.len() => {
                    return Ok(Choice::Pick(position))
                }
                _ => self.say(INVALID_INPUT)?,
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
