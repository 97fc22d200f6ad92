//! Question/answer I/O for the wizards.
//!
//! The wizards only talk to a [`Prompter`]; the terminal implementation uses
//! inquire, and a scripted one replays canned answers.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

use anyhow::{Result, anyhow, bail};

/// Typed on a text prompt to go back one step.
pub const BACK: &str = "<";

pub trait Prompter {
    /// Free text. An empty answer returns `default` when one is given.
    fn text(&mut self, label: &str, help: Option<&str>, default: Option<&str>) -> Result<String>;

    /// One of `options`; returns its index.
    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize>;

    /// Informational line, no answer expected.
    fn message(&mut self, text: &str) -> Result<()>;
}

// ──────────────────────────────────────────────────────────────
//  Terminal (inquire)
// ──────────────────────────────────────────────────────────────

#[cfg(feature = "interactive")]
#[derive(Debug, Default)]
pub struct InquirePrompter;

#[cfg(feature = "interactive")]
impl Prompter for InquirePrompter {
    fn text(&mut self, label: &str, help: Option<&str>, default: Option<&str>) -> Result<String> {
        let mut prompt = inquire::Text::new(label);
        if let Some(h) = help {
            prompt = prompt.with_help_message(h);
        }
        if let Some(d) = default {
            prompt = prompt.with_default(d);
        }
        prompt.prompt().map_err(|e| anyhow!("Input cancelled: {e}"))
    }

    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize> {
        inquire::Select::new(label, options.to_vec())
            .with_starting_cursor(default.min(options.len().saturating_sub(1)))
            .raw_prompt()
            .map(|choice| choice.index)
            .map_err(|e| anyhow!("Input cancelled: {e}"))
    }

    fn message(&mut self, text: &str) -> Result<()> {
        println!("{text}");
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────────
//  Plain line reader
// ──────────────────────────────────────────────────────────────

/// Reads one answer per line. Used when stdin is not a terminal or the
/// `interactive` feature is off.
pub struct LinePrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Unexpected end of input");
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn text(&mut self, label: &str, help: Option<&str>, default: Option<&str>) -> Result<String> {
        match (help, default) {
            (Some(h), Some(d)) => write!(self.output, "{label} ({h}) [{d}]: ")?,
            (Some(h), None) => write!(self.output, "{label} ({h}): ")?,
            (None, Some(d)) => write!(self.output, "{label} [{d}]: ")?,
            (None, None) => write!(self.output, "{label}: ")?,
        }
        self.output.flush()?;
        let answer = self.read_line()?;
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer,
        })
    }

    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize> {
        writeln!(self.output, "{label}")?;
        for (i, opt) in options.iter().enumerate() {
            writeln!(self.output, "  {}. {opt}", i + 1)?;
        }
        write!(self.output, "[{}]: ", default + 1)?;
        self.output.flush()?;
        let answer = self.read_line()?;
        Ok(pick_option(&answer, options).unwrap_or(default))
    }

    fn message(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }
}

// ──────────────────────────────────────────────────────────────
//  Scripted
// ──────────────────────────────────────────────────────────────

/// Replays a fixed list of answers, in order. Select answers may be the option
/// text or its 1-based number; an empty answer takes the default.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    /// Every label asked, in order.
    pub asked: Vec<String>,
    pub messages: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, label: &str) -> Result<String> {
        self.asked.push(label.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("No scripted answer left for '{label}'"))
    }
}

impl Prompter for ScriptedPrompter {
    fn text(&mut self, label: &str, _help: Option<&str>, default: Option<&str>) -> Result<String> {
        let answer = self.next(label)?;
        Ok(match default {
            Some(d) if answer.is_empty() => d.to_string(),
            _ => answer,
        })
    }

    fn select(&mut self, label: &str, options: &[String], default: usize) -> Result<usize> {
        let answer = self.next(label)?;
        if answer.is_empty() {
            return Ok(default);
        }
        pick_option(&answer, options)
            .ok_or_else(|| anyhow!("'{answer}' is not an option for '{label}'"))
    }

    fn message(&mut self, text: &str) -> Result<()> {
        self.messages.push(text.to_string());
        Ok(())
    }
}

fn pick_option(answer: &str, options: &[String]) -> Option<usize> {
    if let Some(i) = options.iter().position(|o| o.eq_ignore_ascii_case(answer)) {
        return Some(i);
    }
    answer
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=options.len()).contains(n))
        .map(|n| n - 1)
}
