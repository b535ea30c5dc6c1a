//! Asker abstraction: obtaining raw text for a field.
//!
//! Sessions call an [`Asker`] when a field has no value yet. The CLI reads
//! answers line by line from stdin and prompts on stderr; tests use scripted
//! askers.

use std::cell::RefCell;
use std::io::{self, BufRead, Stderr, StdinLock, Write};

use anyhow::{Context, Result, bail};

/// Source of raw answers.
pub trait Asker {
    /// Show `prompt` for `field` and return the raw answer.
    fn ask(&self, field: &str, prompt: &str) -> Result<String>;
}

/// Asker over a line-oriented reader/writer pair. Blank answers are asked
/// again.
pub struct LineAsker<R, W> {
    io: RefCell<(R, W)>,
}

impl<R: BufRead, W: Write> LineAsker<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: RefCell::new((reader, writer)),
        }
    }
}

impl LineAsker<StdinLock<'static>, Stderr> {
    /// Read answers from stdin and show prompts on stderr, leaving stdout
    /// for command output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Asker for LineAsker<R, W> {
    fn ask(&self, field: &str, prompt: &str) -> Result<String> {
        let mut io = self.io.borrow_mut();
        let (reader, writer) = &mut *io;
        writeln!(writer, "{}", prompt.trim_end()).context("write prompt")?;
        loop {
            write!(writer, "{field}> ").context("write prompt marker")?;
            writer.flush().context("flush prompt")?;

            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .with_context(|| format!("read answer for '{field}'"))?;
            if read == 0 {
                bail!("input closed while asking for '{field}'");
            }
            let answer = line.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_trimmed_answer_and_echoes_prompt() {
        let asker = LineAsker::new(Cursor::new("  Berlin \n"), Vec::new());
        let answer = asker.ask("departure", "Pick a city").expect("answer");
        assert_eq!(answer, "Berlin");

        let written = String::from_utf8(asker.io.borrow().1.clone()).expect("utf8");
        assert_eq!(written, "Pick a city\ndeparture> ");
    }

    #[test]
    fn blank_lines_are_asked_again() {
        let asker = LineAsker::new(Cursor::new("\n   \nParis\n"), Vec::new());
        assert_eq!(asker.ask("departure", "?").expect("answer"), "Paris");
    }

    #[test]
    fn closed_input_is_an_error() {
        let asker = LineAsker::new(Cursor::new(""), Vec::new());
        let err = asker.ask("date", "?").expect_err("must fail");
        assert!(err.to_string().contains("input closed"));
    }
}
