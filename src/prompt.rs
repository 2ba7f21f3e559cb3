//! Interactive prompts.
//!
//! Commands ask for missing values through the [`Prompter`] trait. A prompt
//! answered with `None` means the user dismissed it, which cancels the
//! whole command.

use crate::error::{PairError, PairResult};
use colored::*;
use std::io::{self, BufRead, Write};

/// Source of interactive answers.
pub trait Prompter {
    /// Asks for a line of text. `initial` is offered as the default answer.
    fn input(&mut self, prompt: &str, initial: Option<&str>) -> PairResult<Option<String>>;

    /// Asks the user to pick one of `items`, returning its index.
    fn choose(&mut self, prompt: &str, items: &[String]) -> PairResult<Option<usize>>;
}

/// [`Prompter`] reading answers line by line from a terminal.
///
/// End of input dismisses the prompt. An empty answer takes the default for
/// [`Prompter::input`] and dismisses [`Prompter::choose`].
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on stderr and reads from stdin, keeping stdout for results.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn read_line(&mut self) -> PairResult<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| PairError::io("<stdin>", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn show(&mut self, text: impl std::fmt::Display) -> PairResult<()> {
        write!(self.writer, "{text}")
            .and_then(|_| self.writer.flush())
            .map_err(|e| PairError::io("<terminal>", e))
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(&mut self, prompt: &str, initial: Option<&str>) -> PairResult<Option<String>> {
        match initial {
            Some(default) => self.show(format!("{} [{}]: ", prompt.bold(), default))?,
            None => self.show(format!("{}: ", prompt.bold()))?,
        }

        Ok(self.read_line()?.map(|answer| match initial {
            Some(default) if answer.is_empty() => default.to_string(),
            _ => answer,
        }))
    }

    fn choose(&mut self, prompt: &str, items: &[String]) -> PairResult<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }

        self.show(format!("{}\n", prompt.bold()))?;
        for (i, item) in items.iter().enumerate() {
            self.show(format!("  {}) {}\n", (i + 1).to_string().cyan(), item))?;
        }

        loop {
            self.show(format!("Select 1-{}: ", items.len()))?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(None);
            }
            if let Ok(n) = answer.parse::<usize>()
                && (1..=items.len()).contains(&n)
            {
                return Ok(Some(n - 1));
            }
            if let Some(i) = items.iter().position(|item| item == answer) {
                return Ok(Some(i));
            }
            self.show(format!("{}\n", "Invalid selection".yellow()))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>> {
        colored::control::set_override(false);
        TerminalPrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_input_reads_line() {
        let mut p = prompter("widget\n");
        assert_eq!(p.input("Base name", None).unwrap().as_deref(), Some("widget"));
    }

    #[test]
    fn test_input_empty_takes_default() {
        let mut p = prompter("\n");
        assert_eq!(p.input("New name", Some("foo")).unwrap().as_deref(), Some("foo"));
    }

    #[test]
    fn test_input_eof_dismisses() {
        let mut p = prompter("");
        assert_eq!(p.input("Base name", Some("foo")).unwrap(), None);
    }

    #[test]
    fn test_choose_by_number_and_name() {
        let items = vec![".h".to_string(), ".hpp".to_string()];

        let mut p = prompter("2\n");
        assert_eq!(p.choose("Header extension", &items).unwrap(), Some(1));

        let mut p = prompter(".h\n");
        assert_eq!(p.choose("Header extension", &items).unwrap(), Some(0));
    }

    #[test]
    fn test_choose_retries_invalid_then_dismisses() {
        let items = vec!["a".to_string(), "b".to_string()];
        let mut p = prompter("7\nzz\n\n");

        assert_eq!(p.choose("Pick", &items).unwrap(), None);
        let shown = String::from_utf8(p.writer.clone()).unwrap();
        assert_eq!(shown.matches("Invalid selection").count(), 2);
    }
}
