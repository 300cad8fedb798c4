//! Line-oriented input collaborator.

use std::io::{self, BufRead, IsTerminal, Stdin, Stdout, Write};

pub const PROMPT: &str = "> ";

pub trait InputSource {
    /// Next turn of raw text; an empty string ends the conversation.
    fn read_turn(&mut self) -> io::Result<String>;
}

/// Collects lines until a blank line or end of input.
pub struct LineInput<R, W> {
    reader: R,
    prompt: Option<W>,
}

pub type TerminalInput = LineInput<io::StdinLock<'static>, Stdout>;

impl TerminalInput {
    /// Read from stdin, prompting on stdout only when stdin is a terminal.
    pub fn stdin() -> Self {
        let stdin: Stdin = io::stdin();
        let prompt = stdin.is_terminal().then(io::stdout);
        LineInput::new(stdin.lock(), prompt)
    }
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    pub fn new(reader: R, prompt: Option<W>) -> Self {
        Self { reader, prompt }
    }

    fn show_prompt(&mut self) -> io::Result<()> {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.write_all(PROMPT.as_bytes())?;
            prompt.flush()?;
        }
        Ok(())
    }
}

impl<R: BufRead, W: Write> InputSource for LineInput<R, W> {
    fn read_turn(&mut self) -> io::Result<String> {
        self.show_prompt()?;

        let mut lines = Vec::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim_end_matches(['\r', '\n']);
            if trimmed.is_empty() {
                break;
            }
            lines.push(trimmed.to_string());
        }

        Ok(lines.join("\n"))
    }
}
