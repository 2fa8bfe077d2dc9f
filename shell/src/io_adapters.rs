use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::BufRead;

/// Supplier of raw command lines for the interpreter.
pub trait LineSource {
    /// Reads the next raw line, showing `prompt` if the source is interactive.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal input backed by rustyline.
///
/// Lines are not added to any history.
pub struct ReadlineSource {
    editor: DefaultEditor,
}

impl ReadlineSource {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to initialise line editor")?;
        Ok(Self { editor })
    }
}

impl LineSource for ReadlineSource {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C at the prompt just abandons the current line.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err).context("failed to read line"),
        }
    }
}

/// Line source over any buffered reader, e.g. piped stdin or an in-memory script.
///
/// Lines keep their terminator. No prompt is printed.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        // Bytes that are not UTF-8 are replaced rather than ending the session.
        let mut bytes = Vec::new();
        let read = self.reader.read_until(b'\n', &mut bytes).context("failed to read line")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}
