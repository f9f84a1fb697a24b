//! Where post and comment text comes from.
//!
//! Other sources (dictation, an editor) would be further [`InputSource`]
//! implementations.

use std::io::{self, BufRead, Read};

use anyhow::{Context, Result};

pub trait InputSource {
    /// Reads the full text. Validation happens later.
    fn read_text(&mut self) -> Result<String>;
}

/// Text passed on the command line.
#[derive(Debug)]
pub struct InlineInput(pub String);

impl InputSource for InlineInput {
    fn read_text(&mut self) -> Result<String> {
        Ok(std::mem::take(&mut self.0))
    }
}

/// Text read from a reader until EOF; stdin by default.
#[derive(Debug)]
pub struct ReaderInput<R> {
    reader: R,
}

impl ReaderInput<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> InputSource for ReaderInput<R> {
    fn read_text(&mut self) -> Result<String> {
        let mut text = String::new();
        self.reader
            .read_to_string(&mut text)
            .context("failed to read text from stdin")?;
        Ok(text)
    }
}

/// The inline text when given, otherwise stdin.
pub fn from_arg(text: Option<String>) -> Box<dyn InputSource> {
    match text {
        Some(text) => Box::new(InlineInput(text)),
        None => Box::new(ReaderInput::stdin()),
    }
}

/// Reads one trimmed line, e.g. a username typed at a prompt.
pub fn read_line(reader: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}
