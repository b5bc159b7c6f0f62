//! Line sources for interactive scanning
//!
//! Barcode scanners behave as keyboards: one identifier per line, terminated
//! by Enter.

use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

/// Source of interactively entered lines
#[async_trait]
pub trait ScanInput: Send {
    /// Next line without its terminator, or `None` at end of stream
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Standard input, with a prompt written to stdout before every read
pub struct StdinScanner {
    lines: Lines<BufReader<Stdin>>,
    stdout: Stdout,
    prompt: String,
}

impl StdinScanner {
    pub fn new(sentinel: &str) -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            stdout: tokio::io::stdout(),
            prompt: format!("Scan ISBN (or type '{}' to finish): ", sentinel),
        }
    }
}

#[async_trait]
impl ScanInput for StdinScanner {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.stdout.write_all(self.prompt.as_bytes()).await?;
        self.stdout.flush().await?;
        self.lines.next_line().await
    }
}

/// Fixed list of lines, replayed in order (piped input, tests)
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ScanInput for ScriptedInput {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_input_replays_then_ends() {
        let mut input = ScriptedInput::new(["a", "b"]);
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(input.next_line().await.unwrap(), None);
    }
}
