
use console::style;
use std::io::{BufRead, Write};
use tracing::{info, warn};

use super::completion::CompletionProvider;
use super::session::ChatSession;
use crate::Result;
use crate::embeddings::EmbeddingProvider;

pub const USER_MARKER: &str = "🧒 -> ";
pub const ASSISTANT_MARKER: &str = "🤖 -> ";
pub const FAREWELL: &str = "Chat ended 🔚";

const EXIT_COMMANDS: [&str; 2] = ["exit", "quit"];

/// Whether `line` asks to end the session
#[inline]
pub fn is_exit_command(line: &str) -> bool {
    let trimmed = line.trim();
    EXIT_COMMANDS
        .iter()
        .any(|command| trimmed.eq_ignore_ascii_case(command))
}

/// Read questions from `input` until an exit command or end of input,
/// writing each reply to `output`. Failed turns are reported and the loop
/// carries on. Bytes that are not valid UTF-8 are replaced rather than
/// ending the session. Returns the number of answered questions.
#[inline]
pub async fn run_console<E, C, R, W>(
    session: &mut ChatSession<E, C>,
    mut input: R,
    mut output: W,
) -> Result<usize>
where
    E: EmbeddingProvider,
    C: CompletionProvider,
    R: BufRead,
    W: Write,
{
    let mut answered = 0;
    let mut buffer = Vec::new();

    loop {
        write!(output, "{}", style(USER_MARKER).cyan())?;
        output.flush()?;

        buffer.clear();
        if input.read_until(b'\n', &mut buffer)? == 0 {
            writeln!(output)?;
            break;
        }
        let line = String::from_utf8_lossy(&buffer);

        if is_exit_command(&line) {
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match session.ask(query).await {
            Ok(reply) => {
                answered += 1;
                writeln!(output, "{}{}", style(ASSISTANT_MARKER).green(), reply.content)?;
            }
            Err(e) => {
                warn!("Chat turn failed: {}", e);
                writeln!(output, "{}", style(format!("Error: {}", e)).red())?;
            }
        }
    }

    writeln!(output, "{}", FAREWELL)?;
    writeln!(output, "{}", "=".repeat(100))?;
    info!("Chat session ended after {} answered questions", answered);

    Ok(answered)
}
