//! The interactive question loop.

use std::io::Write;

use faqbot_rag::{ConversationSession, TurnOutcome};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

/// Prompt shown before each question.
pub const PROMPT: &str = "Question: ";

/// Console command that clears the conversation history.
pub const RESET_COMMAND: &str = "/reset";

/// Source of input lines.
///
/// `Ok(None)` means the user closed the input (end of file or interrupt).
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}

/// Line editor backed by `rustyline`, with in-memory history.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { editor: DefaultEditor::new()? })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(std::io::Error::other(e)),
        }
    }
}

/// Options controlling console output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOptions {
    /// Print the retrieved chunks after each answer.
    pub show_sources: bool,
}

/// Run the read-answer loop until the user exits.
///
/// Answers go to `out`. Per-question failures are reported on `err` and the
/// loop keeps going with history unchanged.
pub async fn run_console<R, O, E>(
    session: &mut ConversationSession,
    reader: &mut R,
    out: &mut O,
    err: &mut E,
    options: ConsoleOptions,
) -> anyhow::Result<()>
where
    R: LineReader + ?Sized,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    writeln!(
        out,
        "Ask a question about the document. Type {} to quit, {RESET_COMMAND} to start over.",
        session.exit_words().join(" or ")
    )?;

    loop {
        let Some(line) = reader.read_line(PROMPT)? else {
            break;
        };

        if line.trim() == RESET_COMMAND {
            session.reset();
            writeln!(out, "Conversation cleared.")?;
            continue;
        }

        match session.handle(&line).await {
            Ok(TurnOutcome::Exit) => break,
            Ok(TurnOutcome::Empty) => continue,
            Ok(TurnOutcome::Answer(answer)) => {
                debug!(query = %answer.standalone_query, "answered");
                writeln!(out, "Answer: {}", answer.text)?;
                if options.show_sources {
                    for (rank, source) in answer.sources.iter().enumerate() {
                        writeln!(
                            out,
                            "  [{}] {} ({:.3}): {}",
                            rank + 1,
                            source.chunk.id,
                            source.score,
                            preview(&source.chunk.text, 80)
                        )?;
                    }
                }
            }
            Err(e) => {
                writeln!(err, "Error processing the question: {:#}", anyhow::Error::new(e))?;
            }
        }
        out.flush()?;
    }

    writeln!(out, "Goodbye!")?;
    Ok(())
}

/// First `max_chars` characters of `text` on a single line.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_and_truncates() {
        assert_eq!(preview("a\n\nb  c", 80), "a b c");
        assert_eq!(preview("héllo world", 5), "héllo...");
    }
}
