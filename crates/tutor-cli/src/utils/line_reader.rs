//! Line editing on a dedicated thread.
//!
//! rustyline blocks the calling thread, so the editor lives on its own OS
//! thread and hands lines back over a channel. A line is only read after a
//! prompt is requested, which keeps the prompt from appearing while a reply
//! is still being generated.

use std::sync::mpsc;
use std::thread;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc as async_mpsc;

use crate::error::CliError;

/// One read from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// Ctrl+C
    Interrupted,
    /// Ctrl+D or closed stdin
    Eof,
}

/// Async handle to the editor thread.
pub struct LineReader {
    prompt_tx: mpsc::Sender<String>,
    lines: async_mpsc::UnboundedReceiver<Result<Input, String>>,
}

impl LineReader {
    /// Start the editor thread.
    ///
    /// The thread exits once the reader is dropped and the current read (if
    /// any) returns.
    pub fn spawn() -> Result<Self, CliError> {
        let (prompt_tx, prompt_rx) = mpsc::channel::<String>();
        let (line_tx, lines) = async_mpsc::unbounded_channel();

        thread::Builder::new()
            .name("tutor-repl".into())
            .spawn(move || run_editor(&prompt_rx, &line_tx))
            .map_err(|e| CliError::Io(format!("failed to start input thread: {e}")))?;

        Ok(Self { prompt_tx, lines })
    }

    /// Show `prompt` and wait for the next line.
    pub async fn read_line(&mut self, prompt: &str) -> Result<Input, CliError> {
        self.prompt_tx
            .send(prompt.to_string())
            .map_err(|_| CliError::Io("input thread exited".into()))?;

        match self.lines.recv().await {
            Some(Ok(input)) => Ok(input),
            Some(Err(message)) => Err(CliError::Io(message)),
            None => Ok(Input::Eof),
        }
    }
}

fn run_editor(
    prompts: &mpsc::Receiver<String>,
    lines: &async_mpsc::UnboundedSender<Result<Input, String>>,
) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            let _ = lines.send(Err(format!("failed to open line editor: {e}")));
            return;
        }
    };

    while let Ok(prompt) = prompts.recv() {
        let input = match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                Ok(Input::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(e) => Err(e.to_string()),
        };
        if lines.send(input).is_err() {
            break;
        }
    }
    tracing::debug!("Input thread exiting");
}
