//! Append-only text sink for progress narration.

use std::io::Write;
use std::sync::Mutex;

/// Where progress dots and state lines go. Never read back.
pub trait ProgressSink: Send + Sync {
    fn print(&self, text: &str);

    fn println(&self, text: &str) {
        self.print(text);
        self.print("\n");
    }
}

/// Writes narration to stderr so stdout only carries results.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl ProgressSink for TerminalSink {
    fn print(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        // Narration is cosmetic; a closed stderr must not fail the command.
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }
}

/// Captures narration in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    buf: Mutex<String>,
}

impl BufferSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .map(|b| b.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ProgressSink for BufferSink {
    fn print(&self, text: &str) {
        match self.buf.lock() {
            Ok(mut buf) => buf.push_str(text),
            Err(poisoned) => poisoned.into_inner().push_str(text),
        }
    }
}
