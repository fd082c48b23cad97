use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use ignis_core::{decode_journal_message_line, encode_journal_message_line, JournalMessage};
use tracing::{debug, warn};

use super::{Journal, JournalError};

/// JSONL journal, one message per line, synced after every append.
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes the next append start on a fresh line. A trailing line that
    /// decodes is the one `read_all` already replays, so it only gets its
    /// missing newline; anything else is cut.
    fn repair_unterminated_tail(&self) -> Result<(), JournalError> {
        let mut file = match OpenOptions::new().read(true).write(true).open(&self.path) {
            Ok(file) => file,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(error) => return Err(error.into()),
        };
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(());
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::Start(len - 1))?;
        file.read_exact(&mut last)?;
        if last[0] == b'\n' {
            return Ok(());
        }

        let mut content = Vec::new();
        file.seek(SeekFrom::Start(0))?;
        file.read_to_end(&mut content)?;
        let keep = content
            .iter()
            .rposition(|byte| *byte == b'\n')
            .map_or(0, |position| position + 1);
        let tail = String::from_utf8_lossy(&content[keep..]);
        if decode_journal_message_line(tail.trim()).is_ok() {
            debug!(path = %self.path.display(), "terminating last journal line");
            file.seek(SeekFrom::End(0))?;
            file.write_all(b"\n")?;
            file.sync_data()?;
            return Ok(());
        }
        warn!(
            path = %self.path.display(),
            discarded_bytes = content.len() - keep,
            "discarding partially written journal line"
        );
        file.set_len(keep as u64)?;
        Ok(())
    }
}

impl Journal for FileJournal {
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError> {
        let line = encode_journal_message_line(message)?;
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.repair_unterminated_tail()?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        debug!(
            path = %self.path.display(),
            message_type = message.message_type(),
            future_id = message.future_id().unwrap_or_default(),
            "journal message appended"
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        let complete = content.ends_with('\n');
        let lines: Vec<&str> = content.lines().collect();
        let mut messages = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match decode_journal_message_line(line) {
                Ok(message) => messages.push(message),
                Err(error) if !complete && index + 1 == lines.len() => {
                    warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        %error,
                        "ignoring partially written journal line"
                    );
                }
                Err(source) => return Err(JournalError::InvalidLine { line: index + 1, source }),
            }
        }
        Ok(messages)
    }
}
