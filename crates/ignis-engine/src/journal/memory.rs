use ignis_core::JournalMessage;

use super::{Journal, JournalError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryJournal {
    messages: Vec<JournalMessage>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<JournalMessage>) -> Self {
        Self { messages }
    }

    pub fn messages(&self) -> &[JournalMessage] {
        &self.messages
    }
}

impl Journal for MemoryJournal {
    fn append(&mut self, message: &JournalMessage) -> Result<(), JournalError> {
        self.messages.push(message.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<JournalMessage>, JournalError> {
        Ok(self.messages.clone())
    }
}
