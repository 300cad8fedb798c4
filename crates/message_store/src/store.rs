use crate::error::MessageStoreError;
use crate::message::{Message, Role};

/// Ordered conversation history with no two identical `(role, content)` pairs.
///
/// Order is what gets sent to the completion service, so every mutation keeps
/// the remaining messages in place and only ever adds at the tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the tail.
    ///
    /// Returns `Ok(false)` when an identical message is already stored; that
    /// is a silent no-op rather than an error.
    pub fn append(
        &mut self,
        role: Role,
        content: impl Into<String>,
    ) -> Result<bool, MessageStoreError> {
        let content = content.into();
        if content.is_empty() {
            return Err(MessageStoreError::EmptyContent);
        }

        Ok(self.push_unique(Message::new(role, content)))
    }

    /// [`MessageStore::append`] with a role still in its textual form.
    pub fn append_raw(
        &mut self,
        role: &str,
        content: impl Into<String>,
    ) -> Result<bool, MessageStoreError> {
        let role = role.parse::<Role>()?;
        self.append(role, content)
    }

    #[must_use]
    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    #[must_use]
    pub fn contains(&self, message: &Message) -> bool {
        self.messages.contains(message)
    }

    /// Remove `old` wherever it sits and append `new` at the tail.
    ///
    /// `new` is dropped instead of appended when its content is empty or an
    /// identical message already exists. Returns whether `new` was appended.
    pub fn replace(&mut self, old: &Message, new: Message) -> bool {
        self.remove(old);
        if new.content.is_empty() {
            return false;
        }
        self.push_unique(new)
    }

    pub fn remove(&mut self, message: &Message) -> bool {
        match self.messages.iter().position(|existing| existing == message) {
            Some(index) => {
                self.messages.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        tracing::debug!(cleared = self.messages.len(), "message store reset");
        self.messages.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// One JSON record per message, in store order.
    pub fn records(&self) -> Result<Vec<String>, MessageStoreError> {
        self.messages.iter().map(Message::to_record).collect()
    }

    fn push_unique(&mut self, message: Message) -> bool {
        if self.messages.contains(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
