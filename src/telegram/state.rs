//! Pending free-text input states
//!
//! Some buttons and commands put the chat into a mode where the next plain
//! text message is consumed as input (a search query, a recommendation
//! request). States live in process memory and do not survive restarts.

use dashmap::DashMap;

/// What the next text message in a chat will be interpreted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    /// Catalog-wide product search
    Search,
    /// Product search restricted to one category
    SearchInCategory(i64),
    /// Free-form request for LLM recommendations
    Recommend,
}

/// Pending input per chat id.
#[derive(Debug, Default)]
pub struct PendingInputs {
    states: DashMap<i64, PendingInput>,
}

impl PendingInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a pending input for the chat, replacing any previous one.
    pub fn set(&self, chat_id: i64, input: PendingInput) {
        self.states.insert(chat_id, input);
    }

    /// Consumes and returns the pending input for the chat, if any.
    pub fn take(&self, chat_id: i64) -> Option<PendingInput> {
        self.states.remove(&chat_id).map(|(_, input)| input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_the_state() {
        let states = PendingInputs::new();
        states.set(1, PendingInput::Search);

        assert_eq!(states.take(1), Some(PendingInput::Search));
        assert_eq!(states.take(1), None);
    }

    #[test]
    fn set_replaces_previous_state() {
        let states = PendingInputs::new();
        states.set(1, PendingInput::Search);
        states.set(1, PendingInput::SearchInCategory(7));

        assert_eq!(states.take(1), Some(PendingInput::SearchInCategory(7)));
    }

    #[test]
    fn states_are_per_chat() {
        let states = PendingInputs::new();
        states.set(1, PendingInput::Recommend);

        assert_eq!(states.take(2), None);
        assert_eq!(states.take(1), Some(PendingInput::Recommend));
    }
}
