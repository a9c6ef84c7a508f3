//! Bounded conversation memory.
//!
//! A fixed-capacity ring buffer of the most recent (user, response)
//! exchanges. Slots are allocated once up to capacity; after that each
//! append overwrites the oldest slot and advances the head, so eviction is
//! O(1) and the buffer never grows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::text::excerpt;

/// Default number of exchanges retained.
pub const DEFAULT_CAPACITY: usize = 10;
/// Default number of exchanges rendered by [`ConversationMemory::recent_context`].
pub const DEFAULT_RECENT_TURNS: usize = 3;
/// Default response excerpt length in the rendered context.
pub const DEFAULT_RESPONSE_CHARS: usize = 100;

/// One user question and the response it received.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub user: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    slots: Vec<ConversationTurn>,
    /// Index of the oldest turn once the buffer is full.
    head: usize,
    capacity: usize,
    recent_turns: usize,
    response_chars: usize,
}

impl ConversationMemory {
    /// Create a buffer holding at most `capacity` exchanges (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            recent_turns: DEFAULT_RECENT_TURNS,
            response_chars: DEFAULT_RESPONSE_CHARS,
        }
    }

    /// Override how [`recent_context`](Self::recent_context) renders.
    pub fn with_rendering(mut self, recent_turns: usize, response_chars: usize) -> Self {
        self.recent_turns = recent_turns;
        self.response_chars = response_chars;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record an exchange, evicting the oldest one when full.
    pub fn append(&mut self, user: &str, response: &str) {
        let turn = ConversationTurn {
            user: user.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };
        if self.slots.len() < self.capacity {
            self.slots.push(turn);
        } else {
            self.slots[self.head] = turn;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ConversationTurn> {
        let len = self.slots.len();
        (0..len).map(move |i| &self.slots[(self.head + i) % len])
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }

    /// Render the last few exchanges, or `""` when nothing was recorded.
    pub fn recent_context(&self) -> String {
        if self.slots.is_empty() {
            return String::new();
        }

        let skip = self.slots.len().saturating_sub(self.recent_turns);
        let mut out = String::from("Recent conversation:\n");
        for turn in self.iter().skip(skip) {
            out.push_str(&format!("User: {}\n", turn.user));
            out.push_str(&format!(
                "AI: {}...\n\n",
                excerpt(&turn.response, self.response_chars)
            ));
        }
        out
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_renders_nothing() {
        let memory = ConversationMemory::default();
        assert!(memory.is_empty());
        assert_eq!(memory.recent_context(), "");
    }

    #[test]
    fn test_eleven_appends_evict_first() {
        let mut memory = ConversationMemory::default();
        for i in 1..=11 {
            memory.append(&format!("q{}", i), &format!("a{}", i));
        }
        assert_eq!(memory.len(), 10);
        let users: Vec<&str> = memory.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(
            users,
            vec!["q2", "q3", "q4", "q5", "q6", "q7", "q8", "q9", "q10", "q11"]
        );
        assert!(!users.contains(&"q1"));
    }

    #[test]
    fn test_wraps_many_times() {
        let mut memory = ConversationMemory::new(3);
        for i in 0..100 {
            memory.append(&i.to_string(), "r");
        }
        let users: Vec<&str> = memory.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(users, vec!["97", "98", "99"]);
        assert_eq!(memory.capacity(), 3);
    }

    #[test]
    fn test_recent_context_last_three_truncated() {
        let mut memory = ConversationMemory::default();
        memory.append("first", "one");
        memory.append("second", "two");
        memory.append("third", "three");
        memory.append("fourth", &"x".repeat(250));

        let ctx = memory.recent_context();
        assert!(ctx.starts_with("Recent conversation:\n"));
        assert!(!ctx.contains("User: first"));
        assert!(ctx.contains("User: second\nAI: two...\n\n"));
        assert!(ctx.contains(&format!("AI: {}...\n", "x".repeat(100))));
        assert!(!ctx.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut memory = ConversationMemory::new(0);
        memory.append("a", "b");
        memory.append("c", "d");
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.iter().next().unwrap().user, "c");
    }

    #[test]
    fn test_clear() {
        let mut memory = ConversationMemory::new(2);
        memory.append("a", "b");
        memory.append("c", "d");
        memory.append("e", "f");
        memory.clear();
        assert!(memory.is_empty());
        memory.append("g", "h");
        assert_eq!(memory.iter().next().unwrap().user, "g");
    }
}
