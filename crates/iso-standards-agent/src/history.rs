/// Rolling window of recent exchanges for one chat session.
use std::collections::VecDeque;

use crate::model::Exchange;

/// Number of exchanges kept for context.
pub const HISTORY_CAPACITY: usize = 5;

/// Append-only, capacity-bounded sequence of exchanges. Oldest entries are evicted first.
///
/// Each session owns its own history; share across threads only behind a lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    exchanges: VecDeque<Exchange>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            exchanges: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Seed a history from prior exchanges, keeping only the most recent ones.
    pub fn from_exchanges<I>(exchanges: I) -> Self
    where
        I: IntoIterator<Item = Exchange>,
    {
        let mut history = Self::new();
        for exchange in exchanges {
            history.append(exchange);
        }
        history
    }

    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push_back(exchange);
        while self.exchanges.len() > HISTORY_CAPACITY {
            self.exchanges.pop_front();
        }
    }

    /// The last `min(n, len)` exchanges, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Exchange> {
        let skip = self.exchanges.len().saturating_sub(n);
        self.exchanges.iter().skip(skip).cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(i: usize) -> Exchange {
        Exchange::new(format!("question {i}"), format!("answer {i}"))
    }

    #[test]
    fn test_append_then_recent_one_round_trips() {
        let mut history = ConversationHistory::new();
        history.append(exchange(1));
        assert_eq!(history.recent(1), vec![exchange(1)]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut history = ConversationHistory::new();
        for i in 0..23 {
            history.append(exchange(i));
            assert!(history.len() <= HISTORY_CAPACITY);
            assert!(history.recent(HISTORY_CAPACITY).len() <= HISTORY_CAPACITY);
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_evicts_oldest_and_keeps_order() {
        let mut history = ConversationHistory::new();
        for i in 0..7 {
            history.append(exchange(i));
        }
        let recent = history.recent(5);
        let questions: Vec<&str> = recent.iter().map(|e| e.user_message.as_str()).collect();
        assert_eq!(
            questions,
            vec![
                "question 2",
                "question 3",
                "question 4",
                "question 5",
                "question 6"
            ]
        );
    }

    #[test]
    fn test_recent_clamps_to_length() {
        let mut history = ConversationHistory::new();
        assert!(history.recent(3).is_empty());

        history.append(exchange(1));
        history.append(exchange(2));
        assert_eq!(history.recent(10), vec![exchange(1), exchange(2)]);
        assert_eq!(history.recent(1), vec![exchange(2)]);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_from_exchanges_keeps_most_recent() {
        let history = ConversationHistory::from_exchanges((0..8).map(exchange));
        assert_eq!(history.len(), HISTORY_CAPACITY);
        assert_eq!(history.iter().next(), Some(&exchange(3)));
    }
}
