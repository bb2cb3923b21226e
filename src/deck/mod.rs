//! One-at-a-time sequencing of a ranked discovery queue.
//!
//! The deck only tracks order and the current head. Gesture handling,
//! rendering and wishlist persistence belong to the caller.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::RankedListing;
use crate::error::{DiscoveryError, Result};

/// The user's verdict on the presented listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Swipe right / add to wishlist
    Accept,
    /// Swipe left / skip
    Reject,
}

/// Observable deck state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    /// Nothing loaded yet, or withdrawn
    Empty,
    /// A listing is on top
    Presenting,
    /// Every loaded listing has been decided
    Exhausted,
}

impl DeckState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeckState::Empty => "empty",
            DeckState::Presenting => "presenting",
            DeckState::Exhausted => "exhausted",
        }
    }
}

/// Result of a successful [`DiscoveryDeck::decide`]
#[derive(Debug, Clone, PartialEq)]
pub struct Decided {
    pub listing: RankedListing,
    pub decision: Decision,
}

#[derive(Debug, Clone, Default)]
enum Inner {
    #[default]
    Empty,
    Presenting {
        current: RankedListing,
        remaining: VecDeque<RankedListing>,
    },
    Exhausted,
}

/// Sequencer over a discovery queue
#[derive(Debug, Clone, Default)]
pub struct DiscoveryDeck {
    inner: Inner,
}

impl DiscoveryDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all state with `queue`. An empty queue is immediately exhausted.
    pub fn load(&mut self, queue: Vec<RankedListing>) {
        let mut remaining: VecDeque<RankedListing> = queue.into();

        self.inner = match remaining.pop_front() {
            Some(current) => Inner::Presenting { current, remaining },
            None => Inner::Exhausted,
        };

        tracing::debug!("Deck loaded: {} ({} queued)", self.state().as_str(), self.len());
    }

    /// Head listing while presenting
    pub fn current(&self) -> Option<&RankedListing> {
        match &self.inner {
            Inner::Presenting { current, .. } => Some(current),
            _ => None,
        }
    }

    /// Drop the current listing and advance.
    ///
    /// Fails with [`DiscoveryError::InvalidState`] when nothing is presented;
    /// callers check [`current`](Self::current) first. Both decisions advance
    /// the same way.
    pub fn decide(&mut self, decision: Decision) -> Result<Decided> {
        let (current, mut remaining) = match std::mem::take(&mut self.inner) {
            Inner::Presenting { current, remaining } => (current, remaining),
            other => {
                let state = match other {
                    Inner::Exhausted => DeckState::Exhausted,
                    _ => DeckState::Empty,
                };
                self.inner = other;
                return Err(DiscoveryError::InvalidState {
                    operation: "decide",
                    state: state.as_str(),
                });
            }
        };

        self.inner = match remaining.pop_front() {
            Some(next) => Inner::Presenting {
                current: next,
                remaining,
            },
            None => Inner::Exhausted,
        };

        tracing::debug!("Decided {:?} on {} ({} left)", decision, current.id(), self.len());

        Ok(Decided {
            listing: current,
            decision,
        })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.inner, Inner::Exhausted)
    }

    /// Withdraw the deck without loading a replacement
    pub fn reset(&mut self) {
        self.inner = Inner::Empty;
    }

    pub fn state(&self) -> DeckState {
        match self.inner {
            Inner::Empty => DeckState::Empty,
            Inner::Presenting { .. } => DeckState::Presenting,
            Inner::Exhausted => DeckState::Exhausted,
        }
    }

    /// Listings queued behind the current one, in order
    pub fn remaining(&self) -> impl Iterator<Item = &RankedListing> {
        let queued = match &self.inner {
            Inner::Presenting { remaining, .. } => Some(remaining.iter()),
            _ => None,
        };
        queued.into_iter().flatten()
    }

    /// Undecided listings, current included
    pub fn len(&self) -> usize {
        match &self.inner {
            Inner::Presenting { remaining, .. } => remaining.len() + 1,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Listing;

    fn queue(ids: &[&str]) -> Vec<RankedListing> {
        ids.iter()
            .map(|id| RankedListing::new(Listing::new(*id), None, 50.0))
            .collect()
    }

    fn current_id(deck: &DiscoveryDeck) -> Option<&str> {
        deck.current().map(|r| r.id())
    }

    #[test]
    fn test_starts_empty() {
        let deck = DiscoveryDeck::new();
        assert_eq!(deck.state(), DeckState::Empty);
        assert!(deck.current().is_none());
        assert!(!deck.is_exhausted());
    }

    #[test]
    fn test_walkthrough() {
        let mut deck = DiscoveryDeck::new();
        deck.load(queue(&["X", "Y", "Z"]));
        assert_eq!(current_id(&deck), Some("X"));
        assert_eq!(deck.len(), 3);

        let decided = deck.decide(Decision::Accept).unwrap();
        assert_eq!(decided.listing.id(), "X");
        assert_eq!(decided.decision, Decision::Accept);
        assert_eq!(current_id(&deck), Some("Y"));

        deck.decide(Decision::Reject).unwrap();
        assert_eq!(current_id(&deck), Some("Z"));
        assert_eq!(deck.remaining().count(), 0);

        deck.decide(Decision::Accept).unwrap();
        assert!(deck.current().is_none());
        assert!(deck.is_exhausted());
    }

    #[test]
    fn test_decide_on_empty_fails() {
        let mut deck = DiscoveryDeck::new();
        let err = deck.decide(Decision::Accept).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidState { state: "empty", .. }));
        assert_eq!(deck.state(), DeckState::Empty);
        assert!(deck.current().is_none());
    }

    #[test]
    fn test_decide_on_exhausted_fails() {
        let mut deck = DiscoveryDeck::new();
        deck.load(queue(&["only"]));
        deck.decide(Decision::Reject).unwrap();

        let err = deck.decide(Decision::Reject).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidState { state: "exhausted", .. }));
        assert!(deck.is_exhausted());
    }

    #[test]
    fn test_exactly_n_decisions_exhaust() {
        for n in 1..6 {
            let ids: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let mut deck = DiscoveryDeck::new();
            deck.load(queue(&refs));

            for i in 0..n {
                assert!(!deck.is_exhausted());
                assert!(deck.current().is_some());
                let decision = if i % 2 == 0 { Decision::Accept } else { Decision::Reject };
                deck.decide(decision).unwrap();
            }
            assert!(deck.is_exhausted());
            assert!(deck.current().is_none());
        }
    }

    #[test]
    fn test_load_empty_is_exhausted() {
        let mut deck = DiscoveryDeck::new();
        deck.load(Vec::new());
        assert!(deck.is_exhausted());
        assert!(deck.current().is_none());
    }

    #[test]
    fn test_reload_discards_state() {
        let mut deck = DiscoveryDeck::new();
        deck.load(queue(&["a", "b"]));
        deck.decide(Decision::Accept).unwrap();

        deck.load(queue(&["c", "d", "e"]));
        assert_eq!(current_id(&deck), Some("c"));
        let rest: Vec<&str> = deck.remaining().map(|r| r.id()).collect();
        assert_eq!(rest, vec!["d", "e"]);
    }

    #[test]
    fn test_reset() {
        let mut deck = DiscoveryDeck::new();
        deck.load(queue(&["a", "b"]));
        deck.reset();
        assert_eq!(deck.state(), DeckState::Empty);
        assert!(deck.current().is_none());
        assert!(deck.is_empty());

        deck.reset();
        deck.load(Vec::new());
        assert_eq!(deck.state(), DeckState::Exhausted);
    }
}
