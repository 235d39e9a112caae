//! Majority voting over closed vocabularies
//!
//! Every categorical field of a consensus (complexity, workflow pattern,
//! quality level) is decided the same way: most votes wins, and a tie is
//! broken alphabetically by the option's wire name.

use crate::evaluation::{Complexity, QualityLevel, WorkflowPattern};
use serde::{Deserialize, Serialize};

/// Something evaluators can vote for
pub trait VoteOption: Copy + Eq {
    /// Stable key used for alphabetical tie-breaking
    fn vote_key(&self) -> &'static str;
}

impl VoteOption for Complexity {
    fn vote_key(&self) -> &'static str {
        self.as_str()
    }
}

impl VoteOption for WorkflowPattern {
    fn vote_key(&self) -> &'static str {
        self.as_str()
    }
}

impl VoteOption for QualityLevel {
    fn vote_key(&self) -> &'static str {
        self.as_str()
    }
}

/// Outcome of a majority vote
///
/// # Example
///
/// ```
/// use council_domain::consensus::majority_vote;
/// use council_domain::evaluation::Complexity::*;
///
/// let tally = majority_vote([Simple, Medium, Simple, Medium, Simple]).unwrap();
/// assert_eq!(tally.winner, Simple);
/// assert!(!tally.tied);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally<T> {
    pub winner: T,
    /// Every option that received a vote, most votes first
    pub counts: Vec<(T, usize)>,
    /// Whether the winner was decided by the tie-break
    pub tied: bool,
}

/// Count votes; most votes wins, ties go to the alphabetically first key.
///
/// Returns `None` when no votes are cast.
pub fn majority_vote<T: VoteOption>(votes: impl IntoIterator<Item = T>) -> Option<Tally<T>> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for vote in votes {
        match counts.iter_mut().find(|(option, _)| *option == vote) {
            Some((_, n)) => *n += 1,
            None => counts.push((vote, 1)),
        }
    }

    counts.sort_by(|(a, na), (b, nb)| nb.cmp(na).then_with(|| a.vote_key().cmp(b.vote_key())));

    let (winner, top) = *counts.first()?;
    let tied = counts.get(1).is_some_and(|(_, n)| *n == top);

    Some(Tally {
        winner,
        counts,
        tied,
    })
}
