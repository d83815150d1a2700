use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Upvote,
    Downvote,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteDirection::Upvote),
            "downvote" => Ok(VoteDirection::Downvote),
            other => Err(format!("Invalid vote type `{other}`")),
        }
    }
}

/// What a cast did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Cast,
    Switched,
    Retracted,
}

/// Running counters of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl Tally {
    fn bump(&mut self, direction: VoteDirection, delta: i32) {
        match direction {
            VoteDirection::Upvote => self.upvotes += delta,
            VoteDirection::Downvote => self.downvotes += delta,
        }
    }

    /// Apply a vote given the voter's previous direction on this post.
    /// Counters are not clamped.
    pub fn apply(
        mut self,
        previous: Option<VoteDirection>,
        requested: VoteDirection,
    ) -> (Tally, VoteAction) {
        let action = match previous {
            Some(prev) if prev == requested => {
                self.bump(requested, -1);
                VoteAction::Retracted
            }
            Some(prev) => {
                self.bump(requested, 1);
                self.bump(prev, -1);
                VoteAction::Switched
            }
            None => {
                self.bump(requested, 1);
                VoteAction::Cast
            }
        };
        (self, action)
    }
}
