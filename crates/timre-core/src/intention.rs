//! Single-day intentions and the streak savers they earn.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intention identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentionId(pub u64);

impl fmt::Display for IntentionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task the user set for today. Cleared at rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intention {
    pub id: IntentionId,
    pub text: String,
    pub completed: bool,
}

/// Savers earned by the completed intentions in `intentions`.
///
/// | completed | earned |
/// |-----------|--------|
/// | 0         | 0      |
/// | 1-2       | 1      |
/// | 3+        | 2      |
pub fn savers_earned(intentions: &[Intention]) -> u32 {
    match intentions.iter().filter(|i| i.completed).count() {
        0 => 0,
        1 | 2 => 1,
        _ => 2,
    }
}
