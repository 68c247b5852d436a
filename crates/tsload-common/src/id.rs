//! Tag-set identity type.
//!
//! A tag-set is stored once in the tags table and referenced from every
//! metric row by its dense integer id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense tag-set identifier, assigned in first-seen order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u64);

impl TagId {
    /// The first id handed out by a fresh registry.
    pub const FIRST: TagId = TagId(1);

    /// The id allocated after this one.
    pub fn next(self) -> Self {
        TagId(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TagId {
    fn from(id: u64) -> Self {
        TagId(id)
    }
}
