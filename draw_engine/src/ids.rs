//! Identifier generation for structures and match-ups.

use std::collections::VecDeque;
use uuid::Uuid;

/// Source of structure and match-up ids.
///
/// Supplied ids are consumed in order; once they run out, fresh v4 uuids
/// are generated. Supplying ids keeps generated documents reproducible.
#[derive(Debug, Clone, Default)]
pub struct IdSource {
    supplied: VecDeque<String>,
    prefix: Option<String>,
    counter: u32,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supplied<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            supplied: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Readable `prefix-1`, `prefix-2`, ... ids instead of uuids.
    pub fn sequential(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }

    pub fn next_id(&mut self) -> String {
        if let Some(id) = self.supplied.pop_front() {
            return id;
        }
        match &self.prefix {
            Some(prefix) => {
                self.counter += 1;
                format!("{prefix}-{}", self.counter)
            }
            None => Uuid::new_v4().to_string(),
        }
    }

    pub fn remaining_supplied(&self) -> usize {
        self.supplied.len()
    }
}
