//! Field-level permission context.

use std::collections::{BTreeSet, HashMap};

/// Permission context applied by the sanitization boundary
///
/// Content types without an explicit restriction are unrestricted; once a
/// restriction is registered for a uid only the listed fields pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    readable: HashMap<String, BTreeSet<String>>,
    writable: HashMap<String, BTreeSet<String>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit readable fields of `uid` to `fields`
    pub fn restrict_read<I, S>(mut self, uid: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.readable
            .insert(uid.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    /// Limit writable fields of `uid` to `fields`
    pub fn restrict_write<I, S>(mut self, uid: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.writable
            .insert(uid.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn can_read(&self, uid: &str, field: &str) -> bool {
        self.readable
            .get(uid)
            .map_or(true, |fields| fields.contains(field))
    }

    pub fn can_write(&self, uid: &str, field: &str) -> bool {
        self.writable
            .get(uid)
            .map_or(true, |fields| fields.contains(field))
    }
}
