//! Lazily-populated value storage keyed by joint state.

use std::collections::HashMap;

use crate::types::JointState;

/// Mapping from joint state to a value of type `V`.
///
/// Entries are never pre-populated: they appear with `V::default()` the
/// first time [`ValueTable::get_or_insert_default`] sees their key.
#[derive(Debug, Clone, Default)]
pub struct ValueTable<V> {
    values: HashMap<JointState, V>,
}

impl<V: Default> ValueTable<V> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Returns the entry for `key`, inserting the default value first if absent.
    pub fn get_or_insert_default(&mut self, key: &JointState) -> &mut V {
        self.values.entry(key.clone()).or_default()
    }

    /// Read-only lookup; never inserts.
    pub fn get(&self, key: &JointState) -> Option<&V> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &JointState) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JointState, &V)> {
        self.values.iter()
    }
}

impl<V> FromIterator<(JointState, V)> for ValueTable<V> {
    fn from_iter<I: IntoIterator<Item = (JointState, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
