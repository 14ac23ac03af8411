// 🧑 Person Entity + Membership Store
//
// Identity: canonical key (never changes)
// Value: display name, fixed at first registration

use crate::error::{LedgerError, LedgerResult};
use crate::identity::{canonicalize, sort_case_insensitive, validate_person_name};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// PERSON ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Case-insensitive identity, also the graph node id
    pub key: String,

    /// Name as first registered
    pub display_name: String,

    pub joined_at: DateTime<Utc>,
}

impl Person {
    /// Validate `name` and build the person it denotes
    pub fn new(name: &str) -> LedgerResult<Self> {
        let display_name = validate_person_name(name)?;
        Ok(Person {
            key: canonicalize(&display_name),
            display_name,
            joined_at: Utc::now(),
        })
    }
}

// ============================================================================
// MEMBERSHIP STORE
// ============================================================================

/// Registered members of one group, keyed canonically
///
/// Not synchronized on its own: it lives inside the group's single lock.
#[derive(Debug, Default, Clone)]
pub struct MembershipStore {
    people: BTreeMap<String, Person>,
}

impl MembershipStore {
    pub fn new() -> Self {
        MembershipStore {
            people: BTreeMap::new(),
        }
    }

    /// Register a person; fails if the canonical key is taken
    pub fn insert(&mut self, group: &str, person: Person) -> LedgerResult<()> {
        if let Some(existing) = self.people.get(&person.key) {
            return Err(LedgerError::DuplicateMember {
                member: existing.display_name.clone(),
                group: group.to_string(),
            });
        }
        self.people.insert(person.key.clone(), person);
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.people.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Person> {
        self.people.get(key)
    }

    /// Resolve any spelling of a member's name to their canonical key
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.people
            .get_key_value(&canonicalize(name))
            .map(|(key, _)| key.as_str())
    }

    /// Display name for a key, falling back to the key itself
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.people
            .get(key)
            .map(|p| p.display_name.as_str())
            .unwrap_or(key)
    }

    /// Canonical keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.people.keys().map(String::as_str)
    }

    /// Display names sorted case-insensitively
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .people
            .values()
            .map(|p| p.display_name.clone())
            .collect();
        sort_case_insensitive(&mut names);
        names
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
