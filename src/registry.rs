// 🗂️ Group Registry - name → group
//
// Constructed once by the service layer and passed to every entry point.
// Its lock only guards the map; it is never held while a group is locked.

use crate::config::LedgerConfig;
use crate::error::{LedgerError, LedgerResult};
use crate::group::Group;
use crate::identity::{canonicalize, sort_case_insensitive, validate_group_name};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct GroupRegistry {
    config: LedgerConfig,
    groups: Mutex<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new(config: LedgerConfig) -> Self {
        GroupRegistry {
            config,
            groups: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Create a group; names are unique case-insensitively
    pub fn create(&self, name: &str) -> LedgerResult<Arc<Group>> {
        let group_name = validate_group_name(name)?;
        let key = canonicalize(&group_name);

        let mut groups = self.groups.lock();
        if let Some(existing) = groups.get(&key) {
            warn!(group = %existing.name(), "group already exists");
            return Err(LedgerError::DuplicateGroup(existing.name().to_string()));
        }

        let group = Arc::new(Group::new(group_name, self.config));
        groups.insert(key, Arc::clone(&group));
        info!(group = %group.name(), "group created");
        Ok(group)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.lock().get(&canonicalize(name)).cloned()
    }

    /// Like `get`, but a missing group is an error
    pub fn require(&self, name: &str) -> LedgerResult<Arc<Group>> {
        self.get(name)
            .ok_or_else(|| LedgerError::UnknownGroup(name.trim().to_string()))
    }

    /// Group names, case-insensitively sorted
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .groups
            .lock()
            .values()
            .map(|group| group.name().to_string())
            .collect();
        sort_case_insensitive(&mut names);
        names
    }

    /// Remove a group; false if it did not exist
    pub fn delete(&self, name: &str) -> bool {
        let key = canonicalize(name);
        if key.is_empty() {
            return false;
        }
        let removed = self.groups.lock().remove(&key);
        if let Some(group) = &removed {
            info!(group = %group.name(), "group deleted");
        }
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.lock().is_empty()
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
