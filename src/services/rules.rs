//! Injection rule loader
//!
//! Reads the rule from settings storage. Saving always reloads from storage,
//! so the live rule is exactly what was persisted.

use crate::models::{InjectionRule, RuleKind};
use crate::services::store::{KeyValueStore, KEY_PARAMETER_NAME, KEY_RULE_TYPE};
use std::sync::{Arc, RwLock};
use tracing::{error, info, warn};

pub struct RuleStore {
    storage: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Arc<InjectionRule>>>,
}

impl RuleStore {
    /// Create the loader and load the stored rule, if any
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let store = Self {
            storage,
            current: RwLock::new(None),
        };
        store.reload();
        store
    }

    /// Read the rule from storage
    ///
    /// Returns `None` when either key is absent or blank, or the kind is unknown.
    pub fn load(&self) -> Option<InjectionRule> {
        let kind = self.storage.get(KEY_RULE_TYPE).unwrap_or_default();
        let name = self.storage.get(KEY_PARAMETER_NAME).unwrap_or_default();

        if kind.trim().is_empty() || name.trim().is_empty() {
            error!("Configuration not found in settings");
            return None;
        }

        let kind = match kind.trim().to_uppercase().parse::<RuleKind>() {
            Ok(kind) => kind,
            Err(e) => {
                error!("Invalid configuration format in settings: {}", e);
                return None;
            }
        };

        match InjectionRule::new(kind, name.trim()) {
            Ok(rule) => {
                info!("Loaded configuration: rule type {}, parameter '{}'", rule.kind(), rule.field_name());
                if let Some(matcher) = rule.matcher() {
                    info!("Initialized replacement pattern: {}", matcher.as_str());
                }
                Some(rule)
            }
            Err(e) => {
                error!("Invalid configuration in settings: {}", e);
                None
            }
        }
    }

    /// Persist a rule (kind uppercased, name trimmed) and reload it
    pub fn save(&self, kind: &str, field_name: &str) -> Option<Arc<InjectionRule>> {
        let kind = kind.trim().to_uppercase();
        let field_name = field_name.trim();

        self.storage.put(KEY_RULE_TYPE, &kind);
        self.storage.put(KEY_PARAMETER_NAME, field_name);
        info!("Configuration saved: rule type {}, parameter '{}'", kind, field_name);

        let reloaded = self.reload();
        if reloaded.is_none() {
            warn!("Saved configuration did not load back as a valid rule");
        }
        reloaded
    }

    /// Live rule used by the session action
    pub fn current(&self) -> Option<Arc<InjectionRule>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn reload(&self) -> Option<Arc<InjectionRule>> {
        let loaded = self.load().map(Arc::new);
        match self.current.write() {
            Ok(mut guard) => *guard = loaded.clone(),
            Err(poisoned) => *poisoned.into_inner() = loaded.clone(),
        }
        loaded
    }
}
