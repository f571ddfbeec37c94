use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Anything that can be published for inspection.
pub trait Var: Send + Sync {
    /// Value as it appears in the JSON snapshot.
    fn json(&self) -> Value;

    /// One-line human readable rendering.
    fn render(&self) -> String;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("variable {name:?} is already published")]
    Duplicate { name: String },
}

/// Named live variables. Owned by the caller and handed to whatever publishes into it,
/// so building a variable never registers it behind anyone's back.
#[derive(Default)]
pub struct Registry {
    // concurrent map so publishers and snapshot readers don't share one lock
    vars: DashMap<String, Arc<dyn Var>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { vars: DashMap::new() }
    }

    /// Publish `var` under `name` and hand the same `Arc` back to the caller.
    pub fn publish<V>(&self, name: &str, var: Arc<V>) -> Result<Arc<V>, RegistryError>
    where
        V: Var + 'static,
    {
        use dashmap::mapref::entry::Entry;

        match self.vars.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate { name: name.to_string() }),
            Entry::Vacant(slot) => {
                slot.insert(var.clone() as Arc<dyn Var>);
                debug!(name, "Published variable");
                Ok(var)
            }
        }
    }

    /// Fail with the first name that is already published.
    pub fn ensure_vacant(&self, names: &[&str]) -> Result<(), RegistryError> {
        match names.iter().find(|name| self.vars.contains_key(**name)) {
            Some(name) => Err(RegistryError::Duplicate { name: name.to_string() }),
            None => Ok(()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Var>> {
        self.vars.get(name).map(|e| Arc::clone(e.value()))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Var>> {
        let removed = self.vars.remove(name).map(|(_, v)| v);
        if removed.is_some() {
            debug!(name, "Removed variable");
        }
        removed
    }

    /// Published names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.vars.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        // Clone handles first; rendering a var may take its own lock and must not
        // happen while a shard guard is held.
        let handles: Vec<(String, Arc<dyn Var>)> =
            self.vars.iter().map(|e| (e.key().clone(), Arc::clone(e.value()))).collect();

        handles.into_iter().map(|(name, var)| (name, var.json())).collect()
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.snapshot()).to_string()
    }

    pub fn render_text(&self) -> String {
        let mut handles: Vec<(String, Arc<dyn Var>)> =
            self.vars.iter().map(|e| (e.key().clone(), Arc::clone(e.value()))).collect();
        handles.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        for (name, var) in handles {
            out.push_str(&name);
            out.push_str(": ");
            out.push_str(&var.render());
            out.push('\n');
        }
        out
    }
}
