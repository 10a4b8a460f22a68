//! Registry of fields and their current validation results.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::FormError;
use crate::events::{FormEmitter, FormEvent, emit};
use crate::field::{Field, FieldPatch, Fields};

/// Identity of one validation run of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunId(pub u64);

#[derive(Debug)]
struct FieldEntry {
    field: Field,
    /// Mounted feedback trees for this name.
    mounts: usize,
    /// Latest run sequence number.
    run: u64,
}

/// Authoritative mapping of field name to [`Field`].
///
/// Every mutation is synchronous. Only `FieldAdded`/`FieldRemoved` are
/// emitted from here; validation events belong to the form.
#[derive(Debug)]
pub struct FieldsStore {
    inner: RwLock<BTreeMap<String, FieldEntry>>,
    emitter: Arc<FormEmitter>,
}

impl FieldsStore {
    pub fn new(emitter: Arc<FormEmitter>) -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            emitter,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<Field> {
        self.read().get(name).map(|e| e.field.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn fields(&self) -> Fields {
        Fields(
            self.read()
                .iter()
                .map(|(name, e)| (name.clone(), e.field.clone()))
                .collect(),
        )
    }

    /// Register one mounted feedback tree for `name`.
    ///
    /// The field is created empty on the first registration, which emits
    /// `FieldAdded`.
    pub fn add_field(&self, name: &str) -> Result<(), FormError> {
        let created = {
            let mut map = self.write();
            match map.get_mut(name) {
                Some(entry) => {
                    entry.mounts += 1;
                    false
                }
                None => {
                    map.insert(
                        name.to_string(),
                        FieldEntry {
                            field: Field::new(name),
                            mounts: 1,
                            run: 0,
                        },
                    );
                    true
                }
            }
        };

        if created {
            log::debug!("FieldsStore: added '{}'", name);
            emit(&self.emitter, FormEvent::FieldAdded(name.to_string()))?;
        }
        Ok(())
    }

    /// Unregister one mounted feedback tree for `name`.
    ///
    /// The field is deleted with its last tree, which emits `FieldRemoved`.
    pub fn remove_field(&self, name: &str) -> Result<(), FormError> {
        let removed = {
            let mut map = self.write();
            let entry = map
                .get_mut(name)
                .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
            entry.mounts = entry.mounts.saturating_sub(1);
            if entry.mounts == 0 {
                map.remove(name);
                true
            } else {
                false
            }
        };

        if removed {
            log::debug!("FieldsStore: removed '{}'", name);
            emit(&self.emitter, FormEvent::FieldRemoved(name.to_string()))?;
        }
        Ok(())
    }

    /// Merge `patch` into the field. Emits nothing.
    pub fn update_field(&self, name: &str, patch: FieldPatch) -> Result<Field, FormError> {
        let mut map = self.write();
        let entry = map
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        entry.field.apply(patch);
        Ok(entry.field.clone())
    }

    /// Apply `patch` only if `run` is still the latest run of the field.
    ///
    /// Returns `None` when the run was superseded or the field is gone.
    pub fn update_field_for_run(&self, name: &str, run: RunId, patch: FieldPatch) -> Option<Field> {
        let mut map = self.write();
        let entry = map.get_mut(name)?;
        if entry.run != run.0 {
            return None;
        }
        entry.field.apply(patch);
        Some(entry.field.clone())
    }

    /// Start a new run for the field, superseding any run in flight.
    pub fn begin_run(&self, name: &str) -> Result<RunId, FormError> {
        let mut map = self.write();
        let entry = map
            .get_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;
        entry.run += 1;
        Ok(RunId(entry.run))
    }

    pub fn is_current(&self, name: &str, run: RunId) -> bool {
        self.read().get(name).is_some_and(|e| e.run == run.0)
    }

    /// Clear the results of `names` (all fields when `None`) and supersede
    /// their runs in flight.
    pub fn clear_fields(&self, names: Option<&[String]>) -> Result<(), FormError> {
        let mut map = self.write();
        if let Some(names) = names {
            if let Some(unknown) = names.iter().find(|n| !map.contains_key(n.as_str())) {
                return Err(FormError::UnknownField(unknown.clone()));
            }
        }
        for (name, entry) in map.iter_mut() {
            if names.is_none_or(|names| names.contains(name)) {
                entry.field.clear();
                entry.run += 1;
            }
        }
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, FieldEntry>> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, FieldEntry>> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }
}
