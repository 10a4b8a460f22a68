//! The form controller.
//!
//! [`FormWithConstraints`] owns the inputs, the mounted feedback trees and
//! the fields store. It runs validations, keeps each field's latest run
//! authoritative, and tells listeners what happened.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use futures::future::join_all;

use crate::config::FormConfig;
use crate::error::FormError;
use crate::events::{FormEmitter, FormEvent, FormEventKind, FormListener, emit};
use crate::feedback::{FieldFeedbacks, KeyAllocator, MountedFeedbacks, When};
use crate::field::{FeedbackKey, Field, Fields, Severity};
use crate::input::ConstraintInput;
use crate::resolver::{NativeState, Resolution, Shown, resolve};
use crate::store::FieldsStore;

/// Identifies a mounted feedback tree; pass it back to unmount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbacksHandle {
    key: FeedbackKey,
    field: String,
}

impl FeedbacksHandle {
    pub fn key(&self) -> FeedbackKey {
        self.key
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

/// A feedback currently shown for a field, with its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownFeedback {
    pub key: FeedbackKey,
    pub severity: Severity,
    /// The feedback's own message; native and `*` feedbacks without one
    /// display the input's validation message.
    pub message: String,
}

struct FormInner {
    config: FormConfig,
    emitter: Arc<FormEmitter>,
    store: FieldsStore,
    keys: KeyAllocator,
    inputs: RwLock<HashMap<String, Arc<dyn ConstraintInput>>>,
    feedbacks: RwLock<BTreeMap<FeedbackKey, Arc<MountedFeedbacks>>>,
}

/// Validates fields against their feedback trees.
///
/// Cheap to clone; clones drive the same form.
///
/// # Example
///
/// ```ignore
/// let form = FormWithConstraints::new();
/// form.mount_input(InputElement::new("username").required(true))?;
/// form.mount_feedbacks(
///     FieldFeedbacks::new("username").feedback(Feedback::when("valueMissing")?),
/// )?;
///
/// form.validate_form().await?;
/// if form.is_valid() {
///     // submit
/// }
/// ```
#[derive(Clone)]
pub struct FormWithConstraints {
    inner: Arc<FormInner>,
}

impl FormWithConstraints {
    pub fn new() -> Self {
        Self::with_config(FormConfig::default())
    }

    pub fn with_config(config: FormConfig) -> Self {
        let emitter = Arc::new(FormEmitter::new());
        Self {
            inner: Arc::new(FormInner {
                config,
                store: FieldsStore::new(Arc::clone(&emitter)),
                emitter,
                keys: KeyAllocator::new(),
                inputs: RwLock::new(HashMap::new()),
                feedbacks: RwLock::new(BTreeMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    fn label(&self) -> &str {
        self.inner.config.name.as_deref().unwrap_or("form")
    }

    // =========================================================================
    // Mounting
    // =========================================================================

    /// Register an input. Names must be unique within the form.
    pub fn mount_input(&self, input: impl ConstraintInput + 'static) -> Result<(), FormError> {
        let name = input.name().to_string();
        let mut inputs = self.inner.inputs.write().unwrap_or_else(|p| p.into_inner());
        if inputs.contains_key(&name) {
            log::warn!("{}: input '{}' mounted twice", self.label(), name);
            return Err(FormError::DuplicateInput(name));
        }
        log::debug!("{}: mounted input '{}'", self.label(), name);
        inputs.insert(name, Arc::new(input));
        Ok(())
    }

    pub fn unmount_input(&self, name: &str) -> Result<(), FormError> {
        self.inner
            .inputs
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| FormError::NoInput(name.to_string()))
    }

    pub fn input(&self, name: &str) -> Option<Arc<dyn ConstraintInput>> {
        self.inner
            .inputs
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .cloned()
    }

    /// Mount a feedback tree, assigning its keys.
    ///
    /// The first tree mounted for a field creates it and emits `FieldAdded`.
    pub fn mount_feedbacks(&self, tree: FieldFeedbacks) -> Result<FeedbacksHandle, FormError> {
        let mounted = MountedFeedbacks::mount(tree, &self.inner.keys, self.inner.config.default_stop)?;
        let handle = FeedbacksHandle {
            key: mounted.key(),
            field: mounted.field().to_string(),
        };
        let has_async = mounted.has_async();

        self.inner
            .feedbacks
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(handle.key, Arc::new(mounted));
        log::debug!(
            "{}: mounted feedbacks {} for '{}' (async: {})",
            self.label(),
            handle.key,
            handle.field,
            has_async
        );

        self.inner.store.add_field(&handle.field)?;
        Ok(handle)
    }

    /// Unmount a feedback tree. The last tree of a field removes the field
    /// and emits `FieldRemoved`.
    pub fn unmount_feedbacks(&self, handle: &FeedbacksHandle) -> Result<(), FormError> {
        self.inner
            .feedbacks
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(&handle.key)
            .ok_or(FormError::NotMounted(handle.key.0))?;
        log::debug!(
            "{}: unmounted feedbacks {} for '{}'",
            self.label(),
            handle.key,
            handle.field
        );

        self.inner.store.remove_field(&handle.field)
    }

    fn trees_for(&self, name: &str) -> Vec<Arc<MountedFeedbacks>> {
        self.inner
            .feedbacks
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .values()
            .filter(|tree| tree.field() == name)
            .cloned()
            .collect()
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_listener(&self, event: FormEventKind, listener: FormListener) -> Result<(), FormError> {
        Ok(self.inner.emitter.add_listener(event, listener)?)
    }

    pub fn remove_listener(
        &self,
        event: FormEventKind,
        listener: &FormListener,
    ) -> Result<(), FormError> {
        Ok(self.inner.emitter.remove_listener(&event, listener)?)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Names to validate: `names` deduplicated, or every field when empty.
    ///
    /// Fails before anything runs if a name has no feedbacks or no input.
    fn targets<I, S>(&self, names: I) -> Result<Vec<String>, FormError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut targets: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !targets.iter().any(|t| t == name) {
                targets.push(name.to_string());
            }
        }
        if targets.is_empty() {
            targets = self.inner.store.names();
        }

        let inputs = self.inner.inputs.read().unwrap_or_else(|p| p.into_inner());
        for name in &targets {
            if !self.inner.store.contains(name) {
                log::warn!("{}: no feedbacks for '{}'", self.label(), name);
                return Err(FormError::UnknownField(name.clone()));
            }
            if !inputs.contains_key(name) {
                log::warn!("{}: no input named '{}'", self.label(), name);
                return Err(FormError::NoInput(name.clone()));
            }
        }
        Ok(targets)
    }

    /// Validate the named fields, or every field when `names` is empty.
    ///
    /// Fields run concurrently. Each field's synchronous results reach the
    /// store before its asynchronous checks are awaited. Returns the fields
    /// whose run completed as their latest run; superseded runs are dropped
    /// without touching the store.
    pub async fn validate_fields<I, S>(&self, names: I) -> Result<Vec<Field>, FormError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = self.targets(names)?;
        self.run_all(targets).await
    }

    /// Validate one field. `None` when the run was superseded.
    pub async fn validate_field(&self, name: &str) -> Result<Option<Field>, FormError> {
        let mut fields = self.validate_fields([name]).await?;
        Ok(fields.pop())
    }

    /// Validate every field; what a form submission runs.
    pub async fn validate_form(&self) -> Result<Vec<Field>, FormError> {
        self.validate_fields(std::iter::empty::<&str>()).await
    }

    /// Like [`validate_fields`](Self::validate_fields), skipping fields that
    /// were already validated.
    pub async fn validate_fields_without_feedback<I, S>(
        &self,
        names: I,
    ) -> Result<Vec<Field>, FormError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = self
            .targets(names)?
            .into_iter()
            .filter(|name| self.inner.store.get_field(name).is_some_and(|f| !f.dirty))
            .collect();
        self.run_all(targets).await
    }

    async fn run_all(&self, targets: Vec<String>) -> Result<Vec<Field>, FormError> {
        log::debug!("{}: validating {:?}", self.label(), targets);
        let results = join_all(targets.into_iter().map(|name| self.validate_one(name))).await;

        let mut fields = Vec::with_capacity(results.len());
        for result in results {
            if let Some(field) = result? {
                fields.push(field);
            }
        }
        Ok(fields)
    }

    async fn validate_one(&self, name: String) -> Result<Option<Field>, FormError> {
        let inner = &self.inner;

        emit(&inner.emitter, FormEvent::FieldWillValidate(name.clone()))?;
        let run = inner.store.begin_run(&name)?;
        let input = self
            .input(&name)
            .ok_or_else(|| FormError::NoInput(name.clone()))?;
        let state = NativeState::read(input.as_ref());

        let resolutions: Vec<Resolution> = self
            .trees_for(&name)
            .into_iter()
            .map(|tree| resolve(tree, &state))
            .collect();
        let shown = Shown::merge(resolutions.iter().map(Resolution::shown));
        let pending = shown.pending;

        let patch = shown.into_patch(state.validation_message.clone());
        let Some(mut field) = inner.store.update_field_for_run(&name, run, patch) else {
            return Ok(None);
        };

        if pending {
            log::debug!(
                "{}: '{}' run {} awaiting async feedbacks",
                self.label(),
                name,
                run.0
            );
            let settled = join_all(resolutions.into_iter().map(Resolution::settle)).await;
            let shown = Shown::merge(settled.iter().map(Resolution::shown));

            match inner
                .store
                .update_field_for_run(&name, run, shown.into_patch(state.validation_message))
            {
                Some(updated) => field = updated,
                None => {
                    log::debug!(
                        "{}: discarding superseded run {} of '{}'",
                        self.label(),
                        run.0,
                        name
                    );
                    return Ok(None);
                }
            }
        }

        log::debug!("{}: validated {}", self.label(), field);
        emit(&inner.emitter, FormEvent::FieldDidValidate(field.clone()))?;
        Ok(Some(field))
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// True when no field shows an error.
    ///
    /// A field that was never validated has no errors and so counts as
    /// valid; call [`validate_form`](Self::validate_form) first to get the
    /// answer a submission would.
    pub fn is_valid(&self) -> bool {
        self.inner.store.fields().iter().all(Field::is_valid)
    }

    /// True when some field shows an error, warning or info.
    pub fn has_feedbacks(&self) -> bool {
        self.inner.store.fields().iter().any(Field::has_feedbacks)
    }

    pub fn fields(&self) -> Fields {
        self.inner.store.fields()
    }

    pub fn get_field(&self, name: &str) -> Option<Field> {
        self.inner.store.get_field(name)
    }

    /// Feedbacks shown for `name`, in declaration order.
    pub fn shown_feedbacks(&self, name: &str) -> Result<Vec<ShownFeedback>, FormError> {
        let field = self
            .get_field(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?;

        let mut shown = Vec::new();
        for tree in self.trees_for(name) {
            for feedback in tree.feedbacks() {
                if !field.keys(feedback.severity).contains(&feedback.key) {
                    continue;
                }
                let message = match (&feedback.message, &feedback.when) {
                    (Some(message), _) => message.clone(),
                    (None, When::Native(_) | When::Wildcard) => field.validation_message.clone(),
                    (None, _) => String::new(),
                };
                shown.push(ShownFeedback {
                    key: feedback.key,
                    severity: feedback.severity,
                    message,
                });
            }
        }
        shown.sort_by_key(|f| f.key);
        Ok(shown)
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Clear every field's results and emit `Reset` once.
    ///
    /// Fields stay registered; runs in flight are superseded.
    pub fn reset(&self) -> Result<(), FormError> {
        self.inner.store.clear_fields(None)?;
        log::debug!("{}: reset", self.label());
        emit(&self.inner.emitter, FormEvent::Reset)?;
        Ok(())
    }

    /// Clear the named fields, or every field when `names` is empty.
    /// Emits nothing.
    pub fn reset_fields<I, S>(&self, names: I) -> Result<Vec<Field>, FormError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names.into_iter().map(|n| n.as_ref().to_string()).collect();
        if names.is_empty() {
            self.inner.store.clear_fields(None)?;
            return Ok(self.fields().iter().cloned().collect());
        }

        self.inner.store.clear_fields(Some(&names))?;
        Ok(names.iter().filter_map(|name| self.get_field(name)).collect())
    }
}

impl Default for FormWithConstraints {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormWithConstraints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormWithConstraints")
            .field("name", &self.inner.config.name)
            .field("fields", &self.inner.store.names())
            .finish()
    }
}
