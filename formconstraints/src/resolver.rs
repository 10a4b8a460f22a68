//! Evaluation of a mounted feedback tree against one input's state.
//!
//! Resolution happens in two phases. [`resolve`] walks the tree once,
//! evaluating native and synchronous conditions and starting asynchronous
//! ones, which are recorded as pending. [`Resolution::settle`] awaits the
//! pending checks and walks again with their outcomes, evaluating any node
//! a settled result newly exposes. No predicate is called twice.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use constraintdom::ValidityState;
use futures::future::{BoxFuture, join_all};

use crate::feedback::{MountedFeedback, MountedFeedbacks, MountedGroup, MountedNode, Stop, When};
use crate::field::{FeedbackKey, FieldPatch, Severity};
use crate::input::ConstraintInput;

/// Native constraint state of an input at the start of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeState {
    pub value: String,
    pub validity: ValidityState,
    pub validation_message: String,
}

impl NativeState {
    pub fn new(value: impl Into<String>, validity: ValidityState) -> Self {
        Self {
            value: value.into(),
            validity,
            validation_message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.validation_message = message.into();
        self
    }

    pub fn read(input: &dyn ConstraintInput) -> Self {
        Self {
            value: input.value(),
            validity: input.validity(),
            validation_message: input.validation_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Matched,
    Unmatched,
    Pending,
}

/// Feedback keys to show, by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shown {
    pub errors: BTreeSet<FeedbackKey>,
    pub warnings: BTreeSet<FeedbackKey>,
    pub infos: BTreeSet<FeedbackKey>,
    pub valids: BTreeSet<FeedbackKey>,
    /// Some asynchronous check has not settled.
    pub pending: bool,
}

impl Shown {
    fn insert(&mut self, severity: Severity, key: FeedbackKey) {
        match severity {
            Severity::Error => self.errors.insert(key),
            Severity::Warning => self.warnings.insert(key),
            Severity::Info => self.infos.insert(key),
            Severity::WhenValid => self.valids.insert(key),
        };
    }

    /// Union of the results of several trees for the same field.
    pub fn merge<'a>(all: impl IntoIterator<Item = &'a Shown>) -> Shown {
        let mut merged = Shown::default();
        for shown in all {
            merged.errors.extend(shown.errors.iter().copied());
            merged.warnings.extend(shown.warnings.iter().copied());
            merged.infos.extend(shown.infos.iter().copied());
            merged.valids.extend(shown.valids.iter().copied());
            merged.pending |= shown.pending;
        }
        merged
    }

    /// Patch replacing every feedback set of a field, marking it dirty.
    pub fn into_patch(self, validation_message: String) -> FieldPatch {
        FieldPatch {
            dirty: Some(true),
            errors: Some(self.errors),
            warnings: Some(self.warnings),
            infos: Some(self.infos),
            valids: Some(self.valids),
            validation_message: Some(validation_message),
            pending: Some(self.pending),
        }
    }
}

/// What a group ended up showing.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    error: bool,
    warning: bool,
    info: bool,
    pending: bool,
}

impl Scope {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.error = true,
            Severity::Warning => self.warning = true,
            Severity::Info => self.info = true,
            Severity::WhenValid => {}
        }
    }

    fn merge(&mut self, other: Scope) {
        self.error |= other.error;
        self.warning |= other.warning;
        self.info |= other.info;
        self.pending |= other.pending;
    }

    fn shows_any(&self) -> bool {
        self.error || self.warning || self.info
    }

    fn stops(&self, stop: Stop) -> bool {
        match stop {
            Stop::First => self.shows_any(),
            Stop::FirstError => self.error,
            Stop::FirstWarning => self.warning,
            Stop::FirstInfo => self.info,
            Stop::No => false,
        }
    }
}

fn walk_group(
    group: &MountedGroup,
    eval: &mut dyn FnMut(&MountedFeedback) -> Outcome,
    shown: &mut Shown,
) -> Scope {
    let mut scope = Scope::default();
    let mut valids = Vec::new();

    for child in &group.children {
        if let MountedNode::Feedback(feedback) = child {
            if matches!(feedback.when, When::Valid) {
                valids.push(feedback.key);
                continue;
            }
        }

        if scope.stops(group.stop) {
            continue;
        }

        match child {
            MountedNode::Feedback(feedback) => match eval(feedback) {
                Outcome::Matched => {
                    shown.insert(feedback.severity, feedback.key);
                    scope.record(feedback.severity);
                }
                Outcome::Pending => scope.pending = true,
                Outcome::Unmatched => {}
            },
            MountedNode::Group(nested) => scope.merge(walk_group(nested, eval, shown)),
        }
    }

    if !scope.shows_any() && !scope.pending {
        for key in valids {
            shown.insert(Severity::WhenValid, key);
        }
    }

    scope
}

struct PendingCheck {
    key: FeedbackKey,
    check: BoxFuture<'static, bool>,
}

/// Decide one feedback against `state`; asynchronous checks are started and
/// queued on `pending`.
fn evaluate(
    feedback: &MountedFeedback,
    state: &NativeState,
    pending: &mut Vec<PendingCheck>,
) -> Outcome {
    match &feedback.when {
        When::Native(constraint) => outcome(state.validity.get(*constraint)),
        When::Wildcard => outcome(!state.validity.valid()),
        When::Predicate(predicate) => outcome(predicate(&state.value)),
        When::AsyncPredicate(predicate) => {
            pending.push(PendingCheck {
                key: feedback.key,
                check: predicate(state.value.clone()),
            });
            Outcome::Pending
        }
        // Handled by the group walk.
        When::Valid => Outcome::Unmatched,
    }
}

/// Result of evaluating one tree, possibly with checks still pending.
pub struct Resolution {
    tree: Arc<MountedFeedbacks>,
    state: NativeState,
    outcomes: HashMap<FeedbackKey, Outcome>,
    pending: Vec<PendingCheck>,
    shown: Shown,
}

impl Resolution {
    pub fn tree(&self) -> &MountedFeedbacks {
        &self.tree
    }

    pub fn shown(&self) -> &Shown {
        &self.shown
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Await every pending check and recompute what is shown.
    ///
    /// Checks run concurrently. A settled result can lift a stop and expose
    /// nodes that were never reached; those are evaluated now, and any
    /// asynchronous one among them is awaited in a further round. Returns
    /// immediately when nothing is pending.
    pub async fn settle(mut self) -> Resolution {
        while !self.pending.is_empty() {
            let (keys, checks): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
                .into_iter()
                .map(|p| (p.key, p.check))
                .unzip();
            let results = join_all(checks).await;

            for (key, matched) in keys.into_iter().zip(results) {
                log::trace!("async feedback {} settled: {}", key, matched);
                self.outcomes.insert(key, outcome(matched));
            }
            self.walk();
        }
        self
    }

    /// Walk the tree, reusing recorded outcomes and evaluating the rest.
    fn walk(&mut self) {
        let Self {
            tree,
            state,
            outcomes,
            pending,
            shown,
        } = self;

        let mut next = Shown::default();
        let scope = walk_group(
            tree.root(),
            &mut |feedback: &MountedFeedback| {
                if let Some(known) = outcomes.get(&feedback.key) {
                    return *known;
                }
                let result = evaluate(feedback, state, pending);
                log::trace!("feedback {} ({:?}): {:?}", feedback.key, feedback.when, result);
                outcomes.insert(feedback.key, result);
                result
            },
            &mut next,
        );
        next.pending = scope.pending;
        *shown = next;
    }
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("field", &self.tree.field())
            .field("pending", &self.pending.len())
            .field("shown", &self.shown)
            .finish()
    }
}

fn outcome(matched: bool) -> Outcome {
    if matched {
        Outcome::Matched
    } else {
        Outcome::Unmatched
    }
}

/// Evaluate `tree` against `state`.
///
/// Native and synchronous conditions are decided here; asynchronous ones are
/// started and left pending for [`Resolution::settle`]. Nodes skipped by a
/// stop policy are not evaluated at all.
pub fn resolve(tree: Arc<MountedFeedbacks>, state: &NativeState) -> Resolution {
    let mut resolution = Resolution {
        tree,
        state: state.clone(),
        outcomes: HashMap::new(),
        pending: Vec::new(),
        shown: Shown::default(),
    };
    resolution.walk();
    resolution
}
