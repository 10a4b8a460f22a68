use std::sync::atomic::{AtomicU64, Ordering};

use super::{FeedbackChild, FieldFeedbacks, Stop, When};
use crate::error::FormError;
use crate::field::{FeedbackKey, Severity};

/// Hands out feedback keys, starting at 0 and never reusing one.
#[derive(Debug, Default)]
pub struct KeyAllocator {
    next: AtomicU64,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> FeedbackKey {
        FeedbackKey(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// A feedback leaf with its key.
#[derive(Debug, Clone)]
pub struct MountedFeedback {
    pub key: FeedbackKey,
    pub when: When,
    pub severity: Severity,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub enum MountedNode {
    Feedback(MountedFeedback),
    Group(MountedGroup),
}

/// A stop scope: keyed children evaluated under one policy.
#[derive(Debug, Clone)]
pub struct MountedGroup {
    pub key: FeedbackKey,
    pub stop: Stop,
    pub children: Vec<MountedNode>,
}

/// A feedback tree mounted on a form.
#[derive(Debug, Clone)]
pub struct MountedFeedbacks {
    field: String,
    root: MountedGroup,
}

impl MountedFeedbacks {
    /// Assign keys depth-first in declaration order.
    ///
    /// Groups without a stop policy get `default_stop`.
    pub fn mount(
        tree: FieldFeedbacks,
        keys: &KeyAllocator,
        default_stop: Stop,
    ) -> Result<Self, FormError> {
        let field = tree.field.clone().ok_or(FormError::MissingField)?;
        let root = mount_group(tree, &field, keys, default_stop)?;
        Ok(Self { field, root })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Key of the root group, which identifies the whole tree.
    pub fn key(&self) -> FeedbackKey {
        self.root.key
    }

    pub fn root(&self) -> &MountedGroup {
        &self.root
    }

    /// Every leaf, in declaration order.
    pub fn feedbacks(&self) -> Vec<&MountedFeedback> {
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    pub fn has_async(&self) -> bool {
        self.feedbacks().iter().any(|f| f.when.is_async())
    }
}

fn mount_group(
    tree: FieldFeedbacks,
    field: &str,
    keys: &KeyAllocator,
    default_stop: Stop,
) -> Result<MountedGroup, FormError> {
    if let Some(nested) = tree.field.as_deref() {
        if nested != field {
            return Err(FormError::FieldMismatch {
                parent: field.to_string(),
                nested: nested.to_string(),
            });
        }
    }

    let key = keys.allocate();
    let stop = tree.stop.unwrap_or(default_stop);
    let mut children = Vec::with_capacity(tree.children.len());
    for child in tree.children {
        children.push(match child {
            FeedbackChild::Feedback(feedback) => MountedNode::Feedback(MountedFeedback {
                key: keys.allocate(),
                when: feedback.when,
                severity: feedback.severity,
                message: feedback.message,
            }),
            FeedbackChild::Group(group) => {
                MountedNode::Group(mount_group(group, field, keys, default_stop)?)
            }
        });
    }

    Ok(MountedGroup {
        key,
        stop,
        children,
    })
}

fn collect<'a>(group: &'a MountedGroup, out: &mut Vec<&'a MountedFeedback>) {
    for child in &group.children {
        match child {
            MountedNode::Feedback(feedback) => out.push(feedback),
            MountedNode::Group(group) => collect(group, out),
        }
    }
}
