/*
 * Issue Sink
 *
 * Collects checker reports. The same (check, tree, message) triple is
 * recorded once even when several paths rediscover it.
 */

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::features::constraints::domain::CheckId;
use crate::shared::models::tree::TreeId;

/// One step of an issue's explanation flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowStep {
    pub tree: TreeId,
    pub message: String,
}

/// A reported finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub check: CheckId,
    pub tree: TreeId,
    pub message: String,
    pub flow: Vec<FlowStep>,
}

#[derive(Debug, Default)]
pub struct IssueSink {
    issues: Vec<Issue>,
    seen: FxHashSet<(CheckId, TreeId, String)>,
}

impl IssueSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue; returns false when it was already reported
    pub fn report(&mut self, issue: Issue) -> bool {
        let key = (issue.check, issue.tree, issue.message.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.issues.push(issue);
        true
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn drain(&mut self) -> Vec<Issue> {
        self.seen.clear();
        std::mem::take(&mut self.issues)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
