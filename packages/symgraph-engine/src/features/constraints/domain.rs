/*
 * Constraint Domain
 *
 * Tagged facts attachable to symbolic values. A state stores at most one
 * constraint per (value, kind). Nullness and boolean are intrinsic kinds;
 * checkers register additional kinds under their own identity, optionally
 * with a custom meet function.
 *
 * Merging two constraints of one kind applies the domain's meet; a bottom
 * meet makes the state infeasible.
 */

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::shared::models::tree::TreeId;

/// Stable identity of a checker, also used to tag checker-private
/// constraint kinds and reported issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CheckId {
    ConditionAlwaysTrueOrFalse,
    NullDereference,
    UnclosedResources,
    LocksNotUnlocked,
    NonNullSetToNull,
    NoWayOutLoop,
    Custom(&'static str),
}

impl CheckId {
    pub fn rule_key(&self) -> &'static str {
        match self {
            CheckId::ConditionAlwaysTrueOrFalse => "S2583",
            CheckId::NullDereference => "S2259",
            CheckId::UnclosedResources => "S2095",
            CheckId::LocksNotUnlocked => "S2222",
            CheckId::NonNullSetToNull => "S2637",
            CheckId::NoWayOutLoop => "S2189",
            CheckId::Custom(key) => key,
        }
    }
}

/// Kind tag; a state keeps at most one constraint per kind per value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    Nullness,
    Boolean,
    Checker(CheckId),
}

/// One fact about a symbolic value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// The value is the null reference; provenance points at the site
    /// that introduced the fact, for issue flows.
    Null { provenance: Option<TreeId> },
    NotNull,
    Boolean(bool),
    /// Checker-private fact: an opaque small state plus an origin site
    Checker {
        check: CheckId,
        value: u8,
        origin: Option<TreeId>,
    },
}

impl Constraint {
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Null { .. } | Constraint::NotNull => ConstraintKind::Nullness,
            Constraint::Boolean(_) => ConstraintKind::Boolean,
            Constraint::Checker { check, .. } => ConstraintKind::Checker(*check),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Constraint::Null { .. })
    }
}

/// Meet of two same-kind checker constraints; `None` is bottom
pub type MeetFn = fn(&Constraint, &Constraint) -> Option<Constraint>;

/// Dispatches constraint meets; checkers register custom kinds here
#[derive(Debug, Default)]
pub struct ConstraintDomain {
    custom: FxHashMap<CheckId, MeetFn>,
}

impl ConstraintDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a meet function for a checker-private kind. Without a
    /// registration, same-kind checker constraints meet by equality.
    pub fn register(&mut self, check: CheckId, meet: MeetFn) {
        self.custom.insert(check, meet);
    }

    /// Meet two constraints of the same kind; `None` means infeasible
    pub fn meet(&self, a: &Constraint, b: &Constraint) -> Option<Constraint> {
        debug_assert_eq!(a.kind(), b.kind(), "meet across constraint kinds");
        match (a, b) {
            (Constraint::Null { provenance: p }, Constraint::Null { provenance: q }) => {
                Some(Constraint::Null {
                    provenance: p.or(*q),
                })
            }
            (Constraint::NotNull, Constraint::NotNull) => Some(Constraint::NotNull),
            (Constraint::Null { .. }, Constraint::NotNull)
            | (Constraint::NotNull, Constraint::Null { .. }) => None,
            (Constraint::Boolean(x), Constraint::Boolean(y)) => {
                if x == y {
                    Some(Constraint::Boolean(*x))
                } else {
                    None
                }
            }
            (Constraint::Checker { check, .. }, Constraint::Checker { .. }) => {
                match self.custom.get(check) {
                    Some(meet) => meet(a, b),
                    None => {
                        if a == b {
                            Some(a.clone())
                        } else {
                            None
                        }
                    }
                }
            }
            _ => None,
        }
    }
}

/// The constraints of one symbolic value, at most one per kind,
/// kept sorted by kind for canonical equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Constraints(SmallVec<[Constraint; 2]>);

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(constraint: Constraint) -> Self {
        Self(SmallVec::from_iter([constraint]))
    }

    pub fn get(&self, kind: ConstraintKind) -> Option<&Constraint> {
        self.0.iter().find(|c| c.kind() == kind)
    }

    /// Replace-or-insert the constraint of its kind
    pub fn with(&self, constraint: Constraint) -> Self {
        let mut items: SmallVec<[Constraint; 2]> = self
            .0
            .iter()
            .filter(|c| c.kind() != constraint.kind())
            .cloned()
            .collect();
        items.push(constraint);
        items.sort_by_key(|c| c.kind());
        Self(items)
    }

    /// Meet the constraint into the set. Returns the new set plus a flag
    /// telling whether anything changed; `None` means the meet is bottom.
    pub fn meet_with(
        &self,
        constraint: Constraint,
        domain: &ConstraintDomain,
    ) -> Option<(Self, bool)> {
        match self.get(constraint.kind()) {
            None => Some((self.with(constraint), true)),
            Some(existing) => {
                let merged = domain.meet(existing, &constraint)?;
                if &merged == existing {
                    Some((self.clone(), false))
                } else {
                    Some((self.with(merged), true))
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when any checker-private fact is present; such entries are
    /// path obligations and survive constraint cleanup.
    pub fn has_checker_fact(&self) -> bool {
        self.0
            .iter()
            .any(|c| matches!(c.kind(), ConstraintKind::Checker(_)))
    }
}
