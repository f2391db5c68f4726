/*
 * Symbolic Values
 *
 * Opaque identity tokens for runtime values. Three singletons (NULL, TRUE,
 * FALSE) are shared across all states; every other value is minted fresh
 * at its creation site by the `ValueFactory`.
 *
 * A value's syntactic kind and its computed-from operands live in the
 * factory's side table, not in the token itself: the token stays `Copy`
 * and the relation data is written once at creation.
 */

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::shared::models::symbol::TypeId;

/// Identity token for one runtime value
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolicValue(u32);

impl SymbolicValue {
    /// The null reference
    pub const NULL: SymbolicValue = SymbolicValue(0);
    /// The boolean true value
    pub const TRUE: SymbolicValue = SymbolicValue(1);
    /// The boolean false value
    pub const FALSE: SymbolicValue = SymbolicValue(2);

    const FIRST_FRESH: u32 = 3;

    pub fn is_singleton(&self) -> bool {
        self.0 < Self::FIRST_FRESH
    }
}

impl fmt::Debug for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            SymbolicValue::NULL => write!(f, "SV_NULL"),
            SymbolicValue::TRUE => write!(f, "SV_TRUE"),
            SymbolicValue::FALSE => write!(f, "SV_FALSE"),
            SymbolicValue(n) => write!(f, "SV_{}", n),
        }
    }
}

impl fmt::Display for SymbolicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Syntactic kind of a value, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// No constraint-propagating structure
    Plain,
    /// Logical complement of its operand
    Not,
    /// `a == b`
    Equal,
    /// `a != b`
    NotEqual,
    /// Non-shortcircuit `a & b`
    And,
    /// Non-shortcircuit `a | b`
    Or,
    /// `a ^ b`
    Xor,
    /// `a instanceof T`
    InstanceOf,
    /// Result of a method invocation
    MethodResult,
    /// A thrown exception of the recorded type
    Exception(TypeId),
}

#[derive(Debug, Clone)]
struct ValueData {
    kind: ValueKind,
    operands: SmallVec<[SymbolicValue; 2]>,
}

/// Mints values and records their kind/operand provenance
#[derive(Debug)]
pub struct ValueFactory {
    next: u32,
    data: FxHashMap<SymbolicValue, ValueData>,
}

impl ValueFactory {
    pub fn new() -> Self {
        Self {
            next: SymbolicValue::FIRST_FRESH,
            data: FxHashMap::default(),
        }
    }

    /// Mint a fresh value of the given kind
    pub fn fresh(&mut self, kind: ValueKind) -> SymbolicValue {
        let sv = SymbolicValue(self.next);
        self.next += 1;
        if kind != ValueKind::Plain {
            self.data.insert(
                sv,
                ValueData {
                    kind,
                    operands: SmallVec::new(),
                },
            );
        }
        sv
    }

    /// Record operand provenance; called once at the creation site
    pub fn computed_from(&mut self, sv: SymbolicValue, operands: &[SymbolicValue]) {
        let entry = self.data.entry(sv).or_insert_with(|| ValueData {
            kind: ValueKind::Plain,
            operands: SmallVec::new(),
        });
        entry.operands = operands.iter().copied().collect();
    }

    pub fn kind(&self, sv: SymbolicValue) -> ValueKind {
        self.data.get(&sv).map(|d| d.kind).unwrap_or(ValueKind::Plain)
    }

    pub fn operands(&self, sv: SymbolicValue) -> &[SymbolicValue] {
        self.data.get(&sv).map(|d| d.operands.as_slice()).unwrap_or(&[])
    }

    pub fn is_exception(&self, sv: SymbolicValue) -> bool {
        matches!(self.kind(sv), ValueKind::Exception(_))
    }

    pub fn thrown_type(&self, sv: SymbolicValue) -> Option<TypeId> {
        match self.kind(sv) {
            ValueKind::Exception(t) => Some(t),
            _ => None,
        }
    }

    /// Number of values minted so far
    pub fn len(&self) -> usize {
        (self.next - SymbolicValue::FIRST_FRESH) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ValueFactory {
    fn default() -> Self {
        Self::new()
    }
}
