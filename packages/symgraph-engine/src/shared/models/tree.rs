/*
 * Syntax Model
 *
 * Arena of resolved syntax nodes with parent/child links. The walker's
 * element dispatch is a single match over the closed `TreeKind` union: one
 * auditable switch instead of virtual dispatch.
 *
 * The arena is an input to the engine; parsing and name resolution happen
 * upstream. Parent links are load-bearing in two places: expression-
 * statement detection (operand stack clearing) and the search for
 * enclosing try statements during exception propagation.
 */

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::symbol::{SymbolId, TypeId};

/// Index of a node in the syntax arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TreeId(pub u32);

/// Literal classification; the engine only needs the value for booleans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Remainder,
    Plus,
    Minus,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    And,
    Xor,
    Or,
    ConditionalAnd,
    ConditionalOr,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
    BitwiseComplement,
    LogicalComplement,
    InstanceOf,
    PrefixIncrement,
    PrefixDecrement,
    PostfixIncrement,
    PostfixDecrement,
}

impl UnaryOperator {
    pub fn is_increment_or_decrement(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PrefixIncrement
                | UnaryOperator::PrefixDecrement
                | UnaryOperator::PostfixIncrement
                | UnaryOperator::PostfixDecrement
        )
    }

    pub fn is_postfix(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PostfixIncrement | UnaryOperator::PostfixDecrement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    PlusAssign,
    MinusAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    AndAssign,
    XorAssign,
    OrAssign,
}

impl AssignmentOperator {
    pub fn is_plain(&self) -> bool {
        matches!(self, AssignmentOperator::Assign)
    }
}

/// How a method invocation names its receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationReceiver {
    /// Bare name: `run()`
    Implicit,
    /// Explicit `this`/`super` receiver
    ThisOrSuper,
    /// Any other receiver expression
    Expression,
}

impl InvocationReceiver {
    /// Local invocations havoc the enclosing instance's fields
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            InvocationReceiver::Implicit | InvocationReceiver::ThisOrSuper
        )
    }
}

/// Closed union of node kinds.
///
/// The first group are the CFG element kinds the walker interprets; the
/// second group are statement/structural kinds that only ever appear as
/// parents or terminators. Assignment targets are restricted to resolved
/// identifiers; array and field targets are not modeled.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeKind {
    Literal(LiteralKind),
    Identifier {
        symbol: SymbolId,
    },
    MemberSelect {
        member: String,
        /// `T.class` selects pop nothing
        class_literal: bool,
        receiver: Option<SymbolId>,
    },
    ArrayAccess,
    NewArray {
        initializers: usize,
    },
    NewClass {
        arguments: usize,
        class_type: TypeId,
    },
    Binary {
        op: BinaryOperator,
    },
    Unary {
        op: UnaryOperator,
    },
    Assignment {
        op: AssignmentOperator,
        target: SymbolId,
    },
    TypeCast {
        target_type: TypeId,
    },
    VariableDeclaration {
        symbol: SymbolId,
        initialized: bool,
    },
    MethodInvocation {
        method: Option<SymbolId>,
        arguments: usize,
        receiver: InvocationReceiver,
        receiver_symbol: Option<SymbolId>,
    },
    Lambda,
    MethodReference,

    // Structural kinds: parents and terminator anchors, never elements.
    ExpressionStatement,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    ForEachStatement,
    ConditionalExpression,
    ReturnStatement,
    ThrowStatement,
    SynchronizedStatement,
    TryStatement,
    Block,
    MethodDeclaration,
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub kind: TreeKind,
    pub parent: Option<TreeId>,
    pub children: SmallVec<[TreeId; 2]>,
}

/// Append-only arena of syntax nodes
#[derive(Debug, Clone, Default)]
pub struct TreeArena {
    nodes: Vec<TreeNode>,
}

impl TreeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node (no parent)
    pub fn add(&mut self, kind: TreeKind) -> TreeId {
        let id = TreeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            kind,
            parent: None,
            children: SmallVec::new(),
        });
        id
    }

    /// Add a node under `parent`, appending to its child list
    pub fn add_child(&mut self, parent: TreeId, kind: TreeKind) -> TreeId {
        let id = TreeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            kind,
            parent: Some(parent),
            children: SmallVec::new(),
        });
        self.nodes[parent.0 as usize].children.push(id);
        id
    }

    pub fn kind(&self, id: TreeId) -> &TreeKind {
        &self.nodes[id.0 as usize].kind
    }

    pub fn parent(&self, id: TreeId) -> Option<TreeId> {
        self.nodes[id.0 as usize].parent
    }

    pub fn parent_kind(&self, id: TreeId) -> Option<&TreeKind> {
        self.parent(id).map(|p| self.kind(p))
    }

    pub fn children(&self, id: TreeId) -> &[TreeId] {
        &self.nodes[id.0 as usize].children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Symbol of an identifier node, if the node is one
    pub fn identifier_symbol(&self, id: TreeId) -> Option<SymbolId> {
        match self.kind(id) {
            TreeKind::Identifier { symbol } => Some(*symbol),
            _ => None,
        }
    }

    /// True when the node is the identifier a plain assignment writes
    pub fn is_assignment_target(&self, id: TreeId) -> bool {
        let TreeKind::Identifier { symbol } = self.kind(id) else {
            return false;
        };
        match self.parent_kind(id) {
            Some(TreeKind::Assignment { op, target }) => op.is_plain() && target == symbol,
            _ => false,
        }
    }

    pub fn is_boolean_literal(&self, id: TreeId) -> bool {
        matches!(self.kind(id), TreeKind::Literal(LiteralKind::Boolean(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_child_links() {
        let mut arena = TreeArena::new();
        let stmt = arena.add(TreeKind::ExpressionStatement);
        let assign = arena.add_child(
            stmt,
            TreeKind::Assignment {
                op: AssignmentOperator::Assign,
                target: SymbolId(0),
            },
        );
        let lhs = arena.add_child(assign, TreeKind::Identifier { symbol: SymbolId(0) });
        let rhs = arena.add_child(assign, TreeKind::Literal(LiteralKind::Null));

        assert_eq!(arena.parent(assign), Some(stmt));
        assert_eq!(arena.children(assign), &[lhs, rhs]);
        assert!(matches!(
            arena.parent_kind(assign),
            Some(TreeKind::ExpressionStatement)
        ));
    }

    #[test]
    fn test_assignment_target_detection() {
        let mut arena = TreeArena::new();
        let assign = arena.add(TreeKind::Assignment {
            op: AssignmentOperator::Assign,
            target: SymbolId(1),
        });
        let lhs = arena.add_child(assign, TreeKind::Identifier { symbol: SymbolId(1) });
        let rhs = arena.add_child(assign, TreeKind::Identifier { symbol: SymbolId(2) });

        assert!(arena.is_assignment_target(lhs));
        assert!(!arena.is_assignment_target(rhs));
    }

    #[test]
    fn test_compound_assignment_target_still_reads() {
        let mut arena = TreeArena::new();
        let assign = arena.add(TreeKind::Assignment {
            op: AssignmentOperator::PlusAssign,
            target: SymbolId(1),
        });
        let lhs = arena.add_child(assign, TreeKind::Identifier { symbol: SymbolId(1) });

        assert!(!arena.is_assignment_target(lhs));
    }
}
