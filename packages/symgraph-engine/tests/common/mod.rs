#![allow(dead_code)] // each test binary uses a different helper subset

//! Shared fixture builder for engine integration tests.
//!
//! Assembles the inputs one method analysis needs: syntax arena, symbol
//! and type tables, CFG and liveness. Element order follows the engine's
//! operand conventions (assignments stack the value then the variable,
//! invocations stack the method select then the arguments).

use symgraph_engine::{
    BlockId, Cfg, CfgBuilder, LiveVariables, MethodContext, ParameterDeclaration, SymbolId,
    SymbolInfo, SymbolTable, Terminator, TerminatorKind, TreeArena, TreeId, TreeKind, TypeId,
    TypeInfo, TypeTable,
};
use symgraph_engine::{AssignmentOperator, InvocationReceiver, LiteralKind};

pub struct MethodFixture {
    pub arena: TreeArena,
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub cfg: Cfg,
    pub live: LiveVariables,
    pub method: SymbolId,
    pub parameters: Vec<ParameterDeclaration>,
}

impl MethodFixture {
    pub fn context(&self) -> MethodContext<'_> {
        MethodContext {
            method: self.method,
            parameters: &self.parameters,
            arena: &self.arena,
            symbols: &self.symbols,
            types: &self.types,
            cfg: &self.cfg,
            live: &self.live,
        }
    }
}

pub struct FixtureBuilder {
    pub arena: TreeArena,
    pub symbols: SymbolTable,
    pub types: TypeTable,
    pub cfg: CfgBuilder,
    method: SymbolId,
    parameters: Vec<ParameterDeclaration>,
    owner: TypeId,
}

impl FixtureBuilder {
    pub fn new(name: &str, returns_void: bool) -> Self {
        let mut types = TypeTable::new();
        let mut symbols = SymbolTable::new();
        let object = types.well_known().object;
        let owner = types.declare(TypeInfo::reference("com.acme.Sample", Some(object)));
        let method = symbols.declare(SymbolInfo::method(name, owner, false, returns_void));
        Self {
            arena: TreeArena::new(),
            symbols,
            types,
            cfg: CfgBuilder::new(),
            method,
            parameters: Vec::new(),
            owner,
        }
    }

    /// Start a second method that shares the tables of an already-built
    /// fixture, so its symbols (and recorded behaviors) stay addressable.
    pub fn continuing(previous: MethodFixture, name: &str, returns_void: bool) -> Self {
        let MethodFixture {
            mut symbols, types, ..
        } = previous;
        let owner = types.well_known().object;
        let method = symbols.declare(SymbolInfo::method(name, owner, false, returns_void));
        Self {
            arena: TreeArena::new(),
            symbols,
            types,
            cfg: CfgBuilder::new(),
            method,
            parameters: Vec::new(),
            owner,
        }
    }

    pub fn object_type(&self) -> TypeId {
        self.types.well_known().object
    }

    pub fn boolean_type(&self) -> TypeId {
        self.types.well_known().boolean
    }

    pub fn owner_type(&self) -> TypeId {
        self.owner
    }

    // ── Symbols ──────────────────────────────────────────────────────

    pub fn param(&mut self, name: &str, declared_type: Option<TypeId>) -> SymbolId {
        self.param_with(SymbolInfo::parameter(name, declared_type))
    }

    pub fn param_with(&mut self, info: SymbolInfo) -> SymbolId {
        let symbol = self.symbols.declare(info);
        let tree = self.arena.add(TreeKind::VariableDeclaration {
            symbol,
            initialized: false,
        });
        self.parameters.push(ParameterDeclaration { symbol, tree });
        symbol
    }

    pub fn local(&mut self, name: &str, declared_type: Option<TypeId>) -> SymbolId {
        self.symbols.declare(SymbolInfo::local(name, declared_type))
    }

    pub fn local_with(&mut self, info: SymbolInfo) -> SymbolId {
        self.symbols.declare(info)
    }

    pub fn method_symbol(&mut self, name: &str, owner: TypeId, returns_void: bool) -> SymbolId {
        self.symbols
            .declare(SymbolInfo::method(name, owner, false, returns_void))
    }

    // ── Blocks ───────────────────────────────────────────────────────

    pub fn block(&mut self) -> BlockId {
        self.cfg.add_block()
    }

    pub fn entry(&mut self, block: BlockId) {
        self.cfg.set_entry(block);
    }

    pub fn push(&mut self, block: BlockId, tree: TreeId) {
        self.cfg.add_element(block, tree);
    }

    pub fn succ(&mut self, block: BlockId, successor: BlockId) {
        self.cfg.add_successor(block, successor);
    }

    pub fn terminator(&mut self, block: BlockId, tree: TreeId, kind: TerminatorKind) {
        self.cfg.set_terminator(block, Terminator { tree, kind });
    }

    pub fn branches(&mut self, block: BlockId, on_true: BlockId, on_false: Option<BlockId>) {
        self.cfg.set_branches(block, on_true, on_false);
    }

    pub fn mark_exit(&mut self, block: BlockId) {
        self.cfg.mark_method_exit(block);
    }

    // ── Statement sugar ──────────────────────────────────────────────

    /// `if (<symbol>)` header: pushes the condition identifier into the
    /// block and wires the terminator. Returns the condition tree.
    pub fn if_on_symbol(
        &mut self,
        block: BlockId,
        symbol: SymbolId,
        on_true: BlockId,
        on_false: BlockId,
    ) -> TreeId {
        let if_tree = self.arena.add(TreeKind::IfStatement);
        let condition = self.arena.add_child(if_tree, TreeKind::Identifier { symbol });
        self.push(block, condition);
        self.terminator(block, if_tree, TerminatorKind::If { condition });
        self.branches(block, on_true, Some(on_false));
        condition
    }

    /// `<target> = new <class>();` as a declaration with initializer
    pub fn declare_new(&mut self, block: BlockId, target: SymbolId, class_type: TypeId) -> TreeId {
        let decl = self.arena.add(TreeKind::VariableDeclaration {
            symbol: target,
            initialized: true,
        });
        let new_tree = self.arena.add_child(
            decl,
            TreeKind::NewClass {
                arguments: 0,
                class_type,
            },
        );
        self.push(block, new_tree);
        self.push(block, decl);
        new_tree
    }

    /// `<target> = null;` expression statement
    pub fn assign_null(&mut self, block: BlockId, target: SymbolId) -> TreeId {
        let stmt = self.arena.add(TreeKind::ExpressionStatement);
        let assign = self.arena.add_child(
            stmt,
            TreeKind::Assignment {
                op: AssignmentOperator::Assign,
                target,
            },
        );
        let rhs = self.arena.add_child(assign, TreeKind::Literal(LiteralKind::Null));
        let lhs = self.arena.add_child(assign, TreeKind::Identifier { symbol: target });
        self.push(block, rhs);
        self.push(block, lhs);
        self.push(block, assign);
        assign
    }

    /// `<target> = <source>;` expression statement
    pub fn assign_symbol(&mut self, block: BlockId, target: SymbolId, source: SymbolId) -> TreeId {
        let stmt = self.arena.add(TreeKind::ExpressionStatement);
        let assign = self.arena.add_child(
            stmt,
            TreeKind::Assignment {
                op: AssignmentOperator::Assign,
                target,
            },
        );
        let rhs = self.arena.add_child(assign, TreeKind::Identifier { symbol: source });
        let lhs = self.arena.add_child(assign, TreeKind::Identifier { symbol: target });
        self.push(block, rhs);
        self.push(block, lhs);
        self.push(block, assign);
        assign
    }

    /// `<receiver>.<member>();` expression statement. Returns the member
    /// select tree (the dereference site issues anchor to).
    pub fn invoke_on(
        &mut self,
        block: BlockId,
        receiver: SymbolId,
        method: Option<SymbolId>,
        member: &str,
    ) -> (TreeId, TreeId) {
        let stmt = self.arena.add(TreeKind::ExpressionStatement);
        let invocation = self.arena.add_child(
            stmt,
            TreeKind::MethodInvocation {
                method,
                arguments: 0,
                receiver: InvocationReceiver::Expression,
                receiver_symbol: Some(receiver),
            },
        );
        let select = self.arena.add_child(
            invocation,
            TreeKind::MemberSelect {
                member: member.to_string(),
                class_literal: false,
                receiver: Some(receiver),
            },
        );
        let ident = self
            .arena
            .add_child(select, TreeKind::Identifier { symbol: receiver });
        self.push(block, ident);
        self.push(block, select);
        self.push(block, invocation);
        (select, invocation)
    }

    /// Bare call `<method>(<args>);` with identifier arguments
    pub fn call(&mut self, block: BlockId, method: SymbolId, args: &[SymbolId]) -> TreeId {
        let stmt = self.arena.add(TreeKind::ExpressionStatement);
        let invocation = self.arena.add_child(
            stmt,
            TreeKind::MethodInvocation {
                method: Some(method),
                arguments: args.len(),
                receiver: InvocationReceiver::Implicit,
                receiver_symbol: None,
            },
        );
        let select = self
            .arena
            .add_child(invocation, TreeKind::Identifier { symbol: method });
        self.push(block, select);
        for &arg in args {
            let ident = self
                .arena
                .add_child(invocation, TreeKind::Identifier { symbol: arg });
            self.push(block, ident);
        }
        self.push(block, invocation);
        invocation
    }

    /// Same call shape but nested inside a try statement
    pub fn call_in_try(
        &mut self,
        block: BlockId,
        try_tree: TreeId,
        method: SymbolId,
        args: &[SymbolId],
    ) -> TreeId {
        let stmt = self.arena.add_child(try_tree, TreeKind::ExpressionStatement);
        let invocation = self.arena.add_child(
            stmt,
            TreeKind::MethodInvocation {
                method: Some(method),
                arguments: args.len(),
                receiver: InvocationReceiver::Implicit,
                receiver_symbol: None,
            },
        );
        let select = self
            .arena
            .add_child(invocation, TreeKind::Identifier { symbol: method });
        self.push(block, select);
        for &arg in args {
            let ident = self
                .arena
                .add_child(invocation, TreeKind::Identifier { symbol: arg });
            self.push(block, ident);
        }
        self.push(block, invocation);
        invocation
    }

    pub fn build(self) -> MethodFixture {
        let cfg = self.cfg.build();
        let live = LiveVariables::analyze(&cfg, &self.arena);
        MethodFixture {
            arena: self.arena,
            symbols: self.symbols,
            types: self.types,
            cfg,
            live,
            method: self.method,
            parameters: self.parameters,
        }
    }
}
