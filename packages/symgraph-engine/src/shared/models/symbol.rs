/*
 * Symbol & Type Oracle
 *
 * The engine never resolves names itself; it consumes resolved symbol and
 * type information through these tables. The oracle answers exactly the
 * questions the walker and checkers ask:
 * - symbol classification (local, parameter, field, method, unknown)
 * - declared types, primitive/reference kinds, supertype chains
 * - annotations by fully-qualified name (Nonnull, Nullable, CheckForNull)
 * - capability flags consumed by checkers (closeable, lock)
 */

use serde::{Deserialize, Serialize};

/// Identity of a resolved symbol (variable, parameter, field, method)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

/// Identity of a resolved type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

/// Annotation FQN marking a value that is never null
pub const NONNULL_ANNOTATION: &str = "javax.annotation.Nonnull";
/// Annotation FQN marking a value that may be null
pub const NULLABLE_ANNOTATION: &str = "javax.annotation.Nullable";
/// Annotation FQN marking a return/parameter that callers must null-check
pub const CHECK_FOR_NULL_ANNOTATION: &str = "javax.annotation.CheckForNull";

/// Primitive vs. reference classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Primitive,
    Reference,
}

/// One entry of the type table
#[derive(Debug, Clone)]
pub struct TypeInfo {
    pub fqn: String,
    pub kind: TypeKind,
    pub supertype: Option<TypeId>,
    /// Implements the analyzed language's closeable-resource protocol
    pub closeable: bool,
    /// Implements the analyzed language's lock protocol
    pub lock: bool,
}

impl TypeInfo {
    pub fn reference(fqn: impl Into<String>, supertype: Option<TypeId>) -> Self {
        Self {
            fqn: fqn.into(),
            kind: TypeKind::Reference,
            supertype,
            closeable: false,
            lock: false,
        }
    }

    pub fn primitive(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            kind: TypeKind::Primitive,
            supertype: None,
            closeable: false,
            lock: false,
        }
    }

    pub fn with_closeable(mut self, closeable: bool) -> Self {
        self.closeable = closeable;
        self
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }
}

/// Type identities the engine itself needs to name
#[derive(Debug, Clone, Copy)]
pub struct WellKnownTypes {
    pub object: TypeId,
    pub boolean: TypeId,
    pub null_pointer_exception: TypeId,
}

/// Immutable-for-the-engine view of the resolved types of one compilation
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: Vec<TypeInfo>,
    well_known: WellKnownTypes,
}

impl TypeTable {
    /// Create a table pre-seeded with the types the engine synthesizes
    pub fn new() -> Self {
        let mut table = Self {
            types: Vec::new(),
            well_known: WellKnownTypes {
                object: TypeId(0),
                boolean: TypeId(0),
                null_pointer_exception: TypeId(0),
            },
        };
        let object = table.declare(TypeInfo::reference("java.lang.Object", None));
        let boolean = table.declare(TypeInfo::primitive("boolean"));
        let npe = table.declare(TypeInfo::reference(
            "java.lang.NullPointerException",
            Some(object),
        ));
        table.well_known = WellKnownTypes {
            object,
            boolean,
            null_pointer_exception: npe,
        };
        table
    }

    pub fn declare(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(info);
        id
    }

    pub fn info(&self, id: TypeId) -> &TypeInfo {
        &self.types[id.0 as usize]
    }

    pub fn fqn(&self, id: TypeId) -> &str {
        &self.info(id).fqn
    }

    /// Last segment of the FQN, used in issue messages
    pub fn simple_name(&self, id: TypeId) -> &str {
        let fqn = self.fqn(id);
        fqn.rsplit('.').next().unwrap_or(fqn)
    }

    pub fn is_primitive(&self, id: TypeId) -> bool {
        self.info(id).kind == TypeKind::Primitive
    }

    /// Walk the supertype chain
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        let mut current = Some(sub);
        while let Some(id) = current {
            if id == sup {
                return true;
            }
            current = self.info(id).supertype;
        }
        false
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Symbol classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    LocalVariable,
    Parameter,
    Field,
    Method {
        owner: TypeId,
        is_constructor: bool,
        returns_void: bool,
    },
    /// Unresolved symbol; bindings to unknown symbols are dropped
    Unknown,
}

/// One entry of the symbol table
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub kind: SymbolKind,
    pub declared_type: Option<TypeId>,
    /// Annotation FQNs attached to the declaration
    pub annotations: Vec<String>,
}

impl SymbolInfo {
    pub fn local(name: impl Into<String>, declared_type: Option<TypeId>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::LocalVariable,
            declared_type,
            annotations: Vec::new(),
        }
    }

    pub fn parameter(name: impl Into<String>, declared_type: Option<TypeId>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            declared_type,
            annotations: Vec::new(),
        }
    }

    pub fn field(name: impl Into<String>, declared_type: Option<TypeId>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Field,
            declared_type,
            annotations: Vec::new(),
        }
    }

    pub fn method(
        name: impl Into<String>,
        owner: TypeId,
        is_constructor: bool,
        returns_void: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Method {
                owner,
                is_constructor,
                returns_void,
            },
            declared_type: None,
            annotations: Vec::new(),
        }
    }

    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Unknown,
            declared_type: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, fqn: impl Into<String>) -> Self {
        self.annotations.push(fqn.into());
        self
    }
}

/// Immutable-for-the-engine view of the resolved symbols of one method
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<SymbolInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, info: SymbolInfo) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(info);
        id
    }

    pub fn info(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id.0 as usize]
    }

    pub fn name(&self, id: SymbolId) -> &str {
        &self.info(id).name
    }

    pub fn is_field(&self, id: SymbolId) -> bool {
        self.info(id).kind == SymbolKind::Field
    }

    pub fn is_unknown(&self, id: SymbolId) -> bool {
        self.info(id).kind == SymbolKind::Unknown
    }

    pub fn declared_type(&self, id: SymbolId) -> Option<TypeId> {
        self.info(id).declared_type
    }

    pub fn has_annotation(&self, id: SymbolId, fqn: &str) -> bool {
        self.info(id).annotations.iter().any(|a| a == fqn)
    }
}

/// Matches a method symbol against a type FQN and method name, for the
/// engine's heap-escape and execution-sink sentinels.
#[derive(Debug, Clone, Copy)]
pub struct MethodMatcher {
    pub type_fqn: &'static str,
    pub name: &'static str,
}

impl MethodMatcher {
    pub const fn new(type_fqn: &'static str, name: &'static str) -> Self {
        Self { type_fqn, name }
    }

    pub fn matches(&self, method: SymbolId, symbols: &SymbolTable, types: &TypeTable) -> bool {
        let info = symbols.info(method);
        match info.kind {
            SymbolKind::Method { owner, .. } => {
                info.name == self.name && types.fqn(owner) == self.type_fqn
            }
            _ => false,
        }
    }
}
