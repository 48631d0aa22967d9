/// Stable identity for a named SL entity (variable, function, constant,
/// type-name, package-name). Equality is by id, never by name — two
/// variables named `x` in different scopes are different `ObjectId`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ObjectId(pub u32);

/// Interned SL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct TypeId(pub u32);

/// A named type declaration (struct, interface, or wrapper/basic-named type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NamedTypeId(pub u32);

/// Stable identity for an AST node, used to key `NodeInfo` and `SpanMap`
/// entries without threading span/auxiliary fields through every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u32);

/// Monotonically increasing id generator shared by the AST builder.
#[derive(Debug, Default, Clone)]
pub struct NodeIdGen {
    next: u32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}
