use crate::ids::{NamedTypeId, NodeId, ObjectId, TypeId};
use serde::{Deserialize, Serialize};

/// One SL source file's import line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub node: NodeId,
    pub path: String,
    /// `Some("_")` / `Some(".")` for blank/dot imports — dropped by the
    /// import resolver (§4.H), never emitted.
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub file: String,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    /// `type Name underlying` or `type Name = underlying` (the `is_alias`
    /// flag distinguishes the direct-alias edge rule in §4.E).
    TypeDecl {
        node: NodeId,
        named: NamedTypeId,
        is_alias: bool,
    },
    /// Package-level `var name[, name...] = expr[, expr...]`.
    VarDecl {
        node: NodeId,
        names: Vec<ObjectId>,
        values: Vec<Expr>,
    },
    ConstDecl {
        node: NodeId,
        name: ObjectId,
        value: Expr,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub node: NodeId,
    pub object: ObjectId,
    /// Receiver object and its named type, for methods (empty name for
    /// package-level functions per the `MethodKey` convention in §3).
    pub receiver: Option<Receiver>,
    pub params: Vec<ObjectId>,
    /// Named results carry an `ObjectId` so a bare `return` can be expanded
    /// per §4.I.7; unnamed results are tracked only by type in the
    /// function's `FuncSig`.
    pub named_results: Vec<ObjectId>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub object: ObjectId,
    pub named_type: NamedTypeId,
    pub is_pointer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        node: NodeId,
        op: AssignOp,
        lhs: Vec<Expr>,
        rhs: Vec<Expr>,
    },
    Expr(Expr),
    Return {
        node: NodeId,
        values: Vec<Expr>,
    },
    /// A bare `return` in a function with named results; the emitter must
    /// expand this into the tuple of named-return reads (§4.I.7).
    BareReturn {
        node: NodeId,
    },
    If {
        node: NodeId,
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    For {
        node: NodeId,
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: Block,
    },
    RangeChannel {
        node: NodeId,
        var: ObjectId,
        channel: Expr,
        body: Block,
    },
    /// `channel <- value`, a standalone send statement (not inside `select`).
    Send {
        node: NodeId,
        channel: Expr,
        value: Expr,
    },
    Break {
        node: NodeId,
    },
    Continue {
        node: NodeId,
    },
    Defer {
        node: NodeId,
        call: Expr,
    },
    Go {
        node: NodeId,
        call: Expr,
    },
    Select {
        node: NodeId,
        cases: Vec<SelectCase>,
    },
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectCase {
    pub node: NodeId,
    pub kind: SelectCaseKind,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectCaseKind {
    Send { channel: Expr, value: Expr },
    Recv { channel: Expr, bind: Option<ObjectId> },
    Default,
}

/// How a composite literal's fields partition for emission (§4.I.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompositeLitKind {
    Map(Vec<(Expr, Expr)>),
    ByteSlice(Vec<u8>),
    /// Slice/array elements, with optional indexed keys (`3: v`) and a
    /// flag for slice-of-slice depth (passed as `depth=2` to the runtime).
    Elements {
        elements: Vec<(Option<usize>, Expr)>,
        is_slice_of_slice: bool,
    },
    /// Named record, split into direct / embedded-by-name / explicit-embedded
    /// field partitions, each already sorted by field name (§4.I.2).
    Record {
        named_type: NamedTypeId,
        direct: Vec<(String, Expr)>,
        embedded_by_name: Vec<(String, Expr)>,
        explicit_embedded: Vec<(NamedTypeId, Expr)>,
    },
    /// Anonymous (unnamed struct literal) record.
    Anonymous(Vec<(String, Expr)>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident {
        node: NodeId,
        ty: TypeId,
        object: ObjectId,
    },
    IntLit { node: NodeId, ty: TypeId, value: i64 },
    FloatLit { node: NodeId, ty: TypeId, value: String },
    StringLit { node: NodeId, ty: TypeId, value: String },
    BoolLit { node: NodeId, ty: TypeId, value: bool },
    NilLit { node: NodeId, ty: TypeId },
    AddressOf {
        node: NodeId,
        ty: TypeId,
        inner: Box<Expr>,
    },
    Deref {
        node: NodeId,
        ty: TypeId,
        inner: Box<Expr>,
    },
    Binary {
        node: NodeId,
        ty: TypeId,
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        node: NodeId,
        ty: TypeId,
        op: String,
        inner: Box<Expr>,
    },
    Call {
        node: NodeId,
        ty: TypeId,
        callee: Box<Expr>,
        args: Vec<Expr>,
        has_ellipsis: bool,
    },
    /// `pkg.Name`, `value.Field`, `value.Method`, or a method value when not
    /// immediately wrapped in `Call` (the lowering policy tells those apart
    /// via the oracle's `selection` query, §4.I.4).
    Selector {
        node: NodeId,
        ty: TypeId,
        base: Box<Expr>,
        member: String,
    },
    Index {
        node: NodeId,
        ty: TypeId,
        base: Box<Expr>,
        index: Box<Expr>,
    },
    CompositeLit {
        node: NodeId,
        ty: TypeId,
        kind: CompositeLitKind,
        /// Set transiently by the lowering policy when this literal is the
        /// direct operand of `&…{}` (§4.I.2's "omit the wrapper" rule); not
        /// part of the oracle's input, a lowering-time annotation.
        inside_address_of: bool,
    },
    TypeAssert {
        node: NodeId,
        ty: TypeId,
        target: Box<Expr>,
        asserted: TypeId,
        /// `x, ok := y.(T)` two-result form vs. the panicking one-result form.
        comma_ok: bool,
    },
    /// A method value, e.g. `x.M` used as a first-class function rather
    /// than called immediately.
    MethodValue {
        node: NodeId,
        ty: TypeId,
        receiver: Box<Expr>,
        method: crate::MethodKey,
    },
    ChannelRecv {
        node: NodeId,
        ty: TypeId,
        channel: Box<Expr>,
    },
    FuncLit {
        node: NodeId,
        ty: TypeId,
        params: Vec<ObjectId>,
        body: Block,
    },
}

impl Expr {
    pub fn node(&self) -> NodeId {
        match self {
            Expr::Ident { node, .. }
            | Expr::IntLit { node, .. }
            | Expr::FloatLit { node, .. }
            | Expr::StringLit { node, .. }
            | Expr::BoolLit { node, .. }
            | Expr::NilLit { node, .. }
            | Expr::AddressOf { node, .. }
            | Expr::Deref { node, .. }
            | Expr::Binary { node, .. }
            | Expr::Unary { node, .. }
            | Expr::Call { node, .. }
            | Expr::Selector { node, .. }
            | Expr::Index { node, .. }
            | Expr::CompositeLit { node, .. }
            | Expr::TypeAssert { node, .. }
            | Expr::MethodValue { node, .. }
            | Expr::ChannelRecv { node, .. }
            | Expr::FuncLit { node, .. } => *node,
        }
    }

    pub fn ty(&self) -> TypeId {
        match self {
            Expr::Ident { ty, .. }
            | Expr::IntLit { ty, .. }
            | Expr::FloatLit { ty, .. }
            | Expr::StringLit { ty, .. }
            | Expr::BoolLit { ty, .. }
            | Expr::NilLit { ty, .. }
            | Expr::AddressOf { ty, .. }
            | Expr::Deref { ty, .. }
            | Expr::Binary { ty, .. }
            | Expr::Unary { ty, .. }
            | Expr::Call { ty, .. }
            | Expr::Selector { ty, .. }
            | Expr::Index { ty, .. }
            | Expr::CompositeLit { ty, .. }
            | Expr::TypeAssert { ty, .. }
            | Expr::MethodValue { ty, .. }
            | Expr::ChannelRecv { ty, .. }
            | Expr::FuncLit { ty, .. } => *ty,
        }
    }
}
