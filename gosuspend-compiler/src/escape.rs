//! Component B: address/escape tracking.
//!
//! Decides, for every variable object reachable in a package, whether it
//! must be boxed into a `VarRef<T>` cell (`needs_var_ref`) and whether
//! reads through a pointer to it require a trailing `.value`
//! (`needs_var_ref_access`).

use gosuspend_ast::{
    Block, CompositeLitKind, Decl, Expr, MethodKey, ObjectArena, ObjectId, Program, SelectCaseKind,
    Stmt, Type, TypeArena, TypeId,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignKind {
    Direct,
    AddressOf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentInfo {
    pub peer: Option<ObjectId>,
    pub kind: AssignKind,
}

#[derive(Debug, Clone, Default)]
pub struct VariableUsageInfo {
    pub sources: Vec<AssignmentInfo>,
    pub destinations: Vec<AssignmentInfo>,
}

/// `MethodKey -> is_pointer_receiver`, built once from every `FuncDecl`
/// across the package before escape analysis runs (implicit address-taking,
/// discovery source 4, needs to know the callee's receiver kind).
pub fn receiver_pointer_map(
    program: &Program,
    types: &TypeArena,
    objects: &ObjectArena,
) -> HashMap<MethodKey, bool> {
    let mut map = HashMap::new();
    for decl in &program.decls {
        if let Decl::Func(f) = decl {
            if let Some(recv) = &f.receiver {
                let named = types.named(recv.named_type);
                let method_name = objects.get(f.object).name.clone();
                let key =
                    MethodKey::method(named.package_path.clone(), named.name.clone(), method_name);
                map.insert(key, recv.is_pointer);
            }
        }
    }
    map
}

#[derive(Default)]
pub struct EscapeTracker {
    usage: HashMap<ObjectId, VariableUsageInfo>,
}

impl EscapeTracker {
    pub fn analyze(program: &Program, types: &TypeArena, receiver_pointer: &HashMap<MethodKey, bool>) -> Self {
        let mut tracker = Self {
            usage: HashMap::new(),
        };
        for decl in &program.decls {
            match decl {
                Decl::Func(f) => tracker.walk_block(&f.body, types, receiver_pointer),
                Decl::VarDecl { names, values, .. } => {
                    for (name, value) in names.iter().zip(values.iter()) {
                        tracker.record_rhs(*name, value, types, receiver_pointer);
                    }
                }
                _ => {}
            }
        }
        tracker
    }

    fn entry(&mut self, obj: ObjectId) -> &mut VariableUsageInfo {
        self.usage.entry(obj).or_default()
    }

    fn mark_address_of(&mut self, obj: ObjectId) {
        self.entry(obj).destinations.push(AssignmentInfo {
            peer: None,
            kind: AssignKind::AddressOf,
        });
    }

    /// Pulls the named type out of an expression's static type, following
    /// one level of pointer indirection (`x` or `*x` both resolve to the
    /// same named type for method lookup purposes).
    fn named_type_of(ty: TypeId, types: &TypeArena) -> Option<gosuspend_ast::NamedTypeId> {
        match types.get(ty) {
            Type::Named(n) | Type::Struct(n) | Type::Interface(n) => Some(*n),
            Type::Pointer(inner) => Self::named_type_of(*inner, types),
            _ => None,
        }
    }

    fn record_rhs(
        &mut self,
        lhs: ObjectId,
        rhs: &Expr,
        types: &TypeArena,
        receiver_pointer: &HashMap<MethodKey, bool>,
    ) {
        match rhs {
            Expr::AddressOf { inner, .. } => {
                if let Expr::Ident { object, .. } = inner.as_ref() {
                    self.mark_address_of(*object);
                    self.entry(lhs).sources.push(AssignmentInfo {
                        peer: Some(*object),
                        kind: AssignKind::AddressOf,
                    });
                }
            }
            Expr::Ident { object, .. } => {
                self.entry(lhs).sources.push(AssignmentInfo {
                    peer: Some(*object),
                    kind: AssignKind::Direct,
                });
            }
            _ => {}
        }
        self.walk_expr(rhs, types, receiver_pointer);
    }

    fn walk_block(&mut self, block: &Block, types: &TypeArena, receiver_pointer: &HashMap<MethodKey, bool>) {
        for stmt in &block.stmts {
            self.walk_stmt(stmt, types, receiver_pointer);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, types: &TypeArena, receiver_pointer: &HashMap<MethodKey, bool>) {
        match stmt {
            Stmt::Assign { lhs, rhs, .. } => {
                // Discovery source 5: `*p = v` marks the dereferenced
                // pointer variable itself as an AddressOf destination.
                for l in lhs {
                    if let Expr::Deref { inner, .. } = l {
                        if let Expr::Ident { object, .. } = inner.as_ref() {
                            self.mark_address_of(*object);
                        }
                    }
                }
                for (l, r) in lhs.iter().zip(rhs.iter()) {
                    if let Expr::Ident { object, .. } = l {
                        self.record_rhs(*object, r, types, receiver_pointer);
                    } else {
                        self.walk_expr(l, types, receiver_pointer);
                        self.walk_expr(r, types, receiver_pointer);
                    }
                }
            }
            Stmt::Expr(e) => self.walk_expr(e, types, receiver_pointer),
            Stmt::Return { values, .. } => {
                for v in values {
                    self.walk_expr(v, types, receiver_pointer);
                }
            }
            Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::If {
                cond,
                then_block,
                else_block,
                ..
            } => {
                self.walk_expr(cond, types, receiver_pointer);
                self.walk_block(then_block, types, receiver_pointer);
                if let Some(e) = else_block {
                    self.walk_block(e, types, receiver_pointer);
                }
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
                ..
            } => {
                if let Some(i) = init {
                    self.walk_stmt(i, types, receiver_pointer);
                }
                if let Some(c) = cond {
                    self.walk_expr(c, types, receiver_pointer);
                }
                if let Some(p) = post {
                    self.walk_stmt(p, types, receiver_pointer);
                }
                self.walk_block(body, types, receiver_pointer);
            }
            Stmt::RangeChannel { channel, body, .. } => {
                self.walk_expr(channel, types, receiver_pointer);
                self.walk_block(body, types, receiver_pointer);
            }
            Stmt::Send { channel, value, .. } => {
                self.walk_expr(channel, types, receiver_pointer);
                self.walk_expr(value, types, receiver_pointer);
            }
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => {
                self.walk_expr(call, types, receiver_pointer);
            }
            Stmt::Select { cases, .. } => {
                for case in cases {
                    match &case.kind {
                        SelectCaseKind::Send { channel, value } => {
                            self.walk_expr(channel, types, receiver_pointer);
                            self.walk_expr(value, types, receiver_pointer);
                        }
                        SelectCaseKind::Recv { channel, .. } => {
                            self.walk_expr(channel, types, receiver_pointer);
                        }
                        SelectCaseKind::Default => {}
                    }
                    self.walk_block(&case.body, types, receiver_pointer);
                }
            }
            Stmt::Block(b) => self.walk_block(b, types, receiver_pointer),
        }
    }

    fn walk_expr(&mut self, expr: &Expr, types: &TypeArena, receiver_pointer: &HashMap<MethodKey, bool>) {
        match expr {
            Expr::AddressOf { inner, .. } => {
                if let Expr::Ident { object, .. } = inner.as_ref() {
                    self.mark_address_of(*object);
                }
                self.walk_expr(inner, types, receiver_pointer);
            }
            Expr::Deref { inner, .. } => self.walk_expr(inner, types, receiver_pointer),
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, types, receiver_pointer);
                self.walk_expr(right, types, receiver_pointer);
            }
            Expr::Unary { inner, .. } => self.walk_expr(inner, types, receiver_pointer),
            Expr::Call { callee, args, .. } => {
                // Discovery source 4: implicit address-taking on a
                // pointer-receiver method call with a non-pointer base.
                if let Expr::Selector { base, member, .. } = callee.as_ref() {
                    if let Expr::Ident { object, ty, .. } = base.as_ref() {
                        if !matches!(types.get(*ty), Type::Pointer(_)) {
                            if let Some(named) = Self::named_type_of(*ty, types) {
                                let data = types.named(named);
                                let key = MethodKey::method(
                                    data.package_path.clone(),
                                    data.name.clone(),
                                    member.clone(),
                                );
                                if receiver_pointer.get(&key).copied().unwrap_or(false) {
                                    self.mark_address_of(*object);
                                }
                            }
                        }
                    }
                }
                self.walk_expr(callee, types, receiver_pointer);
                for a in args {
                    if let Expr::AddressOf { inner, .. } = a {
                        if let Expr::Ident { object, .. } = inner.as_ref() {
                            self.mark_address_of(*object);
                        }
                    }
                    self.walk_expr(a, types, receiver_pointer);
                }
            }
            Expr::Selector { base, .. } => self.walk_expr(base, types, receiver_pointer),
            Expr::Index { base, index, .. } => {
                self.walk_expr(base, types, receiver_pointer);
                self.walk_expr(index, types, receiver_pointer);
            }
            Expr::CompositeLit { kind, .. } => self.walk_composite(kind, types, receiver_pointer),
            Expr::TypeAssert { target, .. } => self.walk_expr(target, types, receiver_pointer),
            Expr::MethodValue { receiver, .. } => self.walk_expr(receiver, types, receiver_pointer),
            Expr::ChannelRecv { channel, .. } => self.walk_expr(channel, types, receiver_pointer),
            Expr::FuncLit { body, .. } => self.walk_block(body, types, receiver_pointer),
            Expr::Ident { .. }
            | Expr::IntLit { .. }
            | Expr::FloatLit { .. }
            | Expr::StringLit { .. }
            | Expr::BoolLit { .. }
            | Expr::NilLit { .. } => {}
        }
    }

    fn walk_composite(&mut self, kind: &CompositeLitKind, types: &TypeArena, receiver_pointer: &HashMap<MethodKey, bool>) {
        let mut mark_and_walk = |tracker: &mut Self, e: &Expr| {
            if let Expr::AddressOf { inner, .. } = e {
                if let Expr::Ident { object, .. } = inner.as_ref() {
                    tracker.mark_address_of(*object);
                }
            }
            tracker.walk_expr(e, types, receiver_pointer);
        };
        match kind {
            CompositeLitKind::Map(entries) => {
                for (k, v) in entries {
                    mark_and_walk(self, k);
                    mark_and_walk(self, v);
                }
            }
            CompositeLitKind::ByteSlice(_) => {}
            CompositeLitKind::Elements { elements, .. } => {
                for (_, e) in elements {
                    mark_and_walk(self, e);
                }
            }
            CompositeLitKind::Record {
                direct,
                embedded_by_name,
                explicit_embedded,
                ..
            } => {
                for (_, e) in direct {
                    mark_and_walk(self, e);
                }
                for (_, e) in embedded_by_name {
                    mark_and_walk(self, e);
                }
                for (_, e) in explicit_embedded {
                    mark_and_walk(self, e);
                }
            }
            CompositeLitKind::Anonymous(fields) => {
                for (_, e) in fields {
                    mark_and_walk(self, e);
                }
            }
        }
    }

    /// Discovery-source invariant: any destination of kind `AddressOf`
    /// forces boxing.
    pub fn needs_var_ref(&self, obj: ObjectId) -> bool {
        self.usage
            .get(&obj)
            .map(|u| u.destinations.iter().any(|a| a.kind == AssignKind::AddressOf))
            .unwrap_or(false)
    }

    /// True if `obj` itself needs boxing, or `obj` is a pointer whose sole
    /// source assignment took the address of an already-boxed variable.
    pub fn needs_var_ref_access(&self, obj: ObjectId, obj_ty: TypeId, types: &TypeArena) -> bool {
        if self.needs_var_ref(obj) {
            return true;
        }
        if !matches!(types.get(obj_ty), Type::Pointer(_)) {
            return false;
        }
        match self.usage.get(&obj) {
            Some(u) if u.sources.len() == 1 => {
                let src = &u.sources[0];
                src.kind == AssignKind::AddressOf
                    && src.peer.map(|q| self.needs_var_ref(q)).unwrap_or(false)
            }
            _ => false,
        }
    }

    pub fn usage_of(&self, obj: ObjectId) -> Option<&VariableUsageInfo> {
        self.usage.get(&obj)
    }
}
