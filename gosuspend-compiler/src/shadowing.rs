//! Component F: variable-shadowing and identifier-mapping analysis.
//!
//! Three independent findings, all consumed by the lowering policy (§4.I)
//! rather than by each other: self-referential short-decl shadows (need a
//! temporary so the RHS reads the outer binding before it's clobbered),
//! type-name shadows (`x := T{...}` where `x` and `T` collide in TL's single
//! namespace), and receiver aliasing (so a method body can bind `this` to
//! the receiver's own name once instead of at every use site).

use gosuspend_ast::{AssignOp, Block, CompositeLitKind, Decl, Expr, FuncDecl, NamedTypeId, ObjectArena, ObjectId, Program, Stmt, TypeArena};
use std::collections::{HashMap, HashSet};

/// A short-decl LHS name that shadows an outer object of the same name,
/// discovered on its own RHS. The emitter binds `tempName` to the outer
/// object's value before the new `x` comes into scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRename {
    pub outer: ObjectId,
    pub temp_name: String,
}

#[derive(Debug, Default)]
pub struct ShadowAnalyzer {
    shadow_renames: HashMap<ObjectId, ShadowRename>,
    type_shadows: HashSet<ObjectId>,
    receiver_aliases: HashMap<ObjectId, String>,
}

impl ShadowAnalyzer {
    pub fn analyze(program: &Program, objects: &ObjectArena, types: &TypeArena) -> Self {
        let mut this = Self::default();
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                this.record_receiver(f, objects);
                this.scan_block(&f.body, objects, types);
            }
        }
        this
    }

    fn record_receiver(&mut self, f: &FuncDecl, objects: &ObjectArena) {
        if let Some(recv) = &f.receiver {
            let data = objects.get(recv.object);
            if !data.is_blank && data.name != "_" {
                self.receiver_aliases.insert(recv.object, data.name.clone());
            }
        }
    }

    fn scan_block(&mut self, block: &Block, objects: &ObjectArena, types: &TypeArena) {
        for stmt in &block.stmts {
            self.scan_stmt(stmt, objects, types);
        }
    }

    fn scan_stmt(&mut self, stmt: &Stmt, objects: &ObjectArena, types: &TypeArena) {
        match stmt {
            Stmt::Assign { op, lhs, rhs, .. } => {
                if *op == AssignOp::Define {
                    for (l, r) in lhs.iter().zip(rhs.iter()) {
                        if let Expr::Ident { object: lhs_obj, .. } = l {
                            let lhs_name = objects.get(*lhs_obj).name.clone();
                            if lhs_name == "_" {
                                continue;
                            }
                            if let Some(outer) = find_same_name_outer(r, &lhs_name, *lhs_obj, objects) {
                                self.shadow_renames.insert(
                                    *lhs_obj,
                                    ShadowRename { outer, temp_name: format!("_temp_{lhs_name}") },
                                );
                            }
                            if let Some(named) = composite_lit_named_type(r) {
                                if types.named(named).name == lhs_name {
                                    self.type_shadows.insert(*lhs_obj);
                                }
                            }
                        }
                    }
                }
                for r in rhs {
                    self.scan_expr(r, objects, types);
                }
            }
            Stmt::Expr(e) => self.scan_expr(e, objects, types),
            Stmt::Return { values, .. } => {
                for v in values {
                    self.scan_expr(v, objects, types);
                }
            }
            Stmt::If { cond, then_block, else_block, .. } => {
                self.scan_expr(cond, objects, types);
                self.scan_block(then_block, objects, types);
                if let Some(e) = else_block {
                    self.scan_block(e, objects, types);
                }
            }
            Stmt::For { init, post, body, .. } => {
                if let Some(i) = init {
                    self.scan_stmt(i, objects, types);
                }
                if let Some(p) = post {
                    self.scan_stmt(p, objects, types);
                }
                self.scan_block(body, objects, types);
            }
            Stmt::RangeChannel { body, .. } => self.scan_block(body, objects, types),
            Stmt::Select { cases, .. } => {
                for case in cases {
                    self.scan_block(&case.body, objects, types);
                }
            }
            Stmt::Block(b) => self.scan_block(b, objects, types),
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => self.scan_expr(call, objects, types),
            Stmt::Send { channel, value, .. } => {
                self.scan_expr(channel, objects, types);
                self.scan_expr(value, objects, types);
            }
            Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn scan_expr(&mut self, expr: &Expr, objects: &ObjectArena, types: &TypeArena) {
        if let Expr::FuncLit { body, .. } = expr {
            self.scan_block(body, objects, types);
        }
    }

    pub fn shadow_rename(&self, lhs: ObjectId) -> Option<&ShadowRename> {
        self.shadow_renames.get(&lhs)
    }

    pub fn is_type_shadowed(&self, obj: ObjectId) -> bool {
        self.type_shadows.contains(&obj)
    }

    /// The renamed identifier to emit for a type-shadowed variable, or its
    /// plain name if unshadowed.
    pub fn resolved_name(&self, obj: ObjectId, objects: &ObjectArena) -> String {
        let name = objects.get(obj).name.clone();
        if self.is_type_shadowed(obj) {
            format!("{name}_")
        } else {
            name
        }
    }

    pub fn receiver_alias(&self, receiver: ObjectId) -> Option<&str> {
        self.receiver_aliases.get(&receiver).map(|s| s.as_str())
    }
}

/// Walks `expr` for an identifier use whose name equals `lhs_name` but whose
/// resolved object differs from `lhs_obj` — i.e., a use of the *outer*
/// binding of the same name, shadowed by the LHS of this very declaration.
fn find_same_name_outer(expr: &Expr, lhs_name: &str, lhs_obj: ObjectId, objects: &ObjectArena) -> Option<ObjectId> {
    match expr {
        Expr::Ident { object, .. } => {
            if *object != lhs_obj && objects.get(*object).name == lhs_name {
                Some(*object)
            } else {
                None
            }
        }
        Expr::AddressOf { inner, .. } | Expr::Deref { inner, .. } | Expr::Unary { inner, .. } => {
            find_same_name_outer(inner, lhs_name, lhs_obj, objects)
        }
        Expr::Binary { left, right, .. } => {
            find_same_name_outer(left, lhs_name, lhs_obj, objects).or_else(|| find_same_name_outer(right, lhs_name, lhs_obj, objects))
        }
        Expr::Call { callee, args, .. } => find_same_name_outer(callee, lhs_name, lhs_obj, objects)
            .or_else(|| args.iter().find_map(|a| find_same_name_outer(a, lhs_name, lhs_obj, objects))),
        Expr::Selector { base, .. } => find_same_name_outer(base, lhs_name, lhs_obj, objects),
        Expr::Index { base, index, .. } => {
            find_same_name_outer(base, lhs_name, lhs_obj, objects).or_else(|| find_same_name_outer(index, lhs_name, lhs_obj, objects))
        }
        Expr::TypeAssert { target, .. } => find_same_name_outer(target, lhs_name, lhs_obj, objects),
        _ => None,
    }
}

/// The named type of `expr` if it is `T{...}` or `&T{...}`, for the
/// type-shadow check.
fn composite_lit_named_type(expr: &Expr) -> Option<NamedTypeId> {
    match expr {
        Expr::CompositeLit { kind: CompositeLitKind::Record { named_type, .. }, .. } => Some(*named_type),
        Expr::AddressOf { inner, .. } => composite_lit_named_type(inner),
        _ => None,
    }
}
