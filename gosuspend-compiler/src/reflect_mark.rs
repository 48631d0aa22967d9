//! Component G: the reflection-marking pass.
//!
//! Detects calls to the runtime reflect module's `TypeOf` / `ValueOf` /
//! `TypeFor` over a function identifier or literal, so the emitter knows
//! which functions need a runtime type descriptor attached. A single
//! forward walk tracks, for every local variable, the most recent function
//! value it was assigned from — the "source of the function assignment"
//! the reflect call's argument resolves back to when it isn't a literal
//! in argument position itself.

use gosuspend_ast::{AssignOp, Block, Decl, Expr, NodeId, ObjectArena, ObjectId, ObjectKind, Program, Stmt};
use std::collections::{HashMap, HashSet};

const REFLECT_PACKAGE: &str = "reflect";
const REFLECT_FUNCS: [&str; 3] = ["TypeOf", "ValueOf", "TypeFor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Node(NodeId),
    Object(ObjectId),
}

#[derive(Debug, Default)]
pub struct ReflectMarker {
    assign_source: HashMap<ObjectId, Source>,
    marked_nodes: HashSet<NodeId>,
    marked_objects: HashSet<ObjectId>,
}

impl ReflectMarker {
    pub fn analyze(program: &Program, objects: &ObjectArena) -> Self {
        let mut this = Self::default();
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                this.scan_block(&f.body, objects);
            }
        }
        this
    }

    fn scan_block(&mut self, block: &Block, objects: &ObjectArena) {
        for stmt in &block.stmts {
            self.scan_stmt(stmt, objects);
        }
    }

    fn scan_stmt(&mut self, stmt: &Stmt, objects: &ObjectArena) {
        match stmt {
            Stmt::Assign { op, lhs, rhs, .. } => {
                if matches!(op, AssignOp::Define | AssignOp::Assign) {
                    for (l, r) in lhs.iter().zip(rhs.iter()) {
                        if let Expr::Ident { object, .. } = l {
                            self.record_assignment(*object, r);
                        }
                    }
                }
                for r in rhs {
                    self.scan_expr(r, objects);
                }
            }
            Stmt::Expr(e) => self.scan_expr(e, objects),
            Stmt::Return { values, .. } => {
                for v in values {
                    self.scan_expr(v, objects);
                }
            }
            Stmt::If { cond, then_block, else_block, .. } => {
                self.scan_expr(cond, objects);
                self.scan_block(then_block, objects);
                if let Some(e) = else_block {
                    self.scan_block(e, objects);
                }
            }
            Stmt::For { body, .. } => self.scan_block(body, objects),
            Stmt::RangeChannel { body, .. } => self.scan_block(body, objects),
            Stmt::Select { cases, .. } => {
                for case in cases {
                    self.scan_block(&case.body, objects);
                }
            }
            Stmt::Block(b) => self.scan_block(b, objects),
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => self.scan_expr(call, objects),
            Stmt::Send { channel, value, .. } => {
                self.scan_expr(channel, objects);
                self.scan_expr(value, objects);
            }
            Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn scan_expr(&mut self, expr: &Expr, objects: &ObjectArena) {
        match expr {
            Expr::Call { callee, args, .. } => {
                if let Some(name) = reflect_call_name(callee, objects) {
                    if REFLECT_FUNCS.contains(&name.as_str()) {
                        if let Some(arg) = args.first() {
                            self.mark(arg);
                        }
                    }
                }
                self.scan_expr(callee, objects);
                for a in args {
                    self.scan_expr(a, objects);
                }
            }
            Expr::Binary { left, right, .. } => {
                self.scan_expr(left, objects);
                self.scan_expr(right, objects);
            }
            Expr::Unary { inner, .. } | Expr::AddressOf { inner, .. } | Expr::Deref { inner, .. } => self.scan_expr(inner, objects),
            Expr::Selector { base, .. } => self.scan_expr(base, objects),
            Expr::Index { base, index, .. } => {
                self.scan_expr(base, objects);
                self.scan_expr(index, objects);
            }
            Expr::TypeAssert { target, .. } => self.scan_expr(target, objects),
            Expr::MethodValue { receiver, .. } => self.scan_expr(receiver, objects),
            Expr::ChannelRecv { channel, .. } => self.scan_expr(channel, objects),
            Expr::FuncLit { body, .. } => self.scan_block(body, objects),
            _ => {}
        }
    }

    fn record_assignment(&mut self, lhs: ObjectId, rhs: &Expr) {
        match rhs {
            Expr::FuncLit { node, .. } => {
                self.assign_source.insert(lhs, Source::Node(*node));
            }
            Expr::Ident { object, .. } => {
                let src = self.assign_source.get(object).copied().unwrap_or(Source::Object(*object));
                self.assign_source.insert(lhs, src);
            }
            _ => {}
        }
    }

    fn mark(&mut self, arg: &Expr) {
        match arg {
            Expr::FuncLit { node, .. } => {
                self.marked_nodes.insert(*node);
            }
            Expr::Ident { object, .. } => match self.assign_source.get(object) {
                Some(Source::Node(n)) => {
                    self.marked_nodes.insert(*n);
                }
                Some(Source::Object(o)) => {
                    self.marked_objects.insert(*o);
                }
                None => {
                    self.marked_objects.insert(*object);
                }
            },
            _ => {}
        }
    }

    pub fn is_marked_node(&self, node: NodeId) -> bool {
        self.marked_nodes.contains(&node)
    }

    pub fn is_marked_object(&self, obj: ObjectId) -> bool {
        self.marked_objects.contains(&obj)
    }
}

/// `pkg.Func` call-name extraction, gated on the base resolving to the
/// `reflect` package object.
fn reflect_call_name(callee: &Expr, objects: &ObjectArena) -> Option<String> {
    if let Expr::Selector { base, member, .. } = callee {
        if let Expr::Ident { object, .. } = base.as_ref() {
            let data = objects.get(*object);
            if data.kind == ObjectKind::Package && data.name == REFLECT_PACKAGE {
                return Some(member.clone());
            }
        }
    }
    None
}
