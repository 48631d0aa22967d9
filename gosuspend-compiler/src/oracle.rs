//! Component A: the type-info oracle adapter.
//!
//! The real SL front end (parser + `go/types`-style checker) is the
//! out-of-scope external collaborator this trait stands in for. Every
//! downstream component (B–I) depends only on these operations, never on
//! the concrete shape of `gosuspend_ast::types::Type`.

use gosuspend_ast::{Expr, MethodKey, NamedTypeData, NamedTypeId, ObjectData, ObjectId, Type, TypeArena, TypeId};

/// What a selector expression (`base.member`) resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionKind {
    /// A struct field read/write.
    Field,
    /// A method, resolved to the concrete or interface method it names.
    Method(MethodKey),
    /// `pkg.Name` — a package-qualified reference, not a selection at all.
    PackageMember,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub kind: SelectionKind,
}

/// Read-only facade over the typed AST. No mutation; every downstream
/// component borrows one of these rather than touching the arenas
/// directly.
pub trait TypeOracle {
    fn object(&self, id: ObjectId) -> &ObjectData;
    fn ty(&self, id: TypeId) -> &Type;
    fn named(&self, id: NamedTypeId) -> &NamedTypeData;

    /// Resolve what a selector expression names. `Expr::Selector` carries
    /// only a base expression and a member name string; the oracle is what
    /// turns that into field-vs-method-vs-package-member.
    fn selection(&self, expr: &Expr) -> Option<Selection>;

    /// Structural implements-check: does `concrete`'s (possibly promoted)
    /// method set cover every method `iface` requires?
    fn implements(&self, concrete: NamedTypeId, iface: NamedTypeId) -> bool;

    /// The full method set of a named type, including methods promoted
    /// from non-pointer and pointer embedded fields, direct methods
    /// shadowing promoted ones of the same name.
    fn method_set(&self, named: NamedTypeId) -> Vec<MethodKey>;
}

/// The one concrete adapter this crate ships: a directly-constructed
/// in-memory oracle backed by the arenas callers (tests, the WASM shim's
/// stub importer) build up front. Not a from-scratch SL front end.
pub struct StaticOracle<'a> {
    pub objects: &'a gosuspend_ast::ObjectArena,
    pub types: &'a TypeArena,
}

impl<'a> StaticOracle<'a> {
    pub fn new(objects: &'a gosuspend_ast::ObjectArena, types: &'a TypeArena) -> Self {
        Self { objects, types }
    }

    fn promoted_methods(&self, named: NamedTypeId, out: &mut Vec<MethodKey>, seen_names: &mut Vec<String>) {
        let data = self.types.named(named);
        for m in &data.methods {
            if !seen_names.contains(&m.method_name) {
                seen_names.push(m.method_name.clone());
                out.push(m.clone());
            }
        }
        for embedded in &data.embedded_fields {
            self.promoted_methods(embedded.named_type, out, seen_names);
        }
    }
}

impl<'a> TypeOracle for StaticOracle<'a> {
    fn object(&self, id: ObjectId) -> &ObjectData {
        self.objects.get(id)
    }

    fn ty(&self, id: TypeId) -> &Type {
        self.types.get(id)
    }

    fn named(&self, id: NamedTypeId) -> &NamedTypeData {
        self.types.named(id)
    }

    fn selection(&self, expr: &Expr) -> Option<Selection> {
        match expr {
            Expr::Selector { base, member, .. } => {
                let base_ty = base.ty();
                let named = match self.types.get(base_ty) {
                    Type::Named(n) | Type::Struct(n) | Type::Interface(n) => Some(*n),
                    Type::Pointer(inner) => match self.types.get(*inner) {
                        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => Some(*n),
                        _ => None,
                    },
                    _ => None,
                };
                let named = named?;
                let methods = self.method_set(named);
                if let Some(key) = methods.iter().find(|k| &k.method_name == member) {
                    return Some(Selection {
                        kind: SelectionKind::Method(key.clone()),
                    });
                }
                let data = self.types.named(named);
                if data.fields.iter().any(|f| &f.name == member) {
                    return Some(Selection {
                        kind: SelectionKind::Field,
                    });
                }
                None
            }
            _ => None,
        }
    }

    fn implements(&self, concrete: NamedTypeId, iface: NamedTypeId) -> bool {
        let iface_data = self.types.named(iface);
        if !matches!(self.types.get(iface_data.underlying), Type::Interface(_)) {
            return false;
        }
        let required: Vec<&str> = iface_data.methods.iter().map(|m| m.method_name.as_str()).collect();
        let have = self.method_set(concrete);
        required
            .iter()
            .all(|name| have.iter().any(|m| &m.method_name == name))
    }

    fn method_set(&self, named: NamedTypeId) -> Vec<MethodKey> {
        let mut out = Vec::new();
        let mut seen_names = Vec::new();
        self.promoted_methods(named, &mut out, &mut seen_names);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosuspend_ast::{EmbeddedField, NodeIdGen, ObjectArena, ObjectData, ObjectKind, StructField};

    fn struct_with(types: &mut TypeArena, name: &str, fields: Vec<StructField>, methods: Vec<MethodKey>, embedded: Vec<EmbeddedField>) -> NamedTypeId {
        let placeholder = types.intern(Type::Bool);
        let named = types.declare_named(NamedTypeData {
            package_path: "demo".into(),
            name: name.into(),
            underlying: placeholder,
            methods,
            embedded_fields: embedded,
            fields,
        });
        let struct_ty = types.intern(Type::Struct(named));
        types.named_mut(named).underlying = struct_ty;
        named
    }

    #[test]
    fn method_set_promotes_from_embedded_field_without_shadowing_own() {
        let mut types = TypeArena::new();
        let base = struct_with(&mut types, "Base", vec![], vec![MethodKey::method("demo", "Base", "Greet")], vec![]);
        let outer = struct_with(
            &mut types,
            "Outer",
            vec![],
            vec![MethodKey::method("demo", "Outer", "Own")],
            vec![EmbeddedField { named_type: base, is_pointer: false }],
        );

        let objects = ObjectArena::new();
        let oracle = StaticOracle::new(&objects, &types);
        let names: Vec<&str> = oracle.method_set(outer).iter().map(|m| m.method_name.as_str()).collect();
        assert!(names.contains(&"Own"));
        assert!(names.contains(&"Greet"));
    }

    #[test]
    fn own_method_shadows_promoted_one_of_the_same_name() {
        let mut types = TypeArena::new();
        let base = struct_with(&mut types, "Base", vec![], vec![MethodKey::method("demo", "Base", "Greet")], vec![]);
        let outer = struct_with(
            &mut types,
            "Outer",
            vec![],
            vec![MethodKey::method("demo", "Outer", "Greet")],
            vec![EmbeddedField { named_type: base, is_pointer: false }],
        );

        let objects = ObjectArena::new();
        let oracle = StaticOracle::new(&objects, &types);
        let greets: Vec<&MethodKey> = oracle.method_set(outer).iter().filter(|m| m.method_name == "Greet").collect();
        assert_eq!(greets.len(), 1);
        assert_eq!(greets[0].receiver_type_name, "Outer");
    }

    #[test]
    fn implements_requires_every_interface_method() {
        let mut types = TypeArena::new();
        let concrete = struct_with(&mut types, "Dog", vec![], vec![MethodKey::method("demo", "Dog", "Bark")], vec![]);
        let placeholder = types.intern(Type::Bool);
        let iface = types.declare_named(NamedTypeData {
            package_path: "demo".into(),
            name: "Speaker".into(),
            underlying: placeholder,
            methods: vec![MethodKey::method("demo", "Speaker", "Bark"), MethodKey::method("demo", "Speaker", "Sit")],
            embedded_fields: vec![],
            fields: vec![],
        });
        let iface_ty = types.intern(Type::Interface(iface));
        types.named_mut(iface).underlying = iface_ty;

        let objects = ObjectArena::new();
        let oracle = StaticOracle::new(&objects, &types);
        assert!(!oracle.implements(concrete, iface), "Dog has no Sit method yet");

        types.named_mut(concrete).methods.push(MethodKey::method("demo", "Dog", "Sit"));
        assert!(oracle.implements(concrete, iface));
    }

    #[test]
    fn selection_resolves_field_through_a_pointer_base() {
        let mut types = TypeArena::new();
        let int_ty = types.intern(Type::Int { bits: 64, signed: true });
        let named = struct_with(&mut types, "Point", vec![StructField { name: "X".into(), ty: int_ty, is_pointer: false }], vec![], vec![]);
        let struct_ty = types.intern(Type::Struct(named));
        let ptr_ty = types.intern(Type::Pointer(struct_ty));

        let mut objects = ObjectArena::new();
        let mut idgen = NodeIdGen::new();
        let p = objects.declare(ObjectData { name: "p".into(), kind: ObjectKind::Var, ty: ptr_ty, is_blank: false });
        let oracle = StaticOracle::new(&objects, &types);

        let expr = gosuspend_ast::Expr::Selector {
            node: idgen.next(),
            ty: int_ty,
            base: Box::new(gosuspend_ast::Expr::Ident { node: idgen.next(), ty: ptr_ty, object: p }),
            member: "X".into(),
        };
        let selection = oracle.selection(&expr).expect("field resolves through a pointer base");
        assert_eq!(selection.kind, SelectionKind::Field);
    }
}
