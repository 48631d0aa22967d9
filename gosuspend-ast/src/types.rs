use crate::ids::{NamedTypeId, TypeId};
use crate::MethodKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Channel direction, mirrored from SL's `chan T`, `chan<- T`, `<-chan T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    SendOnly,
    RecvOnly,
}

/// A type parameter's constraint, used to resolve Open Question 3 (generic
/// zero values): when the constraint is a union of concrete basic types, the
/// lowering policy consults `union_terms` instead of defaulting to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub interface: Option<NamedTypeId>,
    pub union_terms: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncSig {
    pub params: Vec<TypeId>,
    pub variadic: bool,
    /// SL supports untagged multi-value returns; empty means no return value.
    pub results: Vec<TypeId>,
}

/// The canonical, interned representation of an SL type. Structurally equal
/// types share a `TypeId` (see `TypeArena::intern`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Bool,
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    Str,
    Byte,
    Rune,
    Pointer(TypeId),
    Slice(TypeId),
    Array(TypeId, usize),
    Map(TypeId, TypeId),
    Chan(TypeId, ChanDir),
    Func(FuncSig),
    Named(NamedTypeId),
    Interface(NamedTypeId),
    Struct(NamedTypeId),
    /// Generic type parameter, carrying its constraint's union terms so
    /// zero-value lowering can pick a concrete zero instead of `null`.
    TypeParam { name: String, constraint: Constraint },
    /// The untyped nil literal's type before it unifies with a context type.
    UntypedNil,
}

/// Shared data for any named type declaration (struct, interface, or a
/// wrapper around a basic type, i.e. `type Celsius float64`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedTypeData {
    pub package_path: String,
    pub name: String,
    pub underlying: TypeId,
    pub methods: Vec<MethodKey>,
    pub embedded_fields: Vec<EmbeddedField>,
    pub fields: Vec<StructField>,
}

impl NamedTypeData {
    /// A wrapper type is a named type whose underlying representation is a
    /// basic (non-struct, non-interface) type, optionally carrying methods.
    pub fn is_wrapper_type(&self, arena: &TypeArena) -> bool {
        !matches!(
            arena.get(self.underlying),
            Type::Struct(_) | Type::Interface(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
    pub is_pointer: bool,
}

/// An embedded (anonymous) field, the source of SL method promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedField {
    pub named_type: NamedTypeId,
    pub is_pointer: bool,
}

/// Arena + interning table for `Type`/`NamedTypeData`. Single-threaded by
/// design (see SPEC_FULL §5: the analysis pipeline is not concurrent), so a
/// plain `Vec`-backed table is used rather than the `dashmap`-based
/// concurrent interner the compiler crate uses for its own type cache.
#[derive(Debug, Default)]
pub struct TypeArena {
    types: Vec<Type>,
    interned: HashMap<Type, TypeId>,
    named: Vec<NamedTypeData>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a structural type, returning a shared id for equal types.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.interned.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.interned.insert(ty.clone(), id);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn declare_named(&mut self, data: NamedTypeData) -> NamedTypeId {
        let id = NamedTypeId(self.named.len() as u32);
        self.named.push(data);
        id
    }

    pub fn named(&self, id: NamedTypeId) -> &NamedTypeData {
        &self.named[id.0 as usize]
    }

    pub fn named_mut(&mut self, id: NamedTypeId) -> &mut NamedTypeData {
        &mut self.named[id.0 as usize]
    }

    pub fn all_named(&self) -> impl Iterator<Item = (NamedTypeId, &NamedTypeData)> {
        self.named
            .iter()
            .enumerate()
            .map(|(i, d)| (NamedTypeId(i as u32), d))
    }

    /// `true` if `elem` is a direct, non-pointer named-type dependency of
    /// `ty` — the exact edge rule §4.E's type sort uses (no edges through
    /// pointer/interface/map/function fields or pointers-to-arrays).
    pub fn direct_value_dependencies(&self, named: NamedTypeId) -> Vec<NamedTypeId> {
        let data = self.named(named);
        let mut deps = Vec::new();
        for field in &data.fields {
            if field.is_pointer {
                continue;
            }
            self.collect_value_dep(field.ty, &mut deps);
        }
        for embedded in &data.embedded_fields {
            if !embedded.is_pointer {
                deps.push(embedded.named_type);
            }
        }
        deps
    }

    fn collect_value_dep(&self, ty: TypeId, out: &mut Vec<NamedTypeId>) {
        match self.get(ty) {
            Type::Named(n) | Type::Struct(n) => out.push(*n),
            Type::Array(elem, _) => self.collect_value_dep(*elem, out),
            _ => {}
        }
    }
}
