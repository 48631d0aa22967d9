use crate::ids::{ObjectId, TypeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Var,
    Param,
    NamedReturn,
    Const,
    Func,
    Method,
    TypeName,
    Package,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: TypeId,
    /// `true` for `_` and other names SL treats as non-bindable.
    pub is_blank: bool,
}

/// Arena of `Object`s. An `ObjectId` is the sole notion of identity: two
/// objects with the same name in different scopes never share an id.
#[derive(Debug, Default)]
pub struct ObjectArena {
    objects: Vec<ObjectData>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, data: ObjectData) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(data);
        id
    }

    pub fn get(&self, id: ObjectId) -> &ObjectData {
        &self.objects[id.0 as usize]
    }
}
