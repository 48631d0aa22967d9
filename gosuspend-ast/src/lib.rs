//! Typed-AST data model consumed by the analysis/lowering pipeline.
//!
//! The real SL front end (parser + `go/types`-equivalent checker) is an
//! external collaborator this crate never implements — see `oracle` in
//! `gosuspend-compiler` for the facade trait. What lives here is the shape
//! of an *already-typed* AST: every expression already carries its
//! resolved `TypeId`, every identifier its resolved `ObjectId`. Callers
//! (tests, the WASM shim's stub importer) build these trees directly.

pub mod ast;
pub mod ids;
pub mod objects;
pub mod types;

pub use ast::*;
pub use ids::*;
pub use objects::*;
pub use types::*;

use serde::{Deserialize, Serialize};

/// Identifies one method (or package-level function, with an empty
/// `receiver_type_name`) for the call graph and async-status table. Pointer
/// receivers use the pointee's short name, matching the distilled spec's
/// `MethodKey` definition verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodKey {
    pub package_path: String,
    pub receiver_type_name: String,
    pub method_name: String,
}

impl MethodKey {
    pub fn function(package_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            receiver_type_name: String::new(),
            method_name: name.into(),
        }
    }

    pub fn method(
        package_path: impl Into<String>,
        receiver_type_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            package_path: package_path.into(),
            receiver_type_name: receiver_type_name.into(),
            method_name: method_name.into(),
        }
    }

    pub fn is_method(&self) -> bool {
        !self.receiver_type_name.is_empty()
    }
}

/// `(interface-type-string, method-name)` — the interface string is the
/// canonical structural print of the interface (§3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceMethodKey {
    pub interface_type_string: String,
    pub method_name: String,
}
