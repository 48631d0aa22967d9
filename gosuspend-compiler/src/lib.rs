pub mod callgraph;
pub mod config;
pub mod decl_order;
pub mod error;
pub mod escape;
pub mod fixtures;
pub mod imports;
pub mod interfaces;
pub mod lowering;
pub mod oracle;
pub mod pipeline;
pub mod reflect_mark;
pub mod runtime_contract;
pub mod shadowing;
pub mod writer;

pub use error::{Error, LoweringErrorKind, Pos, Result};
pub use fixtures::demo_package;
pub use pipeline::{analyze_package, compile_package, PackageAnalysis};
pub use runtime_contract::RuntimeApi;
pub use writer::{StringTlWriter, TlWriter};

// Re-export diagnostics so downstream crates (the CLI, the WASM shim) depend
// on this crate alone for the diagnostic surface.
pub use gosuspend_diagnostics as diagnostics;
pub use gosuspend_diagnostics::{error_codes, Diagnostic, DiagnosticEngine, ErrorLevel, Span};
