//! Error taxonomy for the analysis/lowering pipeline, grounded on the
//! teacher's `resolver::ResolveError` / `vex-diagnostics` severity model.

use thiserror::Error;

/// One position in an SL source file, attached to lowering errors so the
/// CLI can print `file:line` without re-threading a `Span` through every
/// lowering function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Pos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum LoweringErrorKind {
    #[error("unknown AST variant: {0}")]
    UnknownAstVariant(String),
    #[error("unsupported type conversion from {from} to {to}")]
    UnsupportedTypeConversion { from: String, to: String },
    #[error("unsupported composite literal category: {0}")]
    UnsupportedCompositeLiteral(String),
    #[error("missing type information for node")]
    MissingTypeInfo,
    #[error("invalid argument count for builtin `{name}`: expected {expected}, got {got}")]
    InvalidBuiltinArgs {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("unknown assignment operator token: {0:?}")]
    UnknownAssignOperator(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("type-check error: {0}")]
    TypeCheck(String),

    #[error("circular dependency in type declarations, remaining: {remaining:?}")]
    CircularTypeDependency { remaining: Vec<String> },

    #[error("circular dependency in value initializers, remaining: {remaining:?}")]
    CircularValueInitializer { remaining: Vec<String> },

    #[error("{pos}: lowering error: {kind}")]
    Lowering { pos: Pos, kind: LoweringErrorKind },
}

pub type Result<T> = std::result::Result<T, Error>;
