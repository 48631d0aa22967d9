//! Component §6.4: the handwritten runtime's required surface.
//!
//! Zero behavior lives here — these are the member names `lowering`
//! refers to by string when it emits a call into the `$` namespace. The
//! runtime itself is an external collaborator (§1), never implemented in
//! this crate; this module exists so every lowering rule can cite one
//! constant instead of a bare string literal scattered across the
//! `lowering::*` modules.

/// One member of the `$` runtime namespace the emitted TL calls into.
pub struct RuntimeApi;

impl RuntimeApi {
    pub const VAR_REF: &'static str = "varRef";
    pub const MARK_AS_STRUCT_VALUE: &'static str = "markAsStructValue";
    pub const MAKE_CHANNEL: &'static str = "makeChannel";
    pub const MAKE_MAP: &'static str = "makeMap";
    pub const MAKE_SLICE: &'static str = "makeSlice";
    pub const ARRAY_TO_SLICE: &'static str = "arrayToSlice";
    pub const LEN: &'static str = "len";
    pub const CAP: &'static str = "cap";
    pub const APPEND: &'static str = "append";
    pub const COPY: &'static str = "copy";
    pub const DELETE_MAP_ENTRY: &'static str = "deleteMapEntry";
    pub const MAP_SET: &'static str = "mapSet";
    pub const STRING_TO_BYTES: &'static str = "stringToBytes";
    pub const BYTES_TO_STRING: &'static str = "bytesToString";
    pub const STRING_TO_RUNES: &'static str = "stringToRunes";
    pub const RUNES_TO_STRING: &'static str = "runesToString";
    pub const BYTE: &'static str = "byte";
    pub const PANIC: &'static str = "panic";
    pub const PRINTLN: &'static str = "println";
    pub const RECOVER: &'static str = "recover";
    pub const CLEAR: &'static str = "clear";
    pub const DISPOSABLE_STACK: &'static str = "DisposableStack";
    pub const ASYNC_DISPOSABLE_STACK: &'static str = "AsyncDisposableStack";
    pub const GO_ERROR: &'static str = "GoError";
    pub const VAR_REF_TYPE: &'static str = "VarRef";
    pub const SLICE_TYPE: &'static str = "Slice";
    pub const REGISTER_INTERFACE_TYPE: &'static str = "registerInterfaceType";
    pub const WRAP_PRIMITIVE_ERROR: &'static str = "wrapPrimitiveError";
    pub const NORMALIZE_BYTES: &'static str = "normalizeBytes";

    /// Every member name, for the WASM shim's `$`-namespace presence check
    /// and for fixture tests asserting no lowering rule references a name
    /// outside this contract.
    pub const ALL: &'static [&'static str] = &[
        Self::VAR_REF,
        Self::MARK_AS_STRUCT_VALUE,
        Self::MAKE_CHANNEL,
        Self::MAKE_MAP,
        Self::MAKE_SLICE,
        Self::ARRAY_TO_SLICE,
        Self::LEN,
        Self::CAP,
        Self::APPEND,
        Self::COPY,
        Self::DELETE_MAP_ENTRY,
        Self::MAP_SET,
        Self::STRING_TO_BYTES,
        Self::BYTES_TO_STRING,
        Self::STRING_TO_RUNES,
        Self::RUNES_TO_STRING,
        Self::BYTE,
        Self::PANIC,
        Self::PRINTLN,
        Self::RECOVER,
        Self::CLEAR,
        Self::DISPOSABLE_STACK,
        Self::ASYNC_DISPOSABLE_STACK,
        Self::GO_ERROR,
        Self::VAR_REF_TYPE,
        Self::SLICE_TYPE,
        Self::REGISTER_INTERFACE_TYPE,
        Self::WRAP_PRIMITIVE_ERROR,
        Self::NORMALIZE_BYTES,
    ];
}
