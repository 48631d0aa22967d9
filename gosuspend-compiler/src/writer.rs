//! The `TlWriter` sink contract and a textual reference implementation.
//!
//! The lowering policy never builds a TL AST; it calls straight into this
//! trait with already-decided strings, the same append-only-stream shape
//! the teacher's own backends write through.

/// Stateful append-only TL output stream: indent/dedent tracked by the
/// writer itself, one instance per emitted file.
pub trait TlWriter {
    fn write_line(&mut self, line: &str);
    fn write_literally(&mut self, text: &str);
    fn write_import(&mut self, external_name: &str, path: &str);
    fn indent(&mut self);
    fn dedent(&mut self);
    /// Discards whatever has been written so far — the driver's response to
    /// a lowering error mid-file (§7: "partial output may already be in the
    /// sink").
    fn abort(&mut self);
}

/// Minimal textual `TlWriter`, sufficient to drive the fixture tests. Not a
/// full TL pretty-printer (no source-map emission, no comment
/// preservation) — those live in the out-of-scope real backend.
#[derive(Debug, Default)]
pub struct StringTlWriter {
    buf: String,
    depth: usize,
    imports: Vec<String>,
    aborted: bool,
}

impl StringTlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> String {
        if self.aborted {
            return String::new();
        }
        let mut out = self.imports.join("\n");
        if !self.imports.is_empty() {
            out.push('\n');
            out.push('\n');
        }
        out.push_str(&self.buf);
        out
    }
}

impl TlWriter for StringTlWriter {
    fn write_line(&mut self, line: &str) {
        if line.is_empty() {
            self.buf.push('\n');
            return;
        }
        self.buf.push_str(&"  ".repeat(self.depth));
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn write_literally(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    fn write_import(&mut self, external_name: &str, path: &str) {
        self.imports.push(format!("import * as {external_name} from \"{path}\";"));
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.buf.clear();
        self.imports.clear();
    }
}
