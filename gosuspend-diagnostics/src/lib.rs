// Diagnostic model shared by every stage of the analysis/lowering pipeline.
// Spans are tracked out-of-band (see span_map) so the typed AST itself never
// has to carry source-position fields.

use colored::Colorize;
use std::fmt;
use std::path::Path;

pub mod span_map;
pub use span_map::SpanMap;

/// Source code location (line, column, file) in the SL input.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

impl Span {
    pub fn new(file: String, line: usize, column: usize, length: usize) -> Self {
        Self {
            file,
            line,
            column,
            length,
        }
    }

    pub fn from_file_and_span(file: &str, source: &str, span: std::ops::Range<usize>) -> Self {
        let before = &source[..span.start];
        let line = before.chars().filter(|&c| c == '\n').count() + 1;
        let column = before
            .rfind('\n')
            .map_or(before.len() + 1, |pos| before.len() - pos);
        let length = span.end.saturating_sub(span.start).max(1);

        Self {
            file: file.to_string(),
            line,
            column,
            length,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: "<unknown>".to_string(),
            line: 0,
            column: 0,
            length: 0,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self {
            file: path.display().to_string(),
            line: 0,
            column: 0,
            length: 0,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLevel {
    Error,
    Warning,
    Info,
    Note,
    Help,
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorLevel::Error => write!(f, "{}", "error".red().bold()),
            ErrorLevel::Warning => write!(f, "{}", "warning".yellow().bold()),
            ErrorLevel::Info => write!(f, "{}", "info".blue().bold()),
            ErrorLevel::Note => write!(f, "{}", "note".cyan().bold()),
            ErrorLevel::Help => write!(f, "{}", "help".green().bold()),
        }
    }
}

/// A related secondary span, e.g. pointing at a prior declaration.
#[derive(Debug, Clone)]
pub struct RelatedSpan {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Suggestion {
    pub message: String,
    pub replacement: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    pub code: String,
    pub message: String,
    pub span: Span,
    pub primary_label: Option<String>,
    pub notes: Vec<String>,
    pub help: Option<String>,
    pub suggestion: Option<Suggestion>,
    pub related: Vec<RelatedSpan>,
}

impl Diagnostic {
    pub fn new(level: ErrorLevel, code: &str, message: String, span: Span) -> Self {
        Self {
            level,
            code: code.to_string(),
            message,
            span,
            primary_label: None,
            notes: Vec::new(),
            help: None,
            suggestion: None,
            related: Vec::new(),
        }
    }

    pub fn error(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Error, code, message, span)
    }

    pub fn warning(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Warning, code, message, span)
    }

    pub fn info(code: &str, message: String, span: Span) -> Self {
        Self::new(ErrorLevel::Info, code, message, span)
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn with_primary_label(mut self, label: String) -> Self {
        self.primary_label = Some(label);
        self
    }

    pub fn with_related(mut self, span: Span, message: String) -> Self {
        self.related.push(RelatedSpan { span, message });
        self
    }

    pub fn with_suggestion(mut self, message: String, replacement: String, span: Span) -> Self {
        self.suggestion = Some(Suggestion {
            message,
            replacement,
            span,
        });
        self
    }

    /// Rust-style rendering with a source snippet.
    pub fn format(&self, source_code: &str) -> String {
        let mut output = format!("{}[{}]: {}\n", self.level, self.code, self.message.bold());
        output.push_str(&format!(
            " {} {}:{}:{}\n",
            "-->".cyan().bold(),
            self.span.file,
            self.span.line,
            self.span.column
        ));

        if let Some(snippet) = self.get_source_snippet(source_code) {
            output.push_str(&snippet);
        }

        for related in &self.related {
            output.push_str(&format!(
                " {} {} ({})\n",
                "=".cyan().bold(),
                related.message,
                related.span
            ));
        }

        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }

        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }

        output
    }

    fn format_simple(&self) -> String {
        let mut output = format!("{}[{}]: {}\n", self.level, self.code, self.message.bold());
        output.push_str(&format!(
            " {} {}:{}:{}\n",
            "-->".cyan().bold(),
            self.span.file,
            self.span.line,
            self.span.column
        ));
        for note in &self.notes {
            output.push_str(&format!(" {} {}\n", "=".cyan().bold(), note.cyan()));
        }
        if let Some(help) = &self.help {
            output.push_str(&format!(" {} {}\n", "help:".green().bold(), help));
        }
        output
    }

    fn get_source_snippet(&self, source_code: &str) -> Option<String> {
        let lines: Vec<&str> = source_code.lines().collect();
        if self.span.line == 0 || self.span.line > lines.len() {
            return None;
        }
        let line = lines[self.span.line - 1];
        let line_num_width = self.span.line.to_string().len().max(2);

        let mut snippet = format!(" {}\n", " ".repeat(line_num_width + 1).cyan());
        snippet.push_str(&format!(
            " {} {} {}\n",
            format!("{:>width$}", self.span.line, width = line_num_width)
                .cyan()
                .bold(),
            "|".cyan().bold(),
            line
        ));
        let padding = " ".repeat(line_num_width + 3 + self.span.column.saturating_sub(1));
        let underline = "^".repeat(self.span.length.max(1));
        snippet.push_str(&format!(
            " {} {}{}\n",
            " ".repeat(line_num_width + 1).cyan(),
            padding,
            underline.red().bold()
        ));
        Some(snippet)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

/// Diagnostic collection and reporting engine. Every pipeline stage emits
/// into a shared engine rather than returning eagerly on the first problem,
/// except for the two sort components (§4.E), which fail loudly per
/// distilled-spec §7.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    info_count: usize,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            ErrorLevel::Error => self.error_count += 1,
            ErrorLevel::Warning => self.warning_count += 1,
            ErrorLevel::Info => self.info_count += 1,
            _ => {}
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn emit_error(&mut self, code: &str, message: String, span: Span) {
        self.emit(Diagnostic::error(code, message, span));
    }

    pub fn emit_warning(&mut self, code: &str, message: String, span: Span) {
        self.emit(Diagnostic::warning(code, message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn print_all(&self, source_code: &str) {
        for diag in &self.diagnostics {
            eprintln!("{}", diag.format(source_code));
        }
    }

    pub fn print_summary(&self) {
        if self.error_count > 0 {
            eprintln!(
                "\n{}: {} error{} emitted",
                "error".red().bold(),
                self.error_count,
                if self.error_count == 1 { "" } else { "s" }
            );
        }
        if self.warning_count > 0 {
            eprintln!(
                "{}: {} warning{} emitted",
                "warning".yellow().bold(),
                self.warning_count,
                if self.warning_count == 1 { "" } else { "s" }
            );
        }
    }

    /// Export diagnostics as JSON, matching `schemas/diagnostic.schema.json`.
    pub fn to_json(&self) -> String {
        let mut json = String::from("{\"diagnostics\":[");

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                json.push(',');
            }

            let level_str = match diag.level {
                ErrorLevel::Error => "error",
                ErrorLevel::Warning => "warning",
                ErrorLevel::Info => "info",
                ErrorLevel::Note => "note",
                ErrorLevel::Help => "help",
            };

            json.push_str(&format!(
                "{{\"level\":\"{}\",\"code\":\"{}\",\"message\":\"{}\",\"file\":\"{}\",\"line\":{},\"column\":{},\"length\":{}",
                level_str,
                diag.code,
                diag.message.replace('"', "\\\""),
                diag.span.file,
                diag.span.line,
                diag.span.column,
                diag.span.length
            ));

            if let Some(label) = &diag.primary_label {
                json.push_str(&format!(
                    ",\"primary_label\":\"{}\"",
                    label.replace('"', "\\\"")
                ));
            }

            if !diag.notes.is_empty() {
                json.push_str(",\"notes\":[");
                for (j, note) in diag.notes.iter().enumerate() {
                    if j > 0 {
                        json.push(',');
                    }
                    json.push_str(&format!("\"{}\"", note.replace('"', "\\\"")));
                }
                json.push(']');
            }

            if let Some(help) = &diag.help {
                json.push_str(&format!(",\"help\":\"{}\"", help.replace('"', "\\\"")));
            }

            if !diag.related.is_empty() {
                json.push_str(",\"related\":[");
                for (j, rel) in diag.related.iter().enumerate() {
                    if j > 0 {
                        json.push(',');
                    }
                    json.push_str(&format!(
                        "{{\"file\":\"{}\",\"line\":{},\"column\":{},\"message\":\"{}\"}}",
                        rel.span.file,
                        rel.span.line,
                        rel.span.column,
                        rel.message.replace('"', "\\\"")
                    ));
                }
                json.push(']');
            }

            json.push('}');
        }

        json.push_str("]}");
        json
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.info_count = 0;
    }
}

/// Diagnostic codes for the analysis/lowering pipeline. Grouped the way the
/// distilled spec's own error taxonomy (§7) is grouped.
pub mod error_codes {
    // Upstream oracle errors, surfaced verbatim (E00xx).
    pub const PARSE_ERROR: &str = "E0001";
    pub const TYPE_CHECK_ERROR: &str = "E0002";

    // Declaration-sort cycles (§4.E) (E01xx).
    pub const CIRCULAR_TYPE_DEPENDENCY: &str = "E0100";
    pub const CIRCULAR_VALUE_INITIALIZER: &str = "E0101";

    // Lowering errors (§7) (E02xx).
    pub const UNKNOWN_AST_VARIANT: &str = "E0200";
    pub const UNSUPPORTED_TYPE_CONVERSION: &str = "E0201";
    pub const UNSUPPORTED_COMPOSITE_LITERAL: &str = "E0202";
    pub const MISSING_TYPE_INFO: &str = "E0203";
    pub const INVALID_BUILTIN_ARGS: &str = "E0204";
    pub const UNKNOWN_ASSIGN_OPERATOR: &str = "E0205";
}
