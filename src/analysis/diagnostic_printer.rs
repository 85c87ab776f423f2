use crate::analysis::diagnostic::{Diagnostic, DiagnosticSeverity};
use colored::Colorize;
use std::fmt::Write;

pub struct DiagnosticPrinter {
    pub use_colors: bool,
    pub source_code: String,
    pub file_name: String,
}

impl DiagnosticPrinter {
    pub fn new(source_code: String, file_name: String, use_colors: Option<bool>) -> Self {
        Self {
            use_colors: use_colors.unwrap_or(false),
            source_code,
            file_name,
        }
    }

    /// `file:line:column: severity: message [rule]`, followed by the offending line and a caret
    pub fn sprint_errors(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            let start = diagnostic.span.start;
            writeln!(
                out,
                "{}:{}:{}: {}: {} [{}]",
                self.file_name,
                start.line,
                start.column + 1,
                self.severity_label(diagnostic.severity),
                diagnostic.message,
                self.rule_label(&diagnostic.rule_id)
            )
            .ok();

            let source_line = start
                .line
                .checked_sub(1)
                .and_then(|index| self.source_code.lines().nth(index));
            if let Some(text) = source_line {
                let gutter = " ".repeat(start.line.to_string().len());
                writeln!(out, "{} | {}", start.line, text).ok();
                writeln!(out, "{} | {}^", gutter, " ".repeat(start.column)).ok();
            }
        }
        out
    }

    pub fn print_errors(&self, diagnostics: &[Diagnostic]) {
        print!("{}", self.sprint_errors(diagnostics))
    }

    fn severity_label(&self, severity: DiagnosticSeverity) -> String {
        let label = severity.as_str();
        if !self.use_colors {
            return label.to_string();
        }
        match severity {
            DiagnosticSeverity::Error => label.red().bold().to_string(),
            DiagnosticSeverity::Warning => label.yellow().bold().to_string(),
            DiagnosticSeverity::Info => label.blue().bold().to_string(),
        }
    }

    fn rule_label(&self, rule_id: &str) -> String {
        if self.use_colors {
            rule_id.dimmed().to_string()
        } else {
            rule_id.to_string()
        }
    }
}
