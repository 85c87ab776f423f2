use crate::analysis::diagnostic::{Diagnostic, DiagnosticSeverity, Reporter};
use crate::parser::ast::SourceSpan;
use std::collections::{HashMap, HashSet};

pub struct AnalysisContext<'a> {
    pub reporter: &'a mut dyn Reporter,
    pub source: &'a str,
    pub disabled_rules: HashSet<String>,
    pub severity_overrides: HashMap<String, DiagnosticSeverity>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(reporter: &'a mut dyn Reporter, source: &'a str) -> Self {
        Self {
            reporter,
            source,
            disabled_rules: HashSet::new(),
            severity_overrides: HashMap::new(),
        }
    }

    pub fn is_rule_enabled(&self, rule_id: &str) -> bool {
        !self.disabled_rules.contains(rule_id)
    }

    /// Forwards a diagnostic to the reporter, with the configured severity for `rule_id` if there is one
    pub fn report(
        &mut self,
        rule_id: &str,
        default_severity: DiagnosticSeverity,
        message: String,
        span: SourceSpan,
    ) {
        let severity = self
            .severity_overrides
            .get(rule_id)
            .copied()
            .unwrap_or(default_severity);

        self.reporter.report(Diagnostic {
            message,
            span,
            severity,
            rule_id: rule_id.to_string(),
        });
    }

    /// 1 based, like the `loc` lines coming from the parser
    pub fn source_line(&self, line: usize) -> Option<&'a str> {
        line.checked_sub(1).and_then(|index| self.source.lines().nth(index))
    }
}
