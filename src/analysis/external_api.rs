use crate::analysis::SemanticAnalyzer;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::{Diagnostic, DiagnosticCollector, DiagnosticSeverity};
use crate::parser::ast::SourceUnit;
use crate::parser::parse_source_unit;
use crate::{LintError, kiln_error};
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::{CStr, CString, c_char};
use std::ptr;

/// What the host wants changed from the defaults, handed over already loaded
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub disabled_rules: Vec<String>,
    pub severity: HashMap<String, DiagnosticSeverity>,
    pub warning_as_error: bool,
    pub error_limit: Option<usize>,
}

impl AnalyzerConfig {
    pub fn from_json(json: &str) -> Result<Self, LintError> {
        serde_json::from_str(json).map_err(LintError::InvalidConfig)
    }
}

impl SemanticAnalyzer {
    pub fn analyze_with_config(
        &self,
        unit: &SourceUnit,
        source: &str,
        config: &AnalyzerConfig,
    ) -> Result<Vec<Diagnostic>, LintError> {
        let mut collector = DiagnosticCollector::new();
        {
            let mut ctx = AnalysisContext::new(&mut collector, source);

            // Apply configuration
            ctx.disabled_rules.extend(config.disabled_rules.iter().cloned());
            ctx.severity_overrides.extend(
                config
                    .severity
                    .iter()
                    .map(|(rule_id, severity)| (rule_id.clone(), *severity)),
            );

            self.visit_source_unit(&mut ctx, unit)?;
        }

        // Process diagnostics based on config
        let mut diagnostics = collector.into_diagnostics();

        if config.warning_as_error {
            for diag in &mut diagnostics {
                if diag.severity == DiagnosticSeverity::Warning {
                    diag.severity = DiagnosticSeverity::Error;
                }
            }
        }

        if let Some(limit) = config.error_limit {
            let error_positions: Vec<usize> = diagnostics
                .iter()
                .enumerate()
                .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
                .map(|(index, _)| index)
                .collect();
            let error_count = error_positions.len();

            if error_count > limit {
                // everything after the limit-th error goes, whatever its severity
                let cut = match limit {
                    0 => error_positions[0],
                    _ => error_positions[limit - 1] + 1,
                };
                diagnostics.truncate(cut);
                diagnostics.push(Diagnostic {
                    message: format!("Too many errors ({}), stopping analysis", error_count),
                    span: Default::default(),
                    severity: DiagnosticSeverity::Info,
                    rule_id: "error-limit".to_string(),
                });
            }
        }

        Ok(diagnostics)
    }

    // Method to get all available rules
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str, DiagnosticSeverity)> {
        self.rule_registry
            .get_all_rules()
            .iter()
            .map(|rule| (rule.id(), rule.description(), rule.severity()))
            .collect()
    }
}

/// Lints a file in one call: the parser's json tree, the raw source and an optional json config (may be null)
///
/// Returns the diagnostics as a json array, or a null pointer if the tree could not be analyzed, the reason
/// is available through `kiln_get_errors`
///
/// # Warning
/// The returned string has to be freed with `kiln_free_string`, the arguments stay owned by the caller
#[unsafe(no_mangle)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe extern "C" fn kiln_lint_json(
    ast_json: *const c_char,
    source: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    let result = lint_c_strings(ast_json, source, config_json);

    match result {
        Ok(json) => match CString::new(json) {
            Ok(cstring) => cstring.into_raw(),
            Err(_) => {
                kiln_error("failed to create CString from the diagnostics");
                ptr::null_mut()
            }
        },
        Err(err) => {
            kiln_error(&format!("kiln_lint_json failed: {}", err));
            ptr::null_mut()
        }
    }
}

/// The safe half of `kiln_lint_json`
pub fn lint_json(ast_json: &str, source: &str, config: &AnalyzerConfig) -> Result<String, LintError> {
    let unit = parse_source_unit(ast_json)?;
    let diagnostics = SemanticAnalyzer::new().analyze_with_config(&unit, source, config)?;
    serde_json::to_string(&diagnostics).map_err(LintError::Serialization)
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn lint_c_strings(
    ast_json: *const c_char,
    source: *const c_char,
    config_json: *const c_char,
) -> Result<String, LintError> {
    let ast_json = read_c_str(ast_json, "syntax tree")?;
    let source = read_c_str(source, "source")?;
    let config = if config_json.is_null() {
        AnalyzerConfig::default()
    } else {
        AnalyzerConfig::from_json(read_c_str(config_json, "config")?)?
    };
    lint_json(ast_json, source, &config)
}

#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn read_c_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str, LintError> {
    if ptr.is_null() {
        return Err(LintError::NullPointer(what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|err| LintError::Utf8Error(format!("{} is not valid UTF-8: {}", what, err)))
}
