use crate::LintError;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::DiagnosticSeverity;
use crate::parser::ast::AstNode;

pub trait SemanticRule: Send + Sync {
    // Unique identifier for this rule, also the key used by the config
    fn id(&self) -> &'static str;

    // Short description of what this rule checks
    fn description(&self) -> &'static str;

    // Severity of violations unless the config overrides it
    fn severity(&self) -> DiagnosticSeverity;

    // Called for every node the analyzer visits, rules ignore the nodes they don't care about.
    // An Err aborts the analysis of the whole tree
    fn check(&self, ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError>;
}
