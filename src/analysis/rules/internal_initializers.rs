use crate::LintError;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::DiagnosticSeverity;
use crate::analysis::rule::SemanticRule;
use crate::parser::ast::{AstNode, Node, Visibility};

// Rule to check that onlyInitializing functions can't be called from outside
pub struct InternalInitializersRule;

impl SemanticRule for InternalInitializersRule {
    fn id(&self) -> &'static str {
        "internal-initializers"
    }

    fn description(&self) -> &'static str {
        "Checks that functions with the onlyInitializing modifier are internal or private"
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Error
    }

    fn check(&self, ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError> {
        let AstNode::Contract(contract) = node else {
            return Ok(());
        };

        for sub_node in &contract.sub_nodes {
            let Node::FunctionDefinition(function) = sub_node else {
                continue;
            };
            if !function.has_modifier("onlyInitializing") {
                continue;
            }
            if matches!(function.visibility, Visibility::Internal | Visibility::Private) {
                continue;
            }

            ctx.report(
                self.id(),
                self.severity(),
                format!(
                    "Function {} has onlyInitializing modifier but visibility is {}. It should be internal or private.",
                    function.display_name(),
                    function.visibility.as_str()
                ),
                function.loc,
            );
        }

        Ok(())
    }
}
