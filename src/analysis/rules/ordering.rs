use crate::LintError;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::DiagnosticSeverity;
use crate::analysis::rule::SemanticRule;
use crate::analysis::rules::order_weight::{OrderDomain, OrderWeight, classify};
use crate::parser::ast::{AstNode, Node};

// Rule to check the order of declarations in a file and inside each contract
pub struct OrderingRule;

impl SemanticRule for OrderingRule {
    fn id(&self) -> &'static str {
        "ordering"
    }

    fn description(&self) -> &'static str {
        "Checks the order of elements in the file and inside each contract, according to the style guide"
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Warning
    }

    fn check(&self, ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError> {
        match node {
            AstNode::SourceUnit(unit) => self.check_order(ctx, &unit.children, OrderDomain::SourceUnit),
            AstNode::Contract(contract) => {
                self.check_order(ctx, &contract.sub_nodes, OrderDomain::ContractBody)
            }
            _ => Ok(()),
        }
    }
}

impl OrderingRule {
    /// Reports every sibling that sits above something it should come after
    ///
    /// All siblings are classified before anything is reported, so an unknown kind aborts without partial output
    pub fn check_order(
        &self,
        ctx: &mut AnalysisContext,
        siblings: &[Node],
        domain: OrderDomain,
    ) -> Result<(), LintError> {
        if siblings.is_empty() {
            return Ok(());
        }

        let weights = siblings
            .iter()
            .map(|sibling| classify(sibling, domain))
            .collect::<Result<Vec<_>, _>>()?;

        for (index, later) in first_violations(&weights) {
            let message = format!(
                "Function order is incorrect, {} can not go before {} (line {})",
                weights[index].label,
                weights[later].label,
                siblings[later].line()
            );
            ctx.report(self.id(), self.severity(), message, siblings[index].span());
        }

        Ok(())
    }
}

/// For each position, the nearest later position with a strictly smaller rank
///
/// Only the first hit per position counts, one misplaced declaration gives one diagnostic and not one per
/// declaration it jumped over
pub fn first_violations(weights: &[OrderWeight]) -> Vec<(usize, usize)> {
    let mut violations = Vec::new();
    for (index, current) in weights.iter().enumerate() {
        let later = weights[index + 1..]
            .iter()
            .position(|other| other.rank < current.rank);
        if let Some(offset) = later {
            violations.push((index, index + 1 + offset));
        }
    }
    violations
}
