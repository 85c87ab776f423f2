use crate::LintError;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::DiagnosticSeverity;
use crate::analysis::rule::SemanticRule;
use crate::analysis::slot_formula::{derive_slot, format_slot};
use crate::parser::ast::{
    AstNode, Expression, FileLevelConstant, SourceSpan, TypeName, VariableDeclaration,
};
use primitive_types::U256;
use regex::Regex;
use std::sync::LazyLock;

pub const SLOT_SUFFIX: &str = "_STORAGE_LOCATION";

static SLOT_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@custom:slot\s+(\S+)").expect("slot annotation pattern is valid"));

/// The parts of a constant that matter for slot validation, contract constants and file level
/// constants store their initializer under different names
pub struct StorageSlotDeclaration<'a> {
    pub name: &'a str,
    pub type_name: &'a TypeName,
    pub value: Option<&'a Expression>,
    pub span: SourceSpan,
}

impl<'a> From<&'a VariableDeclaration> for StorageSlotDeclaration<'a> {
    fn from(variable: &'a VariableDeclaration) -> Self {
        Self {
            name: &variable.name,
            type_name: &variable.type_name,
            value: variable.expression.as_ref(),
            span: variable.loc,
        }
    }
}

impl<'a> From<&'a FileLevelConstant> for StorageSlotDeclaration<'a> {
    fn from(constant: &'a FileLevelConstant) -> Self {
        Self {
            name: &constant.name,
            type_name: &constant.type_name,
            value: constant.initial_value.as_ref(),
            span: constant.loc,
        }
    }
}

/// Only constants named `*_STORAGE_LOCATION` claim to be a slot
pub fn is_slot_declaration(is_declared_const: bool, name: &str) -> bool {
    is_declared_const && name.ends_with(SLOT_SUFFIX)
}

// Rule to check that storage slot constants hold the slot derived from their @custom:slot id
pub struct ValidStorageSlotRule;

impl SemanticRule for ValidStorageSlotRule {
    fn id(&self) -> &'static str {
        "valid-storage-slot"
    }

    fn description(&self) -> &'static str {
        "Checks that constant variables used as storage slots have the proper value"
    }

    fn severity(&self) -> DiagnosticSeverity {
        DiagnosticSeverity::Warning
    }

    fn check(&self, ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError> {
        match node {
            AstNode::StateVariable(variable)
                if is_slot_declaration(variable.is_declared_const, &variable.name) =>
            {
                self.check_declaration(ctx, StorageSlotDeclaration::from(*variable))
            }
            AstNode::FileLevelConstant(constant)
                if is_slot_declaration(constant.is_declared_const, &constant.name) =>
            {
                self.check_declaration(ctx, StorageSlotDeclaration::from(*constant))
            }
            _ => Ok(()),
        }
    }
}

impl ValidStorageSlotRule {
    /// Type and literal checks always run, without an annotation the value can not be compared
    pub fn check_declaration(
        &self,
        ctx: &mut AnalysisContext,
        decl: StorageSlotDeclaration,
    ) -> Result<(), LintError> {
        if !decl.type_name.is_elementary("bytes32") {
            self.report(ctx, format!("{} must be of type bytes32", decl.name), decl.span);
        }

        let literal = match decl.value {
            Some(Expression::NumberLiteral {
                number,
                subdenomination,
            }) => Some(parse_number_literal(number, subdenomination.as_deref())),
            _ => {
                self.report(ctx, format!("{} must be a number literal", decl.name), decl.span);
                None
            }
        };

        let line = decl.span.start.line;
        let annotation = line
            .checked_sub(1)
            .and_then(|previous| ctx.source_line(previous))
            .and_then(slot_id);
        let Some(id) = annotation else {
            self.report(
                ctx,
                "missing @custom:slot before slot declaration".to_string(),
                decl.span,
            );
            return Ok(());
        };

        if let Some(value) = literal {
            let expected = derive_slot(id)?;
            if value != Some(expected) {
                self.report(
                    ctx,
                    format!(
                        "Invalid storage slot for \"{}\" (line {}), expected {}",
                        id,
                        line,
                        format_slot(expected)
                    ),
                    decl.span,
                );
            }
        }

        Ok(())
    }

    fn report(&self, ctx: &mut AnalysisContext, message: String, span: SourceSpan) {
        ctx.report(self.id(), self.severity(), message, span);
    }
}

/// The id following `@custom:slot` on `line`, if any
pub fn slot_id(line: &str) -> Option<&str> {
    SLOT_ANNOTATION
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// `None` when the literal is not an integer that fits in 256 bits, such a literal never matches a slot
pub fn parse_number_literal(number: &str, subdenomination: Option<&str>) -> Option<U256> {
    if subdenomination.is_some() {
        return None;
    }

    let digits: String = number.chars().filter(|c| *c != '_').collect();
    match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex_digits) if !hex_digits.is_empty() => U256::from_str_radix(hex_digits, 16).ok(),
        Some(_) => None,
        None if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            U256::from_dec_str(&digits).ok()
        }
        None => None,
    }
}
