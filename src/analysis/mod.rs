pub mod context;
pub mod diagnostic;
pub mod diagnostic_printer;
pub mod external_api;
pub mod rule;
pub mod rule_registry;
pub mod rules;
pub mod slot_formula;

use crate::LintError;
use crate::analysis::context::AnalysisContext;
use crate::analysis::diagnostic::{Diagnostic, DiagnosticCollector, Reporter};
use crate::analysis::rule::SemanticRule;
use crate::analysis::rule_registry::RuleRegistry;
use crate::analysis::rules::internal_initializers::InternalInitializersRule;
use crate::analysis::rules::ordering::OrderingRule;
use crate::analysis::rules::storage_slot::ValidStorageSlotRule;
use crate::parser::ast::*;
use log::{debug, trace};
use std::borrow::Cow;

/// Walks a source unit and hands every interesting node to the registered rules
///
/// Holds no per tree state, one analyzer can check any number of files
pub struct SemanticAnalyzer {
    rule_registry: RuleRegistry,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut registry = RuleRegistry::new();

        // Register built-in rules
        registry.register(OrderingRule);
        registry.register(ValidStorageSlotRule);
        registry.register(InternalInitializersRule);

        Self {
            rule_registry: registry,
        }
    }

    /// Adds a rule next to the built-in ones, a rule with the same id is replaced
    pub fn register<R: SemanticRule + 'static>(&mut self, rule: R) {
        self.rule_registry.register(rule);
    }

    pub fn analyze(&self, unit: &SourceUnit, source: &str) -> Result<Vec<Diagnostic>, LintError> {
        let mut collector = DiagnosticCollector::new();
        self.analyze_with_reporter(unit, source, &mut collector)?;
        Ok(collector.into_diagnostics())
    }

    /// Diagnostics reach `reporter` as they are found, on error the ones already reported stay reported
    pub fn analyze_with_reporter(
        &self,
        unit: &SourceUnit,
        source: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<(), LintError> {
        let mut ctx = AnalysisContext::new(reporter, source);
        self.visit_source_unit(&mut ctx, unit)
    }

    fn visit_source_unit(&self, ctx: &mut AnalysisContext, unit: &SourceUnit) -> Result<(), LintError> {
        debug!("analyzing source unit with {} top level nodes", unit.children.len());
        self.apply_rules(ctx, &AstNode::SourceUnit(unit))?;

        for child in &unit.children {
            match child {
                Node::ContractDefinition(contract) => self.visit_contract(ctx, contract)?,
                Node::FileLevelConstant(constant) => {
                    self.apply_rules(ctx, &AstNode::FileLevelConstant(constant))?
                }
                Node::FunctionDefinition(function) => {
                    self.apply_rules(ctx, &AstNode::Function(function))?
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn visit_contract(&self, ctx: &mut AnalysisContext, contract: &ContractDefinition) -> Result<(), LintError> {
        debug!(
            "analyzing {:?} {} with {} members",
            contract.kind,
            contract.name,
            contract.sub_nodes.len()
        );
        self.apply_rules(ctx, &AstNode::Contract(contract))?;

        for sub_node in &contract.sub_nodes {
            match sub_node {
                Node::StateVariableDeclaration(decl) => {
                    for variable in &decl.variables {
                        // some producers only locate the wrapping declaration
                        let variable = if variable.loc == SourceSpan::default() {
                            Cow::Owned(VariableDeclaration {
                                loc: decl.loc,
                                ..variable.clone()
                            })
                        } else {
                            Cow::Borrowed(variable)
                        };
                        self.apply_rules(ctx, &AstNode::StateVariable(&*variable))?;
                    }
                }
                Node::FunctionDefinition(function) => {
                    self.apply_rules(ctx, &AstNode::Function(function))?
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn apply_rules(&self, ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError> {
        for rule in self.rule_registry.get_all_rules() {
            if ctx.is_rule_enabled(rule.id()) {
                rule.check(ctx, node)?;
            } else {
                trace!("rule {} is disabled, skipping", rule.id());
            }
        }
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::diagnostic::DiagnosticSeverity;
    use crate::parser::parse_source_unit;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub(crate) const TEST_SOURCE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity 0.8.20;

contract Vault {
    /// @custom:slot example.storage
    bytes32 private constant VAULT_STORAGE_LOCATION = 0x4ab0469007df719f0a0250319812cbeb94fca41f9f84658cab83f2342976de01;

    function deposit() public payable {}

    function balance() external view returns (uint256) {}

    function __Vault_init() public onlyInitializing {}
}

import "./Base.sol";
"#;

    fn loc(line: usize, column: usize) -> serde_json::Value {
        serde_json::json!({ "start": { "line": line, "column": column }, "end": { "line": line, "column": column + 1 } })
    }

    fn function(name: &str, line: usize, visibility: &str, mutability: Option<&str>, modifiers: &[&str]) -> serde_json::Value {
        let modifiers: Vec<serde_json::Value> = modifiers
            .iter()
            .map(|m| serde_json::json!({ "type": "ModifierInvocation", "name": m, "arguments": null }))
            .collect();
        serde_json::json!({
            "type": "FunctionDefinition",
            "name": name,
            "visibility": visibility,
            "stateMutability": mutability,
            "modifiers": modifiers,
            "isConstructor": false,
            "isReceiveEther": false,
            "isFallback": false,
            "loc": loc(line, 4),
        })
    }

    /// the tree solidity-parser-antlr produces for `TEST_SOURCE`, trimmed to the fields the rules read
    pub(crate) fn test_tree() -> String {
        serde_json::json!({
            "type": "SourceUnit",
            "children": [
                { "type": "PragmaDirective", "name": "solidity", "value": "0.8.20", "loc": loc(2, 0) },
                {
                    "type": "ContractDefinition",
                    "name": "Vault",
                    "kind": "contract",
                    "subNodes": [
                        {
                            "type": "StateVariableDeclaration",
                            "variables": [{
                                "type": "VariableDeclaration",
                                "name": "VAULT_STORAGE_LOCATION",
                                "typeName": { "type": "ElementaryTypeName", "name": "bytes32" },
                                "expression": {
                                    "type": "NumberLiteral",
                                    "number": "0x4ab0469007df719f0a0250319812cbeb94fca41f9f84658cab83f2342976de01",
                                    "subdenomination": null
                                },
                                "isDeclaredConst": true,
                                "isImmutable": false,
                                "loc": loc(6, 4),
                            }],
                            "loc": loc(6, 4),
                        },
                        function("deposit", 8, "public", Some("payable"), &[]),
                        function("balance", 10, "external", Some("view"), &[]),
                        function("__Vault_init", 12, "public", None, &["onlyInitializing"]),
                    ],
                    "loc": loc(4, 0),
                },
                { "type": "ImportDirective", "path": "./Base.sol", "loc": loc(15, 0) },
            ]
        })
        .to_string()
    }

    fn rule_ids(diagnostics: &[Diagnostic]) -> Vec<(&str, usize)> {
        diagnostics
            .iter()
            .map(|d| (d.rule_id.as_str(), d.span.start.line))
            .collect()
    }

    #[test]
    fn test_analysis() {
        let unit = parse_source_unit(&test_tree()).unwrap();
        let diagnostics = SemanticAnalyzer::new().analyze(&unit, TEST_SOURCE).unwrap();

        assert_eq!(
            rule_ids(&diagnostics),
            vec![
                // the contract sits above the import
                ("ordering", 4),
                // public deposit above external balance
                ("ordering", 8),
                // external balance above the initializer
                ("ordering", 10),
                ("internal-initializers", 12),
                ("valid-storage-slot", 6),
            ]
        );
        assert_eq!(
            diagnostics[0].message,
            "Function order is incorrect, contract definition can not go before import directive (line 15)"
        );
        assert_eq!(
            diagnostics[2].message,
            "Function order is incorrect, external view function can not go before constructor/initializer (line 12)"
        );
        assert_eq!(diagnostics[3].severity, DiagnosticSeverity::Error);
    }

    #[test]
    fn test_fatal_error_aborts() {
        let json = serde_json::json!({
            "type": "SourceUnit",
            "children": [{
                "type": "ContractDefinition",
                "name": "Old",
                "kind": "contract",
                "subNodes": [ function("legacy", 3, "default", None, &[]) ],
            }]
        })
        .to_string();
        let unit = parse_source_unit(&json).unwrap();

        let result = SemanticAnalyzer::new().analyze(&unit, "");
        assert!(matches!(result, Err(LintError::UnknownFunctionOrder(name)) if name == "legacy"));
    }

    #[test]
    fn test_variable_without_location_uses_declaration() {
        let mut tree: serde_json::Value = serde_json::from_str(&test_tree()).unwrap();
        tree["children"][1]["subNodes"][0]["variables"][0]
            .as_object_mut()
            .unwrap()
            .remove("loc");
        let unit = parse_source_unit(&tree.to_string()).unwrap();

        let diagnostics = SemanticAnalyzer::new().analyze(&unit, TEST_SOURCE).unwrap();
        let slot_diagnostics: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.rule_id == "valid-storage-slot")
            .collect();
        assert_eq!(slot_diagnostics.len(), 1);
        assert_eq!(slot_diagnostics[0].span.start.line, 6);
        assert_eq!(
            slot_diagnostics[0].message,
            "Invalid storage slot for \"example.storage\" (line 6), expected \
             0x4ab0469007df719f0a0250319812cbeb94fca41f9f84658cab83f2342976de00"
        );
    }

    static VISITED_FUNCTIONS: AtomicUsize = AtomicUsize::new(0);

    struct CountFunctionsRule;

    impl SemanticRule for CountFunctionsRule {
        fn id(&self) -> &'static str {
            "count-functions"
        }

        fn description(&self) -> &'static str {
            "Counts visited functions"
        }

        fn severity(&self) -> DiagnosticSeverity {
            DiagnosticSeverity::Info
        }

        fn check(&self, _ctx: &mut AnalysisContext, node: &AstNode) -> Result<(), LintError> {
            if let AstNode::Function(_) = node {
                VISITED_FUNCTIONS.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[test]
    fn test_registered_rule_sees_functions() {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.register(CountFunctionsRule);

        let unit = parse_source_unit(&test_tree()).unwrap();
        let before = VISITED_FUNCTIONS.load(Ordering::SeqCst);
        analyzer.analyze(&unit, TEST_SOURCE).unwrap();
        assert_eq!(VISITED_FUNCTIONS.load(Ordering::SeqCst) - before, 3);
    }

    #[test]
    fn test_collecting_reporter() {
        let unit = parse_source_unit(&test_tree()).unwrap();
        let mut collector = DiagnosticCollector::new();
        SemanticAnalyzer::new()
            .analyze_with_reporter(&unit, TEST_SOURCE, &mut collector)
            .unwrap();
        assert_eq!(collector.diagnostics().len(), 5);
        assert!(collector.has_errors());
    }
}
