use crate::analysis::rule::SemanticRule;

/// Rules run in registration order, so diagnostics come out in a stable order
pub struct RuleRegistry {
    rules: Vec<Box<dyn SemanticRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// registering a rule with an id that is already taken replaces the old rule
    pub fn register<R: SemanticRule + 'static>(&mut self, rule: R) {
        self.rules.retain(|existing| existing.id() != rule.id());
        self.rules.push(Box::new(rule));
    }

    pub fn get_all_rules(&self) -> Vec<&dyn SemanticRule> {
        self.rules.iter().map(|r| r.as_ref()).collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
