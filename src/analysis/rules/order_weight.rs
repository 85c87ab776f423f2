use crate::LintError;
use crate::parser::ast::{
    ContractKind, FunctionDefinition, Node, StateMutability, StateVariableDeclaration, Visibility,
};
use log::trace;
use regex::Regex;
use std::sync::LazyLock;

static STORAGE_POINTER_GETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^_get[A-Za-z0-9]+Storage$").expect("storage getter pattern is valid"));

const INITIALIZER_MODIFIERS: [&str; 2] = ["initializer", "onlyInitializing"];

/// Which list of siblings is being ordered, each has its own weight table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDomain {
    SourceUnit,
    ContractBody,
}

/// Position of a declaration kind in the style guide order
///
/// Ranks are spaced out so the mutability offsets (+2 view, +4 pure) never collide with the next kind,
/// only their relative order means anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWeight {
    pub rank: u32,
    pub label: String,
}

impl OrderWeight {
    fn new(rank: u32, label: impl Into<String>) -> Self {
        Self {
            rank,
            label: label.into(),
        }
    }
}

/// Maps a declaration to its weight in `domain`
///
/// A kind with no weight in the domain is an error, never a default position
pub fn classify(node: &Node, domain: OrderDomain) -> Result<OrderWeight, LintError> {
    let weight = match domain {
        OrderDomain::SourceUnit => source_unit_part_order(node)?,
        OrderDomain::ContractBody => contract_part_order(node)?,
    };
    trace!(
        "{} on line {} weighs {} ({})",
        node.kind_name(),
        node.line(),
        weight.rank,
        weight.label
    );
    Ok(weight)
}

fn source_unit_part_order(node: &Node) -> Result<OrderWeight, LintError> {
    let weight = match node {
        Node::PragmaDirective(_) => OrderWeight::new(0, "pragma directive"),
        Node::ImportDirective(_) => OrderWeight::new(10, "import directive"),
        Node::FileLevelConstant(_) => OrderWeight::new(20, "file level constant"),
        Node::EnumDefinition(_) => OrderWeight::new(30, "enum definition"),
        Node::StructDefinition(_) => OrderWeight::new(35, "struct definition"),
        Node::CustomErrorDefinition(_) => OrderWeight::new(40, "custom error definition"),
        Node::FunctionDefinition(_) => OrderWeight::new(50, "free function definition"),
        Node::ContractDefinition(contract) => match contract.kind {
            ContractKind::Interface => OrderWeight::new(60, "interface"),
            ContractKind::Library => OrderWeight::new(70, "library definition"),
            ContractKind::Contract => OrderWeight::new(80, "contract definition"),
            ContractKind::Abstract => OrderWeight::new(80, "abstract contract definition"),
        },
        Node::StateVariableDeclaration(_)
        | Node::EventDefinition(_)
        | Node::TypeDefinition(_)
        | Node::ModifierDefinition(_)
        | Node::UsingForDeclaration(_) => {
            return Err(LintError::UnrecognizedSourceUnitPart(
                node.kind_name().to_string(),
            ));
        }
    };
    Ok(weight)
}

fn contract_part_order(node: &Node) -> Result<OrderWeight, LintError> {
    let weight = match node {
        Node::UsingForDeclaration(_) => OrderWeight::new(0, "using for declaration"),
        Node::EnumDefinition(_) => OrderWeight::new(10, "enum definition"),
        Node::StructDefinition(_) => OrderWeight::new(15, "struct definition"),
        Node::StateVariableDeclaration(decl) => state_variable_order(decl)?,
        Node::EventDefinition(_) => OrderWeight::new(30, "event definition"),
        Node::CustomErrorDefinition(_) => OrderWeight::new(35, "custom error definition"),
        Node::ModifierDefinition(_) => OrderWeight::new(40, "modifier definition"),
        Node::FunctionDefinition(function) => function_order(function)?,
        Node::PragmaDirective(_)
        | Node::ImportDirective(_)
        | Node::FileLevelConstant(_)
        | Node::TypeDefinition(_)
        | Node::ContractDefinition(_) => {
            return Err(LintError::UnrecognizedContractPart(
                node.kind_name().to_string(),
            ));
        }
    };
    Ok(weight)
}

// the grammar forbids declaring several state variables at once, but the tree stores them in a list
fn state_variable_order(decl: &StateVariableDeclaration) -> Result<OrderWeight, LintError> {
    let [variable] = decl.variables.as_slice() else {
        return Err(LintError::MultipleStateVariables(
            decl.loc.start.line,
            decl.variables.len(),
        ));
    };

    let weight = if variable.is_declared_const {
        OrderWeight::new(20, "contract constant declaration")
    } else if variable.is_immutable {
        OrderWeight::new(22, "contract immutable declaration")
    } else {
        OrderWeight::new(25, "state variable declaration")
    };
    Ok(weight)
}

fn function_order(function: &FunctionDefinition) -> Result<OrderWeight, LintError> {
    if function.is_constructor || is_initializer(function) {
        return Ok(OrderWeight::new(50, "constructor/initializer"));
    }

    if function.is_receive_ether {
        return Ok(OrderWeight::new(60, "receive function"));
    }

    if function.is_fallback {
        return Ok(OrderWeight::new(70, "fallback function"));
    }

    let visibility = function.visibility;
    if matches!(visibility, Visibility::Internal | Visibility::Private)
        && function
            .name
            .as_deref()
            .is_some_and(|name| STORAGE_POINTER_GETTER.is_match(name))
    {
        return Ok(OrderWeight::new(22, "storage pointer getter"));
    }

    let base_weight = match visibility {
        Visibility::External => 80,
        Visibility::Public => 90,
        Visibility::Internal => 100,
        Visibility::Private => 110,
        Visibility::Default => {
            return Err(LintError::UnknownFunctionOrder(
                function.display_name().to_string(),
            ));
        }
    };

    Ok(OrderWeight::new(
        base_weight + mutability_weight(function.state_mutability),
        function_label(visibility, function.state_mutability),
    ))
}

/// `initializer` and `onlyInitializing` only count when written without an argument list
fn is_initializer(function: &FunctionDefinition) -> bool {
    function
        .modifiers
        .iter()
        .any(|m| INITIALIZER_MODIFIERS.contains(&m.name.as_str()) && m.is_bare())
}

fn mutability_weight(state_mutability: Option<StateMutability>) -> u32 {
    match state_mutability {
        Some(StateMutability::Constant | StateMutability::View) => 2,
        Some(StateMutability::Pure) => 4,
        _ => 0,
    }
}

/// `"<visibility> <mutability> function"`, or `"<visibility> function"` with a single space when the
/// mutability is unset
fn function_label(visibility: Visibility, state_mutability: Option<StateMutability>) -> String {
    match state_mutability {
        Some(mutability) => format!("{} {} function", visibility.as_str(), mutability.as_str()),
        None => format!("{} function", visibility.as_str()),
    }
}
