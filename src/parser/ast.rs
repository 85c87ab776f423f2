use serde::{Deserialize, Deserializer, Serialize};

/// Represents a position in the source code, lines are 1 based and columns 0 based
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

/// Represents a span in the source code (start and end positions)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

/// The root of the tree, one per solidity file
#[derive(Debug, Clone, Deserialize)]
pub struct SourceUnit {
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub loc: SourceSpan,
}

/// tracks the nodes rules get to look at, in a single enum
pub enum AstNode<'a> {
    SourceUnit(&'a SourceUnit),
    Contract(&'a ContractDefinition),
    Function(&'a FunctionDefinition),
    StateVariable(&'a VariableDeclaration),
    FileLevelConstant(&'a FileLevelConstant),
}

/// Every declaration that can show up at file level or inside a contract body
///
/// The tag is the `type` field of the parser output. A `type` not listed here fails deserialization
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    PragmaDirective(PragmaDirective),
    ImportDirective(ImportDirective),
    FileLevelConstant(FileLevelConstant),
    EnumDefinition(NamedDefinition),
    StructDefinition(NamedDefinition),
    CustomErrorDefinition(NamedDefinition),
    EventDefinition(NamedDefinition),
    TypeDefinition(NamedDefinition),
    ModifierDefinition(NamedDefinition),
    FunctionDefinition(FunctionDefinition),
    ContractDefinition(ContractDefinition),
    StateVariableDeclaration(StateVariableDeclaration),
    UsingForDeclaration(UsingForDeclaration),
}

impl Node {
    /// the parser's name for this kind of node
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::PragmaDirective(_) => "PragmaDirective",
            Node::ImportDirective(_) => "ImportDirective",
            Node::FileLevelConstant(_) => "FileLevelConstant",
            Node::EnumDefinition(_) => "EnumDefinition",
            Node::StructDefinition(_) => "StructDefinition",
            Node::CustomErrorDefinition(_) => "CustomErrorDefinition",
            Node::EventDefinition(_) => "EventDefinition",
            Node::TypeDefinition(_) => "TypeDefinition",
            Node::ModifierDefinition(_) => "ModifierDefinition",
            Node::FunctionDefinition(_) => "FunctionDefinition",
            Node::ContractDefinition(_) => "ContractDefinition",
            Node::StateVariableDeclaration(_) => "StateVariableDeclaration",
            Node::UsingForDeclaration(_) => "UsingForDeclaration",
        }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            Node::PragmaDirective(node) => node.loc,
            Node::ImportDirective(node) => node.loc,
            Node::FileLevelConstant(node) => node.loc,
            Node::EnumDefinition(node)
            | Node::StructDefinition(node)
            | Node::CustomErrorDefinition(node)
            | Node::EventDefinition(node)
            | Node::TypeDefinition(node)
            | Node::ModifierDefinition(node) => node.loc,
            Node::FunctionDefinition(node) => node.loc,
            Node::ContractDefinition(node) => node.loc,
            Node::StateVariableDeclaration(node) => node.loc,
            Node::UsingForDeclaration(node) => node.loc,
        }
    }

    pub fn line(&self) -> usize {
        self.span().start.line
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PragmaDirective {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportDirective {
    pub path: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

/// A constant declared outside of any contract
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLevelConstant {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default)]
    pub initial_value: Option<Expression>,
    #[serde(default)]
    pub is_declared_const: bool,
    #[serde(default)]
    pub is_immutable: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

/// Enums, structs, errors, events, modifiers and user defined value types, only the name matters here
#[derive(Debug, Clone, Deserialize)]
pub struct NamedDefinition {
    pub name: String,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Contract,
    Abstract,
    Interface,
    Library,
}

/// A contract, abstract contract, interface or library
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDefinition {
    pub name: String,
    pub kind: ContractKind,
    #[serde(default)]
    pub sub_nodes: Vec<Node>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    External,
    Public,
    Internal,
    Private,
    Default,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::External => "external",
            Visibility::Public => "public",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
            Visibility::Default => "default",
        }
    }
}

/// `null` in the parser output means nonpayable, the explicit variant is kept for hand written trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    Constant,
    Payable,
    Nonpayable,
}

impl StateMutability {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::Constant => "constant",
            StateMutability::Payable => "payable",
            StateMutability::Nonpayable => "nonpayable",
        }
    }
}

/// A modifier applied to a function
///
/// The parser writes `"arguments": null` for a modifier used without parentheses, that is `Some(None)`.
/// A tree missing the key entirely gives `None`
#[derive(Debug, Clone, Deserialize)]
pub struct ModifierInvocation {
    pub name: String,
    #[serde(default, deserialize_with = "present")]
    pub arguments: Option<Option<Vec<Expression>>>,
}

impl ModifierInvocation {
    pub fn has_arguments(&self) -> bool {
        matches!(self.arguments, Some(Some(_)))
    }

    /// written without an argument list, as opposed to missing the key or passing `()`
    pub fn is_bare(&self) -> bool {
        matches!(self.arguments, Some(None))
    }
}

// keeps an explicit `null` apart from an absent key
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// A function, constructor, receive or fallback function
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub visibility: Visibility,
    #[serde(default)]
    pub state_mutability: Option<StateMutability>,
    #[serde(default)]
    pub modifiers: Vec<ModifierInvocation>,
    #[serde(default)]
    pub is_constructor: bool,
    #[serde(default)]
    pub is_receive_ether: bool,
    #[serde(default)]
    pub is_fallback: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

impl FunctionDefinition {
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name.as_str(),
            None if self.is_constructor => "constructor",
            None if self.is_receive_ether => "receive",
            None if self.is_fallback => "fallback",
            None => "<anonymous>",
        }
    }

    pub fn has_modifier(&self, name: &str) -> bool {
        self.modifiers.iter().any(|m| m.name == name)
    }
}

/// The parser wraps every state variable in one of these, the grammar only allows a single variable
#[derive(Debug, Clone, Deserialize)]
pub struct StateVariableDeclaration {
    #[serde(default)]
    pub variables: Vec<VariableDeclaration>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub name: String,
    pub type_name: TypeName,
    #[serde(default)]
    pub expression: Option<Expression>,
    #[serde(default)]
    pub is_declared_const: bool,
    #[serde(default)]
    pub is_immutable: bool,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsingForDeclaration {
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(default)]
    pub loc: SourceSpan,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TypeName {
    ElementaryTypeName {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    UserDefinedTypeName {
        name_path: String,
    },
    // Mapping, ArrayTypeName, FunctionTypeName...
    #[serde(other)]
    Other,
}

impl TypeName {
    pub fn is_elementary(&self, expected: &str) -> bool {
        matches!(self, TypeName::ElementaryTypeName { name } if name == expected)
    }
}

/// Only literals are inspected, everything else collapses into `Other`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    NumberLiteral {
        number: String,
        #[serde(default)]
        subdenomination: Option<String>,
    },
    #[serde(other)]
    Other,
}
