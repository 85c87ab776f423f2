use crate::LintError;
use crate::parser::ast::SourceUnit;
use log::debug;

pub mod ast;

/// Reads the json tree produced by `solidity-parser-antlr` (`parse(src, { loc: true })`)
///
/// The parser itself is not part of this crate, any producer emitting the same shape works
pub fn parse_source_unit(json: &str) -> Result<SourceUnit, LintError> {
    let unit: SourceUnit = serde_json::from_str(json).map_err(LintError::InvalidAst)?;
    debug!("read source unit with {} top level nodes", unit.children.len());
    Ok(unit)
}
