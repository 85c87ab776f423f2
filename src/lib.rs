use log::error;
use std::ffi::{CString, c_char};
use std::ptr;
use thiserror::Error;

pub mod analysis;
pub mod parser;

pub use analysis::SemanticAnalyzer;
pub use analysis::diagnostic::{Diagnostic, DiagnosticSeverity};
pub use analysis::external_api::AnalyzerConfig;
pub use parser::parse_source_unit;

/// Fatal errors, these abort the analysis of the whole tree.
///
/// Anything the user wrote wrong is a `Diagnostic` instead, a `LintError` means the weight tables or the
/// input tree are not what the linter expects
#[derive(Debug, Error)]
pub enum LintError {
    #[error("Unrecognized source unit part `{0}`, please report this issue")]
    UnrecognizedSourceUnitPart(String),
    #[error("Unrecognized contract part `{0}`, please report this issue")]
    UnrecognizedContractPart(String),
    #[error("Unknown order for function `{0}`, please report this issue")]
    UnknownFunctionOrder(String),
    #[error("State variable declaration on line {0} declares {1} variables, please report this issue")]
    MultipleStateVariables(usize, usize),
    #[error("keccak256 of slot id \"{0}\" is zero, the slot can not be derived")]
    ZeroSlotHash(String),
    #[error("Failed to read the syntax tree: {0}")]
    InvalidAst(#[source] serde_json::Error),
    #[error("Failed to read the analyzer config: {0}")]
    InvalidConfig(#[source] serde_json::Error),
    #[error("Failed to write diagnostics: {0}")]
    Serialization(#[source] serde_json::Error),
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(String),
    #[error("the passed {0} pointer is null")]
    NullPointer(&'static str),
}

thread_local! {
    static ERRORS: std::cell::RefCell<Vec<String>> = std::cell::RefCell::new(Vec::new());
}

pub fn kiln_error(err: &str) {
    ERRORS.with(|errors| errors.borrow_mut().push(err.to_string()));
    error!("{}", err);
}

/// classic get errors function, returns the last error emitted by kiln lint, if there are no errors returns a null pointer
///
/// you have to free the returned string using `kiln_free_string`
#[unsafe(no_mangle)]
pub extern "C" fn kiln_get_errors() -> *mut c_char {
    ERRORS.with(|errors| match errors.borrow().last() {
        Some(last_error) => match CString::new(last_error.clone()) {
            Ok(cstring) => cstring.into_raw(),
            Err(_) => ptr::null_mut(),
        },
        None => ptr::null_mut(),
    })
}

/// Use to free any strings allocated by kiln lint
#[unsafe(no_mangle)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe extern "C" fn kiln_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        let _ = CString::from_raw(ptr);
    }
}
