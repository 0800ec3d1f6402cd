//! # modelcheck parser
//!
//! Turns persist model source text into the declaration snapshot checked by
//! the `modelcheck` engine.
//!
//! ## Usage
//!
//! ```
//! # use modelcheck_parser::{parse, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         import ballerina/persist as _;
//!
//!         public type Building record {|
//!             readonly string buildingCode;
//!             string city;
//!         |};
//!
//!         public enum Gender { MALE, FEMALE }
//!     "#;
//!
//!     let declarations = parse(source)?;
//!     assert_eq!(declarations.len(), 2);
//!     Ok(())
//! }
//! ```

mod error;
mod lexer;
mod parser;
mod tokens;

pub use error::ParseError;

use modelcheck_core::declaration::Declaration;

/// Parse source text into its top-level declarations.
///
/// 1. **Tokenize**: convert source text to tokens, reporting every lexical error
/// 2. **Parse**: build declarations, reporting every syntax error
///
/// Imports are consumed and dropped. Items that are neither record type
/// definitions nor enums are returned as
/// [`DeclarationKind::Other`](modelcheck_core::declaration::DeclarationKind::Other).
pub fn parse(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let tokens = lexer::tokenize(source)?;
    parser::parse_declarations(&tokens)
}
