//! modelcheck Core Types and Definitions
//!
//! This crate provides the foundational types shared by the modelcheck parser,
//! validation engine and command-line front end. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Spans**: Byte ranges into model source and their line/column form ([`span`])
//! - **Declarations**: The immutable declaration snapshot the engine validates ([`declaration`])
//! - **Diagnostics**: Coded, labeled diagnostics and the sink that collects them ([`error`])

pub mod declaration;
pub mod error;
pub mod identifier;
pub mod span;
