//! MiniC Compiler - Common Types and Utilities
//! 
//! This crate contains the error type and source location tracking
//! shared by the frontend, the code generator and the driver.

pub mod error;
pub mod source_loc;

pub use error::CompilerError;
pub use source_loc::SourceLocation;
