//! # alpha-mcp-import
//!
//! Imports the mapping directories of early (alpha-era) MCP releases into a
//! single in-memory [`MappingTree`].
//!
//! ## Architecture
//!
//! - **table**: `conf/*.csv` loading (class docs, field and method renames and docs)
//! - **classfile**: structural class file reader (constant pool, class name, fields)
//! - **descriptor**: field descriptor recovery from the game jar
//! - **directive**: `.rgs` directive parsing and resolution against the tables
//! - **tree**: the resulting class → field/method mapping tree
//! - **reader**: the import pipeline and the `MappingsReader` seam
//! - **progress**: coarse progress notifications
//! - **config**: input layout and import root resolution
//! - **error**: structural parse and resource failures

pub mod classfile;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod directive;
pub mod error;
pub mod progress;
pub mod reader;
pub mod table;
pub mod tree;

pub use error::{ErrorKind, ImportError, ParseFailure, ResourceFailure};
pub use reader::{AlphaMcpReader, MappingSaveParameters, MappingsReader, read_mappings};
pub use tree::{ClassEntry, Entry, EntryMapping, FieldEntry, MappingTree, MethodEntry};
