//! # py2cs - Python bodies for C# declarations
//!
//! Host declarations carry declarative bindings that name a Python
//! module/class/function path and a source file. A generation run parses
//! the referenced Python sources, translates the bound function bodies into
//! host syntax and splices them into otherwise hand-written declarations.
//!
//! py2cs provides:
//! - Tree-sitter based extraction of Python sources into a typed entity graph
//! - A binding walker and graph binder that fuse host bindings with that graph
//! - A statement/expression translator that degrades to inline diagnostics
//! - A code injector that rewrites generate-flagged member bodies

pub mod python;
pub mod graph;
pub mod extract;
pub mod cache;
pub mod host;
pub mod bindings;
pub mod mapper;
pub mod translator;
pub mod injector;
pub mod generator;
pub mod report;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use graph::{Graph, GraphBuilder, NodeId, Primitive, Type};
pub use cache::{SourceCache, SourceLocator};
pub use bindings::{BindingDescriptor, BindingWalker, Bindings};
pub use mapper::{BoundGraph, GraphBinder};
pub use translator::{Diagnostics, TranslateError, Translator, TranslatorState};
pub use injector::CodeInjector;
pub use generator::{Generator, RunReport};

/// Result type alias for fatal py2cs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors. Any of these aborts the whole generation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed source block: expected a statement sequence in {0}")]
    MalformedBlock(String),

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("Unregistered containing type: {0}")]
    UnregisteredType(String),

    #[error("Ambiguous static receiver for {0}: first parameter does not resolve to a bound class")]
    AmbiguousStaticReceiver(String),

    #[error("Graph node not found: {0}")]
    NodeNotFound(String),

    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
