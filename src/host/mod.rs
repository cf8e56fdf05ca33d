//! Host language model
//!
//! - [`syntax`]: statements and expressions the translator emits
//! - [`model`]: the host project (documents, namespaces, types, members)
//! - [`render`]: C#-style text output

pub mod model;
pub mod render;
pub mod syntax;

pub use model::{
    Accessor, HostDocument, HostField, HostMember, HostMethod, HostNamespace, HostParam,
    HostProject, HostProperty, HostType, HostTypeRef, MemberKey, TypeKey,
};
pub use syntax::{Arg, BinaryOperator, Block, ElseBranch, Expr, Literal, Statement, StatementKind, UnaryOperator};
