//! Host bindings
//!
//! Descriptors attached to host declarations, and the walker that gathers
//! them from a host project.

pub mod descriptor;
pub mod walker;

pub use descriptor::{
    BindingDescriptor, BindingKind, ClassBinding, FieldBinding, MethodBinding, OperatorBinding,
    OperatorKind, PropertyBinding,
};
pub use walker::{BindingWalker, Bindings, ClassEntry, MemberEntry};
