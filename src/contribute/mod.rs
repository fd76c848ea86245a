//! Build-phase contributors
//!
//! Each contributor is constructed from the build context and returns
//! `Ok(None)` when its build plan entry is absent.

pub mod function;
pub mod invoker;

pub use function::{CommandMarker, CommandRequirement, Function, FUNCTION_URI};
pub use invoker::{Invoker, InvokerRequirement, INVOKER_COMMAND};
