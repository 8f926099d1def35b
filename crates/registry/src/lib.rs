//! Typed function registry and dispatch resolution for the flowvm data-flow VM.
//!
//! Functions are data records, not source: a name, an [`Invocable`], declared
//! [`Argument`]s, and optional links into two resolution mechanisms:
//!
//! - [`TemplateGroup`]s: overload families sharing an argument shape and
//!   differing in concrete argument types;
//! - [`DispatchFactory`]s: single code paths that pick a concrete variant from
//!   runtime argument types.
//!
//! For each call site the registry answers which invocable and which
//! [`OperandLayout`] to use. It never executes graphs itself.
//!
//! ```ignore
//! let mut builder = RegistryBuilder::with_defaults(types)?;
//! let add = builder.register(
//! 	FunctionDef::new("Add", add_ints)
//! 		.arg(Argument::new("a", "Int"))
//! 		.arg(Argument::new("b", "Int"))
//! 		.arg(Argument::output("Result", "Int")),
//! )?;
//! let registry = FunctionRegistry::initialize(builder)?;
//! let binding = registry.bind(add, &[int, int, int], context)?;
//! binding.invoke(&mut ctx, &mut operands);
//! ```

pub mod argument;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod ids;
pub mod invoke;
pub mod operand;
pub mod owner;
pub mod registry;
pub mod template;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use argument::{Argument, ExecuteArgument, OperandLayout, PinDirection};
pub use config::RegistryConfig;
pub use descriptor::{FunctionDef, FunctionDescriptor, Owner, TypeIds};
pub use error::{ConfigError, RegistrationError, ResolveError, ShutdownError};
pub use factory::{Dispatch, DispatchFactory, FactoryEntry};
pub use flowvm_types::{TypeCatalog, TypeError, TypeId, TypeIndex};
pub use ids::{FactoryId, FunctionIndex, StructId, TemplateId};
pub use invoke::{DispatchFn, ExecuteContext, FunctionPtr, Invocable, Operand};
pub use owner::{StructEntry, StructInfo};
pub use registry::{Binding, FunctionRef, FunctionRegistry, RegistryBuilder, RegistryHandle};
pub use template::TemplateGroup;
