//! Execute-context compatibility.
//!
//! A function declares the least specific context it can run under. Callers
//! holding a refinement of that context may invoke it; callers holding a more
//! general or unrelated context may not. The refinement relation itself comes
//! from the [`TypeIndex`].

use flowvm_types::{TypeId, TypeIndex};

/// True iff `candidate` is `required` or a refinement of it.
pub fn supports_execute_context(types: &dyn TypeIndex, required: TypeId, candidate: TypeId) -> bool {
	candidate == required || types.is_subtype(candidate, required)
}
