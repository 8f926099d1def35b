//! Type identifiers and the type index service.
//!
//! The function registry never interprets type text itself. It hands declared
//! argument types to a [`TypeIndex`] and works with the returned [`TypeId`]s
//! from then on: equality for exact overload matches, [`TypeIndex::is_subtype`]
//! for refinement checks (template fallback, execute-context compatibility).
//!
//! [`TypeCatalog`] is the in-memory implementation used by hosts that do not
//! bring their own reflection layer, and by the registry's tests.

mod catalog;

pub use catalog::{TypeCatalog, TypeInfo};
use serde::{Deserialize, Serialize};

/// Stable numeric identifier for a type known to a [`TypeIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
	/// Represents an unresolved type.
	pub const INVALID: TypeId = TypeId(u32::MAX);

	/// Returns true if this type ID is valid.
	#[inline]
	pub fn is_valid(self) -> bool {
		self != Self::INVALID
	}

	/// Returns the underlying u32 value.
	#[inline]
	pub fn as_u32(self) -> u32 {
		self.0
	}
}

impl std::fmt::Display for TypeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if *self == Self::INVALID {
			write!(f, "TypeId(INVALID)")
		} else {
			write!(f, "TypeId({})", self.0)
		}
	}
}

/// Type service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
	/// The type text does not name a known type.
	#[error("unknown type: {text:?}")]
	Unknown { text: String },

	/// A type with this name was already declared.
	#[error("type already declared: {name:?}")]
	Duplicate { name: String },
}

/// Maps type text to stable identifiers and answers refinement queries.
pub trait TypeIndex: Send + Sync {
	/// Resolves a textual type description to its identifier.
	fn resolve(&self, text: &str) -> Result<TypeId, TypeError>;

	/// Returns true if `candidate` is `required` or a refinement of it.
	fn is_subtype(&self, candidate: TypeId, required: TypeId) -> bool;

	/// Returns the display name of a type, for diagnostics.
	fn name(&self, id: TypeId) -> Option<&str>;

	/// Renders a type sequence as `[A, B, C]`, falling back to the raw id for
	/// unnamed types.
	fn describe(&self, ids: &[TypeId]) -> String {
		let names: Vec<String> = ids
			.iter()
			.map(|&id| match self.name(id) {
				Some(name) => name.to_string(),
				None => id.to_string(),
			})
			.collect();
		format!("[{}]", names.join(", "))
	}
}

impl<T: TypeIndex + ?Sized> TypeIndex for std::sync::Arc<T> {
	fn resolve(&self, text: &str) -> Result<TypeId, TypeError> {
		(**self).resolve(text)
	}

	fn is_subtype(&self, candidate: TypeId, required: TypeId) -> bool {
		(**self).is_subtype(candidate, required)
	}

	fn name(&self, id: TypeId) -> Option<&str> {
		(**self).name(id)
	}

	fn describe(&self, ids: &[TypeId]) -> String {
		(**self).describe(ids)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;

	/// Renders sequences as `A -> B` instead of the default list form.
	struct Arrows(TypeCatalog);

	impl TypeIndex for Arrows {
		fn resolve(&self, text: &str) -> Result<TypeId, TypeError> {
			self.0.resolve(text)
		}

		fn is_subtype(&self, candidate: TypeId, required: TypeId) -> bool {
			self.0.is_subtype(candidate, required)
		}

		fn name(&self, id: TypeId) -> Option<&str> {
			self.0.name(id)
		}

		fn describe(&self, ids: &[TypeId]) -> String {
			ids.iter().filter_map(|&id| self.name(id)).collect::<Vec<_>>().join(" -> ")
		}
	}

	#[test]
	fn shared_index_keeps_describe_override() {
		let mut catalog = TypeCatalog::new();
		let int = catalog.declare("Int").unwrap();
		let float = catalog.declare("Float").unwrap();

		let shared: Arc<dyn TypeIndex> = Arc::new(Arrows(catalog));
		assert_eq!(shared.describe(&[int, float]), "Int -> Float");
		assert_eq!(TypeIndex::describe(&shared, &[int, float]), "Int -> Float");
		assert_eq!(shared.resolve("Float").unwrap(), float);
	}
}
