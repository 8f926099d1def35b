//! In-memory [`TypeIndex`] with single-parent refinement.
//!
//! # Invariants
//!
//! - Ids are dense and assigned in declaration order; they are never reused.
//! - A refinement always points at an already-declared parent, so parent chains
//!   are acyclic and `is_subtype` terminates.

use rustc_hash::FxHashMap;

use crate::{TypeError, TypeId, TypeIndex};

/// A declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
	pub id: TypeId,
	pub name: Box<str>,
	/// The type this one refines, if any.
	pub parent: Option<TypeId>,
}

/// Declaration-ordered catalog of types.
#[derive(Debug, Default)]
pub struct TypeCatalog {
	types: Vec<TypeInfo>,
	by_name: FxHashMap<Box<str>, TypeId>,
}

impl TypeCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a root type.
	pub fn declare(&mut self, name: &str) -> Result<TypeId, TypeError> {
		self.insert(name, None)
	}

	/// Declares a type that refines `parent`.
	pub fn declare_refinement(&mut self, name: &str, parent: TypeId) -> Result<TypeId, TypeError> {
		if self.get(parent).is_none() {
			return Err(TypeError::Unknown {
				text: parent.to_string(),
			});
		}
		self.insert(name, Some(parent))
	}

	/// Makes `text` resolve to an existing type.
	pub fn alias(&mut self, text: &str, target: TypeId) -> Result<(), TypeError> {
		if self.get(target).is_none() {
			return Err(TypeError::Unknown {
				text: target.to_string(),
			});
		}
		let key = normalize(text);
		if self.by_name.contains_key(key) {
			return Err(TypeError::Duplicate { name: key.to_string() });
		}
		self.by_name.insert(Box::from(key), target);
		Ok(())
	}

	/// Returns the declaration for `id`.
	pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
		self.types.get(id.as_u32() as usize)
	}

	/// Returns the number of declared types (aliases excluded).
	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}

	/// Iterates declared types in id order.
	pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> + '_ {
		self.types.iter()
	}

	fn insert(&mut self, name: &str, parent: Option<TypeId>) -> Result<TypeId, TypeError> {
		let key = normalize(name);
		if key.is_empty() {
			return Err(TypeError::Unknown { text: name.to_string() });
		}
		if self.by_name.contains_key(key) {
			return Err(TypeError::Duplicate { name: key.to_string() });
		}
		let raw = u32::try_from(self.types.len()).unwrap_or_else(|_| panic!("type catalog overflow"));
		let id = TypeId(raw);
		self.types.push(TypeInfo {
			id,
			name: Box::from(key),
			parent,
		});
		self.by_name.insert(Box::from(key), id);
		tracing::trace!(name = key, %id, ?parent, "declared type");
		Ok(id)
	}
}

impl TypeIndex for TypeCatalog {
	fn resolve(&self, text: &str) -> Result<TypeId, TypeError> {
		self.by_name
			.get(normalize(text))
			.copied()
			.ok_or_else(|| TypeError::Unknown { text: text.to_string() })
	}

	fn is_subtype(&self, candidate: TypeId, required: TypeId) -> bool {
		let mut cursor = Some(candidate);
		while let Some(id) = cursor {
			if id == required {
				return true;
			}
			cursor = self.get(id).and_then(|info| info.parent);
		}
		false
	}

	fn name(&self, id: TypeId) -> Option<&str> {
		self.get(id).map(|info| &*info.name)
	}
}

fn normalize(text: &str) -> &str {
	text.trim()
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn numeric() -> (TypeCatalog, TypeId, TypeId, TypeId, TypeId) {
		let mut catalog = TypeCatalog::new();
		let number = catalog.declare("Number").unwrap();
		let int = catalog.declare_refinement("Int", number).unwrap();
		let small = catalog.declare_refinement("SmallInt", int).unwrap();
		let text = catalog.declare("String").unwrap();
		(catalog, number, int, small, text)
	}

	#[test]
	fn resolve_trims_and_rejects_unknown() {
		let (catalog, _, int, _, _) = numeric();
		assert_eq!(catalog.resolve("  Int ").unwrap(), int);
		assert_eq!(
			catalog.resolve("Float"),
			Err(TypeError::Unknown {
				text: "Float".to_string()
			})
		);
	}

	#[test]
	fn refinement_is_transitive_and_one_way() {
		let (catalog, number, int, small, text) = numeric();
		assert!(catalog.is_subtype(small, number));
		assert!(catalog.is_subtype(int, number));
		assert!(!catalog.is_subtype(number, int));
		assert!(!catalog.is_subtype(text, number));
	}

	#[test]
	fn duplicate_and_alias() {
		let (mut catalog, _, int, _, _) = numeric();
		assert!(matches!(catalog.declare("Int"), Err(TypeError::Duplicate { .. })));
		catalog.alias("int32", int).unwrap();
		assert_eq!(catalog.resolve("int32").unwrap(), int);
		assert_eq!(catalog.len(), 4);
		assert!(matches!(catalog.alias("Int", int), Err(TypeError::Duplicate { .. })));
	}

	#[test]
	fn describe_renders_names() {
		let (catalog, number, int, _, _) = numeric();
		assert_eq!(catalog.describe(&[int, number]), "[Int, Number]");
		assert_eq!(catalog.describe(&[TypeId(99)]), "[TypeId(99)]");
	}

	proptest! {
		/// Every declared type is a subtype of itself and of every ancestor on its chain.
		#[test]
		fn prop_chain_subtyping(depth in 1usize..12) {
			let mut catalog = TypeCatalog::new();
			let mut chain = vec![catalog.declare("T0").unwrap()];
			for level in 1..depth {
				let parent = chain[level - 1];
				chain.push(catalog.declare_refinement(&format!("T{level}"), parent).unwrap());
			}
			for (i, &lower) in chain.iter().enumerate() {
				for (j, &upper) in chain.iter().enumerate() {
					prop_assert_eq!(catalog.is_subtype(lower, upper), i >= j);
				}
			}
		}
	}
}
