//! Function definitions and registered descriptors.
//!
//! # Role
//!
//! A [`FunctionDef`] is what callers hand to the builder. Registration turns it
//! into a [`FunctionDescriptor`]: the def's name, invocable and arguments plus
//! the registry-assigned index, owner tag and template link.
//!
//! # Invariants
//!
//! - A descriptor is never built from an invalid def (see [`FunctionDef::is_valid`]).
//! - The argument type cache is installed at most once; every reader observes
//!   either nothing or the installed sequence, and
//!   `arguments.len() == types.len()` once installed.

use std::borrow::Cow;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use flowvm_types::{TypeId, TypeIndex};
use smallvec::SmallVec;

use crate::argument::Argument;
use crate::error::ResolveError;
use crate::ids::{FactoryId, FunctionIndex, StructId, TemplateId};
use crate::invoke::{FunctionPtr, Invocable};

/// Resolved argument type ids, one per declared argument.
pub type TypeIds = SmallVec<[TypeId; 4]>;

/// What a function is bound to.
///
/// Struct and factory ownership are exclusive. The ids index side tables in the
/// registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Owner {
	#[default]
	None,
	Struct(StructId),
	Factory(FactoryId),
}

/// Registration input for one function.
#[derive(Debug, Clone)]
pub struct FunctionDef {
	pub name: Cow<'static, str>,
	pub invocable: Option<Invocable>,
	pub arguments: Vec<Argument>,
}

impl FunctionDef {
	pub fn new(name: impl Into<Cow<'static, str>>, function: FunctionPtr) -> Self {
		Self::with_invocable(name, Invocable::Function(function))
	}

	pub fn with_invocable(name: impl Into<Cow<'static, str>>, invocable: Invocable) -> Self {
		Self {
			name: name.into(),
			invocable: Some(invocable),
			arguments: Vec::new(),
		}
	}

	/// A def with no body. Never registrable; useful for declaring shapes.
	pub fn unbound(name: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			invocable: None,
			arguments: Vec::new(),
		}
	}

	pub fn arg(mut self, argument: Argument) -> Self {
		self.arguments.push(argument);
		self
	}

	pub fn with_arguments<I: IntoIterator<Item = Argument>>(mut self, arguments: I) -> Self {
		self.arguments.extend(arguments);
		self
	}

	/// True iff the name is non-empty and an invocable is present.
	pub fn is_valid(&self) -> bool {
		!self.name.is_empty() && self.invocable.is_some()
	}
}

/// A registered function.
pub struct FunctionDescriptor {
	pub(crate) name: Box<str>,
	pub(crate) invocable: Invocable,
	pub(crate) owner: Owner,
	pub(crate) index: FunctionIndex,
	pub(crate) template: Option<TemplateId>,
	pub(crate) arguments: Box<[Argument]>,
	type_ids: ArcSwapOption<TypeIds>,
}

impl FunctionDescriptor {
	/// Builds a descriptor from a def already checked with [`FunctionDef::is_valid`].
	pub(crate) fn from_def(
		def: FunctionDef,
		invocable: Invocable,
		index: FunctionIndex,
		owner: Owner,
		template: Option<TemplateId>,
	) -> Self {
		Self {
			name: Box::from(def.name.as_ref()),
			invocable,
			owner,
			index,
			template,
			arguments: def.arguments.into_boxed_slice(),
			type_ids: ArcSwapOption::empty(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// The part of the name after the last `::`, or the whole name.
	pub fn method_name(&self) -> &str {
		self.name.rsplit_once("::").map_or(&*self.name, |(_, method)| method)
	}

	pub fn invocable(&self) -> &Invocable {
		&self.invocable
	}

	pub fn owner(&self) -> Owner {
		self.owner
	}

	pub fn index(&self) -> FunctionIndex {
		self.index
	}

	/// Raw template link. [`crate::FunctionRef::template`] hides single-permutation groups.
	pub fn template_id(&self) -> Option<TemplateId> {
		self.template
	}

	pub fn arguments(&self) -> &[Argument] {
		&self.arguments
	}

	/// Always true for a registered descriptor: registration rejects defs
	/// that fail [`FunctionDef::is_valid`], and the invocable is not optional
	/// here. Check the def before registering instead.
	pub fn is_valid(&self) -> bool {
		!self.name.is_empty()
	}

	pub fn is_variadic(&self) -> bool {
		self.arguments.last().is_some_and(Argument::is_variadic)
	}

	/// The installed type cache, without triggering resolution.
	pub fn cached_type_ids(&self) -> Option<Arc<TypeIds>> {
		self.type_ids.load_full()
	}

	/// Resolves argument types on first use and caches them.
	///
	/// Concurrent first calls may each resolve; exactly one result is installed
	/// and every caller returns the installed sequence.
	pub(crate) fn argument_type_ids(&self, types: &dyn TypeIndex) -> Result<Arc<TypeIds>, ResolveError> {
		if let Some(cached) = self.type_ids.load_full() {
			return Ok(cached);
		}

		let resolved = self
			.arguments
			.iter()
			.map(|arg| {
				types.resolve(arg.element_type()).map_err(|_| ResolveError::UnknownType {
					function: self.name.to_string(),
					argument: arg.name.to_string(),
					type_text: arg.type_text.to_string(),
				})
			})
			.collect::<Result<TypeIds, _>>()?;

		let fresh = Arc::new(resolved);
		let empty: Option<Arc<TypeIds>> = None;
		let prev = self.type_ids.compare_and_swap(&empty, Some(Arc::clone(&fresh)));
		match &*prev {
			Some(installed) => Ok(Arc::clone(installed)),
			None => {
				tracing::trace!(function = %self.name, count = fresh.len(), "resolved argument types");
				Ok(fresh)
			}
		}
	}
}

impl std::fmt::Debug for FunctionDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FunctionDescriptor")
			.field("name", &self.name)
			.field("index", &self.index)
			.field("owner", &self.owner)
			.field("template", &self.template)
			.field("arguments", &self.arguments)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::test_fixtures::{CountingTypes, noop, numeric_types};

	fn descriptor(def: FunctionDef) -> FunctionDescriptor {
		let invocable = def.invocable.clone().unwrap();
		FunctionDescriptor::from_def(def, invocable, FunctionIndex(0), Owner::None, None)
	}

	#[test]
	fn method_name_strips_owner() {
		assert_eq!(descriptor(FunctionDef::new("Vector::Length", noop)).method_name(), "Length");
		assert_eq!(descriptor(FunctionDef::new("Add", noop)).method_name(), "Add");
	}

	#[test]
	fn type_cache_is_idempotent() {
		let (catalog, ids) = numeric_types();
		let counting = CountingTypes::new(catalog);
		let add = descriptor(
			FunctionDef::new("Add", noop)
				.arg(Argument::new("a", "Int"))
				.arg(Argument::new("b", "Int")),
		);

		assert!(add.cached_type_ids().is_none());
		let first = add.argument_type_ids(&counting).unwrap();
		assert_eq!(counting.resolutions(), 2);

		let second = add.argument_type_ids(&counting).unwrap();
		assert_eq!(counting.resolutions(), 2, "second call must hit the cache");
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(first.as_slice(), &[ids.int, ids.int]);
	}

	#[test]
	fn variadic_resolves_element_type() {
		let (catalog, ids) = numeric_types();
		let sum = descriptor(
			FunctionDef::new("Sum", noop)
				.arg(Argument::new("a", "Int"))
				.arg(Argument::new("items", "Float*")),
		);
		assert!(sum.is_variadic());
		assert_eq!(sum.argument_type_ids(&catalog).unwrap().as_slice(), &[ids.int, ids.float]);
	}

	#[test]
	fn unknown_type_is_reported_and_not_cached() {
		let (catalog, _) = numeric_types();
		let bad = descriptor(FunctionDef::new("Bad", noop).arg(Argument::new("x", "Quaternion")));
		assert_eq!(
			bad.argument_type_ids(&catalog).unwrap_err(),
			ResolveError::UnknownType {
				function: "Bad".into(),
				argument: "x".into(),
				type_text: "Quaternion".into(),
			}
		);
		assert!(bad.cached_type_ids().is_none());
	}

	#[test]
	fn concurrent_first_resolution_agrees() {
		let (catalog, _) = numeric_types();
		let add = descriptor(
			FunctionDef::new("Add", noop)
				.arg(Argument::new("a", "Int"))
				.arg(Argument::new("b", "Float")),
		);
		let results: Vec<Arc<TypeIds>> = std::thread::scope(|s| {
			let handles: Vec<_> = (0..8).map(|_| s.spawn(|| add.argument_type_ids(&catalog).unwrap())).collect();
			handles.into_iter().map(|h| h.join().unwrap()).collect()
		});
		let installed = add.cached_type_ids().unwrap();
		for result in results {
			assert!(Arc::ptr_eq(&result, &installed));
		}
	}

	proptest! {
		/// Validity depends only on the name and the presence of a body.
		#[test]
		fn prop_validity(name in ".{0,8}", has_body in any::<bool>(), arity in 0usize..4) {
			let mut def = if has_body {
				FunctionDef::new(name.clone(), noop)
			} else {
				FunctionDef::unbound(name.clone())
			};
			for i in 0..arity {
				def = def.arg(Argument::new(format!("arg{i}"), "Int"));
			}
			prop_assert_eq!(def.is_valid(), !name.is_empty() && has_body);
		}
	}
}
