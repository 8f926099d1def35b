//! Dispatch factories.
//!
//! # Role
//!
//! A factory is one code path shared by a family of functions. Given the
//! runtime types of a call it produces the concrete invocable and the operand
//! layout to invoke it with.
//!
//! # Invariants
//!
//! - Resolution is a pure function of (factory, runtime types): the registry
//!   memoizes each successful [`Dispatch`] and hands out the same `Arc` for
//!   every later request with the same types.
//! - Failed resolutions are not memoized.

use std::borrow::Cow;
use std::sync::Arc;

use flowvm_types::{TypeId, TypeIndex};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::argument::OperandLayout;
use crate::descriptor::TypeIds;
use crate::ids::FactoryId;
use crate::invoke::Invocable;

/// Concrete invocable and operand layout for one call signature.
#[derive(Debug, Clone)]
pub struct Dispatch {
	pub invocable: Invocable,
	pub layout: OperandLayout,
}

/// Selects a concrete variant from runtime argument types.
pub trait DispatchFactory: Send + Sync {
	/// Name used in diagnostics.
	fn name(&self) -> &str;

	/// Execute context type text the produced invocables need. `None` means
	/// the registry default.
	fn execute_context(&self) -> Option<&str> {
		None
	}

	/// Produces the variant for `runtime`, or `None` if the combination is
	/// unsupported. Must be deterministic.
	fn dispatch(&self, runtime: &[TypeId], types: &dyn TypeIndex) -> Option<Dispatch>;

	/// Names operand `operand_index` of a `total_operands`-slot call. `None`
	/// defers to the declared arguments of the function being queried.
	fn argument_name_for_operand(&self, operand_index: usize, total_operands: usize) -> Option<Cow<'_, str>> {
		let _ = (operand_index, total_operands);
		None
	}
}

/// A registered factory with its memo table.
pub struct FactoryEntry {
	pub(crate) id: FactoryId,
	pub(crate) factory: Arc<dyn DispatchFactory>,
	pub(crate) context_type: Option<TypeId>,
	memo: RwLock<FxHashMap<TypeIds, Arc<Dispatch>>>,
}

impl FactoryEntry {
	pub(crate) fn new(id: FactoryId, factory: Arc<dyn DispatchFactory>, context_type: Option<TypeId>) -> Self {
		Self {
			id,
			factory,
			context_type,
			memo: RwLock::new(FxHashMap::default()),
		}
	}

	pub fn id(&self) -> FactoryId {
		self.id
	}

	pub fn name(&self) -> &str {
		self.factory.name()
	}

	pub fn factory(&self) -> &dyn DispatchFactory {
		&*self.factory
	}

	/// Declared execute context, if any.
	pub fn context_type(&self) -> Option<TypeId> {
		self.context_type
	}

	/// Number of memoized signatures.
	pub fn memoized_len(&self) -> usize {
		self.memo.read().len()
	}

	/// Returns the memoized dispatch for `runtime`, asking the factory on a miss.
	pub(crate) fn resolve(&self, runtime: &[TypeId], types: &dyn TypeIndex) -> Option<Arc<Dispatch>> {
		if let Some(hit) = self.memo.read().get(runtime) {
			return Some(Arc::clone(hit));
		}

		let fresh = Arc::new(self.factory.dispatch(runtime, types)?);
		let mut memo = self.memo.write();
		let installed = memo.entry(TypeIds::from_slice(runtime)).or_insert_with(|| {
			tracing::debug!(
				factory = self.factory.name(),
				types = %types.describe(runtime),
				slots = fresh.layout.len(),
				"memoized dispatch"
			);
			Arc::clone(&fresh)
		});
		Some(Arc::clone(installed))
	}
}

impl std::fmt::Debug for FactoryEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FactoryEntry")
			.field("id", &self.id)
			.field("name", &self.factory.name())
			.field("context_type", &self.context_type)
			.finish_non_exhaustive()
	}
}
