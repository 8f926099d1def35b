use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use flowvm_types::{TypeCatalog, TypeError, TypeId, TypeIndex};

use crate::invoke::{ExecuteContext, Operand};
use crate::registry::RegistryBuilder;
use crate::{RegistryConfig, RegistrationError};

pub(crate) struct NumericIds {
	pub number: TypeId,
	pub int: TypeId,
	pub float: TypeId,
	pub bool_: TypeId,
	pub context: TypeId,
	pub rig_context: TypeId,
	pub other_context: TypeId,
}

/// `Number > {Int, Float}`, `Bool`, and `ExecuteContext > RigContext` plus an unrelated `ToolContext`.
pub(crate) fn numeric_types() -> (TypeCatalog, NumericIds) {
	let mut catalog = TypeCatalog::new();
	let number = catalog.declare("Number").unwrap();
	let int = catalog.declare_refinement("Int", number).unwrap();
	let float = catalog.declare_refinement("Float", number).unwrap();
	let bool_ = catalog.declare("Bool").unwrap();
	let context = catalog.declare("ExecuteContext").unwrap();
	let rig_context = catalog.declare_refinement("RigContext", context).unwrap();
	let other_context = catalog.declare("ToolContext").unwrap();
	(
		catalog,
		NumericIds {
			number,
			int,
			float,
			bool_,
			context,
			rig_context,
			other_context,
		},
	)
}

pub(crate) fn builder_with(config: RegistryConfig) -> Result<(RegistryBuilder, NumericIds), RegistrationError> {
	let (catalog, ids) = numeric_types();
	let builder = RegistryBuilder::new(Arc::new(catalog), config)?;
	Ok((builder, ids))
}

pub(crate) fn builder() -> (RegistryBuilder, NumericIds) {
	builder_with(RegistryConfig::default()).unwrap()
}

/// Counts calls to [`TypeIndex::resolve`].
pub(crate) struct CountingTypes {
	inner: TypeCatalog,
	resolutions: AtomicUsize,
}

impl CountingTypes {
	pub fn new(inner: TypeCatalog) -> Self {
		Self {
			inner,
			resolutions: AtomicUsize::new(0),
		}
	}

	pub fn resolutions(&self) -> usize {
		self.resolutions.load(Ordering::SeqCst)
	}
}

impl TypeIndex for CountingTypes {
	fn resolve(&self, text: &str) -> Result<TypeId, TypeError> {
		self.resolutions.fetch_add(1, Ordering::SeqCst);
		self.inner.resolve(text)
	}

	fn is_subtype(&self, candidate: TypeId, required: TypeId) -> bool {
		self.inner.is_subtype(candidate, required)
	}

	fn name(&self, id: TypeId) -> Option<&str> {
		self.inner.name(id)
	}
}

pub(crate) struct TestContext {
	pub context_type: TypeId,
}

impl ExecuteContext for TestContext {
	fn context_type(&self) -> TypeId {
		self.context_type
	}
}

pub(crate) fn noop(_: &mut dyn ExecuteContext, _: &mut [Operand<'_>]) {}

/// `Result = a + b` over `i64` operands.
pub(crate) fn add_ints(_: &mut dyn ExecuteContext, operands: &mut [Operand<'_>]) {
	let a = *operands[0].get::<i64>().unwrap();
	let b = *operands[1].get::<i64>().unwrap();
	*operands[2].get_mut::<i64>().unwrap() = a + b;
}

/// `Result = a + b` over `f64` operands.
pub(crate) fn add_floats(_: &mut dyn ExecuteContext, operands: &mut [Operand<'_>]) {
	let a = *operands[0].get::<f64>().unwrap();
	let b = *operands[1].get::<f64>().unwrap();
	*operands[2].get_mut::<f64>().unwrap() = a + b;
}

pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_max_level(tracing::Level::TRACE)
		.with_test_writer()
		.try_init();
}
