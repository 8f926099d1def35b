//! Uniform invocable representation.
//!
//! Every resolved call, whether it came from a plain descriptor or from a
//! dispatch factory, is invoked the same way: `invoke(context, operands)`.

use std::any::Any;
use std::sync::Arc;

use flowvm_types::TypeId;

/// Ambient execution state handed to every invocable.
pub trait ExecuteContext: Any {
	/// The structural type this context presents to functions.
	fn context_type(&self) -> TypeId;
}

/// One operand slot backed by caller-owned storage.
pub struct Operand<'a> {
	type_id: TypeId,
	value: &'a mut dyn Any,
}

impl<'a> Operand<'a> {
	pub fn new(type_id: TypeId, value: &'a mut dyn Any) -> Self {
		Self { type_id, value }
	}

	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	pub fn get<T: Any>(&self) -> Option<&T> {
		self.value.downcast_ref()
	}

	pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.value.downcast_mut()
	}
}

impl std::fmt::Debug for Operand<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Operand").field("type_id", &self.type_id).finish_non_exhaustive()
	}
}

/// Plain function signature shared by all registered functions.
pub type FunctionPtr = fn(&mut dyn ExecuteContext, &mut [Operand<'_>]);

/// Closure signature for factory-produced invocables.
pub type DispatchFn = dyn Fn(&mut dyn ExecuteContext, &mut [Operand<'_>]) + Send + Sync;

/// A callable function body.
#[derive(Clone)]
pub enum Invocable {
	Function(FunctionPtr),
	Closure(Arc<DispatchFn>),
}

impl Invocable {
	pub fn closure<F>(f: F) -> Self
	where
		F: Fn(&mut dyn ExecuteContext, &mut [Operand<'_>]) + Send + Sync + 'static,
	{
		Self::Closure(Arc::new(f))
	}

	#[inline]
	pub fn invoke(&self, context: &mut dyn ExecuteContext, operands: &mut [Operand<'_>]) {
		match self {
			Self::Function(f) => f(context, operands),
			Self::Closure(f) => f(context, operands),
		}
	}
}

impl From<FunctionPtr> for Invocable {
	fn from(f: FunctionPtr) -> Self {
		Self::Function(f)
	}
}

impl std::fmt::Debug for Invocable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Function(ptr) => write!(f, "Function({:p})", *ptr as *const ()),
			Self::Closure(_) => f.write_str("Closure"),
		}
	}
}
