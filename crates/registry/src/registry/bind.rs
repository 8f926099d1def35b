//! Call-site binding.
//!
//! Runs the full resolution pipeline for one call: template member selection,
//! execute-context check, then either factory dispatch or the function's own
//! body with a layout derived from its declared arguments.

use std::sync::Arc;

use flowvm_types::TypeId;

use super::{FunctionRef, FunctionRegistry};
use crate::argument::{ExecuteArgument, OperandLayout};
use crate::descriptor::Owner;
use crate::error::ResolveError;
use crate::factory::Dispatch;
use crate::ids::FunctionIndex;
use crate::invoke::{ExecuteContext, Operand};

/// A fully resolved call, ready for the execution loop.
#[derive(Debug, Clone)]
pub struct Binding {
	/// The concrete function after template resolution.
	pub function: FunctionIndex,
	pub dispatch: Arc<Dispatch>,
}

impl Binding {
	pub fn layout(&self) -> &OperandLayout {
		&self.dispatch.layout
	}

	#[inline]
	pub fn invoke(&self, context: &mut dyn ExecuteContext, operands: &mut [Operand<'_>]) {
		self.dispatch.invocable.invoke(context, operands);
	}
}

impl FunctionRegistry {
	/// Resolves the invocable and operand layout for a call of `function` with
	/// the given runtime operand types under `context_type`.
	pub fn bind(&self, function: FunctionIndex, runtime: &[TypeId], context_type: TypeId) -> Result<Binding, ResolveError> {
		let mut target = self.by_index(function).ok_or(ResolveError::UnknownFunction(function))?;
		if let Some(group) = target.template() {
			target = self.resolve_template(group.id(), runtime)?;
		}

		if !target.supports_execute_context(context_type) {
			return Err(ResolveError::ContextMismatch {
				function: target.name().to_string(),
				required: self.describe_type(target.execute_context_type()),
				candidate: self.describe_type(context_type),
			});
		}

		let dispatch = match target.owner() {
			Owner::Factory(id) => self.resolve_factory(id, runtime)?,
			Owner::None | Owner::Struct(_) => Arc::new(Dispatch {
				invocable: target.invocable().clone(),
				layout: self.declared_layout(target, runtime)?,
			}),
		};
		tracing::trace!(
			function = target.name(),
			slots = dispatch.layout.len(),
			"bound call"
		);
		Ok(Binding {
			function: target.index(),
			dispatch,
		})
	}

	/// Layout of a plain call: one slot per operand, each typed by the
	/// argument it maps to. Every runtime type must fit its slot.
	fn declared_layout(&self, target: FunctionRef<'_>, runtime: &[TypeId]) -> Result<OperandLayout, ResolveError> {
		let declared = target.argument_type_indices()?;
		let arguments = target.arguments();
		let fixed = if target.is_variadic() {
			arguments.len() - 1
		} else {
			arguments.len()
		};
		let mismatch = || ResolveError::NoMatchingOverload {
			target: target.name().to_string(),
			types: self.types().describe(runtime),
		};
		if runtime.len() < fixed || (!target.is_variadic() && runtime.len() != fixed) {
			return Err(mismatch());
		}

		let total = runtime.len();
		let mut layout = OperandLayout::new();
		for (operand, &have) in runtime.iter().enumerate() {
			let position = operand.min(arguments.len() - 1);
			let argument = target.argument_for_operand(operand, total)?;
			let want = declared[position];
			if have != want && !self.types().is_subtype(have, want) {
				return Err(mismatch());
			}
			layout.push(ExecuteArgument::new(argument.name.clone(), argument.direction, want));
		}
		Ok(layout)
	}

	fn describe_type(&self, id: TypeId) -> String {
		match self.types().name(id) {
			Some(name) => name.to_string(),
			None => id.to_string(),
		}
	}
}
