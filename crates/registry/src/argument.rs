//! Declared arguments and resolved operand layouts.

use std::borrow::Cow;

use flowvm_types::TypeId;
use smallvec::SmallVec;

/// Role of a pin in the data-flow graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PinDirection {
	/// A const input value.
	#[default]
	Input,
	/// A mutable output value.
	Output,
	/// A mutable input and output value.
	IO,
	/// A const value that cannot be connected to.
	Visible,
	/// A mutable hidden value (internal state).
	Hidden,
}

impl PinDirection {
	/// Returns true if the invocable may write through this operand.
	pub fn is_mutable(self) -> bool {
		matches!(self, Self::Output | Self::IO | Self::Hidden)
	}

	pub(crate) fn notation(self) -> &'static str {
		match self {
			Self::Input => "in",
			Self::Output => "out",
			Self::IO => "io",
			Self::Visible => "const",
			Self::Hidden => "hidden",
		}
	}
}

impl std::fmt::Display for PinDirection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.notation())
	}
}

/// One declared argument of a function.
///
/// A declared type ending in `*` marks the argument variadic: it may repeat to
/// fill any number of trailing operands, each of the element type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
	pub name: Cow<'static, str>,
	pub type_text: Cow<'static, str>,
	pub direction: PinDirection,
}

impl Argument {
	pub fn new(name: impl Into<Cow<'static, str>>, type_text: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			type_text: type_text.into(),
			direction: PinDirection::Input,
		}
	}

	/// Shorthand for an output argument.
	pub fn output(name: impl Into<Cow<'static, str>>, type_text: impl Into<Cow<'static, str>>) -> Self {
		Self::new(name, type_text).with_direction(PinDirection::Output)
	}

	pub fn with_direction(mut self, direction: PinDirection) -> Self {
		self.direction = direction;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn is_variadic(&self) -> bool {
		self.type_text.trim_end().ends_with('*')
	}

	/// The type text each operand bound to this argument carries.
	pub fn element_type(&self) -> &str {
		let text = self.type_text.trim();
		text.strip_suffix('*').map(str::trim_end).unwrap_or(text)
	}
}

/// One resolved operand slot of a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecuteArgument {
	pub name: Cow<'static, str>,
	pub direction: PinDirection,
	pub type_id: TypeId,
}

impl ExecuteArgument {
	pub fn new(name: impl Into<Cow<'static, str>>, direction: PinDirection, type_id: TypeId) -> Self {
		Self {
			name: name.into(),
			direction,
			type_id,
		}
	}
}

/// Ordered operand slots of a resolved call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct OperandLayout {
	slots: SmallVec<[ExecuteArgument; 4]>,
}

impl OperandLayout {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, slot: ExecuteArgument) {
		self.slots.push(slot);
	}

	pub fn slots(&self) -> &[ExecuteArgument] {
		&self.slots
	}

	/// Number of memory slots the call needs.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Type ids in slot order.
	pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
		self.slots.iter().map(|slot| slot.type_id)
	}
}

impl FromIterator<ExecuteArgument> for OperandLayout {
	fn from_iter<I: IntoIterator<Item = ExecuteArgument>>(iter: I) -> Self {
		Self {
			slots: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn variadic_marker() {
		let items = Argument::new("items", "Float *");
		assert!(items.is_variadic());
		assert_eq!(items.element_type(), "Float");

		let plain = Argument::output("Result", " Float ");
		assert!(!plain.is_variadic());
		assert_eq!(plain.element_type(), "Float");
		assert!(plain.direction.is_mutable());
	}
}
