//! Structural types that own methods.

use std::borrow::Cow;

use flowvm_types::TypeId;

use crate::ids::StructId;

/// Registration input for a structural type whose methods are registered functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInfo {
	pub name: Cow<'static, str>,
	/// Module that declares the struct.
	pub module: Cow<'static, str>,
	/// Execute context type text required by the struct's methods, if it
	/// differs from the registry default.
	pub execute_context: Option<Cow<'static, str>>,
	/// Header path relative to the module root, e.g. `Math/Vector.h`.
	pub header_path: Option<Cow<'static, str>>,
}

impl StructInfo {
	pub fn new(name: impl Into<Cow<'static, str>>, module: impl Into<Cow<'static, str>>) -> Self {
		Self {
			name: name.into(),
			module: module.into(),
			execute_context: None,
			header_path: None,
		}
	}

	pub fn with_header_path(mut self, path: impl Into<Cow<'static, str>>) -> Self {
		self.header_path = Some(path.into());
		self
	}

	pub fn with_execute_context(mut self, type_text: impl Into<Cow<'static, str>>) -> Self {
		self.execute_context = Some(type_text.into());
		self
	}
}

/// A registered struct with its context type resolved.
#[derive(Debug)]
pub struct StructEntry {
	pub(crate) id: StructId,
	pub(crate) info: StructInfo,
	pub(crate) context_type: Option<TypeId>,
}

impl StructEntry {
	pub fn id(&self) -> StructId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.info.name
	}

	pub fn module(&self) -> &str {
		&self.info.module
	}

	pub fn header_path(&self) -> Option<&str> {
		self.info.header_path.as_deref()
	}

	/// Declared execute context, if any.
	pub fn context_type(&self) -> Option<TypeId> {
		self.context_type
	}
}
