//! Registration phase.
//!
//! Every method validates its input up front and fails with a
//! [`RegistrationError`] without touching the tables, so a caller that aborts
//! on the first error never observes a half-registered function.

use std::sync::Arc;

use flowvm_types::{TypeId, TypeIndex};
use rustc_hash::FxHashMap;

use crate::argument::Argument;
use crate::config::RegistryConfig;
use crate::descriptor::{FunctionDef, FunctionDescriptor, Owner};
use crate::error::{RegistrationError, ResolveError};
use crate::factory::{DispatchFactory, FactoryEntry};
use crate::ids::{FactoryId, FunctionIndex, StructId, TemplateId};
use crate::owner::{StructEntry, StructInfo};
use crate::template::{self, TemplateGroup};

/// Collects functions, templates, factories and structs before the registry is
/// frozen by [`super::FunctionRegistry::initialize`].
pub struct RegistryBuilder {
	pub(super) config: RegistryConfig,
	pub(super) types: Arc<dyn TypeIndex>,
	pub(super) default_context: TypeId,
	pub(super) functions: Vec<FunctionDescriptor>,
	pub(super) by_name: FxHashMap<Box<str>, FunctionIndex>,
	pub(super) templates: Vec<TemplateGroup>,
	pub(super) template_names: FxHashMap<Box<str>, TemplateId>,
	pub(super) factories: Vec<FactoryEntry>,
	pub(super) structs: Vec<StructEntry>,
}

impl RegistryBuilder {
	/// Creates a builder. Fails if the configured default context type is unknown.
	pub fn new(types: Arc<dyn TypeIndex>, config: RegistryConfig) -> Result<Self, RegistrationError> {
		let default_context =
			types
				.resolve(&config.default_execute_context)
				.map_err(|_| RegistrationError::UnknownContextType {
					owner: "registry config".to_string(),
					type_text: config.default_execute_context.clone(),
				})?;
		Ok(Self {
			config,
			types,
			default_context,
			functions: Vec::new(),
			by_name: FxHashMap::default(),
			templates: Vec::new(),
			template_names: FxHashMap::default(),
			factories: Vec::new(),
			structs: Vec::new(),
		})
	}

	/// Creates a builder with [`RegistryConfig::default`].
	pub fn with_defaults(types: Arc<dyn TypeIndex>) -> Result<Self, RegistrationError> {
		Self::new(types, RegistryConfig::default())
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	/// Number of functions registered so far.
	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}

	/// Registers a free function.
	pub fn register(&mut self, def: FunctionDef) -> Result<FunctionIndex, RegistrationError> {
		self.insert(def, Owner::None, None)
	}

	/// Registers a structural type whose methods can then be registered.
	pub fn register_struct(&mut self, info: StructInfo) -> Result<StructId, RegistrationError> {
		let context_type = match &info.execute_context {
			Some(text) => Some(self.resolve_context(&info.name, text)?),
			None => None,
		};
		let id = StructId::from_len(self.structs.len());
		tracing::debug!(name = %info.name, %id, "registered struct");
		self.structs.push(StructEntry { id, info, context_type });
		Ok(id)
	}

	/// Registers a method of a previously registered struct.
	pub fn register_struct_method(&mut self, owner: StructId, def: FunctionDef) -> Result<FunctionIndex, RegistrationError> {
		self.check_owner(Owner::Struct(owner))?;
		self.insert(def, Owner::Struct(owner), None)
	}

	/// Registers a dispatch factory.
	pub fn register_factory(&mut self, factory: Arc<dyn DispatchFactory>) -> Result<FactoryId, RegistrationError> {
		let context_type = match factory.execute_context() {
			Some(text) => Some(self.resolve_context(factory.name(), text)?),
			None => None,
		};
		let id = FactoryId::from_len(self.factories.len());
		tracing::debug!(name = factory.name(), %id, "registered dispatch factory");
		self.factories.push(FactoryEntry::new(id, factory, context_type));
		Ok(id)
	}

	/// Registers a function backed by a factory. Binding such a function asks
	/// the factory for the concrete invocable.
	pub fn register_factory_function(&mut self, factory: FactoryId, def: FunctionDef) -> Result<FunctionIndex, RegistrationError> {
		self.check_owner(Owner::Factory(factory))?;
		self.insert(def, Owner::Factory(factory), None)
	}

	/// Returns the id of the template group called `name`, creating it if needed.
	pub fn template(&mut self, name: &str) -> TemplateId {
		if let Some(&id) = self.template_names.get(name) {
			return id;
		}
		let id = TemplateId::from_len(self.templates.len());
		self.templates.push(TemplateGroup::new(id, name));
		self.template_names.insert(Box::from(name), id);
		id
	}

	/// Registers a free function as a member of a template group.
	///
	/// The member must share the group's argument shape and its type sequence
	/// must differ from every existing member's.
	pub fn register_template_member(&mut self, template: TemplateId, def: FunctionDef) -> Result<FunctionIndex, RegistrationError> {
		self.register_owned_template_member(template, Owner::None, def)
	}

	/// Registers a struct method or factory-backed function as a member of a
	/// template group. The member keeps its owner's execute context.
	pub fn register_owned_template_member(
		&mut self,
		template: TemplateId,
		owner: Owner,
		def: FunctionDef,
	) -> Result<FunctionIndex, RegistrationError> {
		self.check_owner(owner)?;
		let group = self
			.templates
			.get(template.as_usize())
			.ok_or(RegistrationError::UnknownTemplate(template))?;

		if let Some(&first) = group.members.first() {
			let shape = &self.functions[first.as_usize()].arguments;
			if !template::same_shape(shape, &def.arguments) {
				return Err(RegistrationError::TemplateShapeMismatch {
					template: group.name.to_string(),
					function: def.name.to_string(),
					expected: group.notation.clone().unwrap_or_default(),
				});
			}
		}

		let signature = resolve_arguments(&*self.types, &def.name, &def.arguments)?;
		for &member in &group.members {
			let existing = &self.functions[member.as_usize()];
			let existing_types = existing
				.argument_type_ids(&*self.types)
				.map_err(registration_error)?;
			if existing_types.as_slice() == signature.as_slice() {
				return Err(RegistrationError::DuplicateTemplateSignature {
					template: group.name.to_string(),
					types: self.types.describe(&signature),
					existing: existing.name.to_string(),
				});
			}
		}

		let notation = template::notation(&group.name, &def.arguments);
		let index = self.insert(def, owner, Some(template))?;
		let group = &mut self.templates[template.as_usize()];
		group.notation.get_or_insert(notation);
		group.members.push(index);
		Ok(index)
	}

	fn insert(&mut self, def: FunctionDef, owner: Owner, template: Option<TemplateId>) -> Result<FunctionIndex, RegistrationError> {
		let Some(invocable) = def.invocable.clone().filter(|_| !def.name.is_empty()) else {
			tracing::warn!(name = %def.name, "rejected invalid function descriptor");
			return Err(RegistrationError::InvalidDescriptor {
				name: def.name.to_string(),
				has_invocable: def.invocable.is_some(),
			});
		};
		if let Some(&existing) = self.by_name.get(def.name.as_ref()) {
			tracing::warn!(name = %def.name, %existing, "rejected duplicate function name");
			return Err(RegistrationError::DuplicateName {
				name: def.name.to_string(),
				existing,
			});
		}
		let last = def.arguments.len().saturating_sub(1);
		if let Some((_, arg)) = def.arguments.iter().enumerate().find(|(i, arg)| arg.is_variadic() && *i != last) {
			return Err(RegistrationError::MisplacedVariadic {
				function: def.name.to_string(),
				argument: arg.name.to_string(),
			});
		}

		let index = FunctionIndex::from_len(self.functions.len());
		let descriptor = FunctionDescriptor::from_def(def, invocable, index, owner, template);
		tracing::debug!(
			function = descriptor.name(),
			index = index.as_u32(),
			?owner,
			?template,
			arity = descriptor.arguments().len(),
			"registered function"
		);
		self.by_name.insert(Box::from(descriptor.name()), index);
		self.functions.push(descriptor);
		Ok(index)
	}

	fn check_owner(&self, owner: Owner) -> Result<(), RegistrationError> {
		match owner {
			Owner::Struct(id) if id.as_usize() >= self.structs.len() => Err(RegistrationError::UnknownStruct(id)),
			Owner::Factory(id) if id.as_usize() >= self.factories.len() => Err(RegistrationError::UnknownFactory(id)),
			_ => Ok(()),
		}
	}

		fn resolve_context(&self, owner: &str, text: &str) -> Result<TypeId, RegistrationError> {
		self.types
			.resolve(text)
			.map_err(|_| RegistrationError::UnknownContextType {
				owner: owner.to_string(),
				type_text: text.to_string(),
			})
	}
}

fn resolve_arguments(types: &dyn TypeIndex, function: &str, arguments: &[Argument]) -> Result<Vec<TypeId>, RegistrationError> {
	arguments
		.iter()
		.map(|arg| {
			types
				.resolve(arg.element_type())
				.map_err(|_| RegistrationError::UnknownType {
					function: function.to_string(),
					argument: arg.name.to_string(),
					type_text: arg.type_text.to_string(),
				})
		})
		.collect()
}

/// Lifts a lazy resolution failure into the fatal registration taxonomy.
pub(super) fn registration_error(err: ResolveError) -> RegistrationError {
	match err {
		ResolveError::UnknownType {
			function,
			argument,
			type_text,
		} => RegistrationError::UnknownType {
			function,
			argument,
			type_text,
		},
		other => unreachable!("argument type resolution only fails with UnknownType, got {other}"),
	}
}
