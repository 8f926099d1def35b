//! The function registry.
//!
//! # Mental Model
//!
//! 1. **Registration:** a [`RegistryBuilder`] collects functions, template
//!    groups, dispatch factories and owning structs. Configuration errors fail
//!    loudly here.
//! 2. **Initialization:** [`FunctionRegistry::initialize`] validates the tables
//!    and freezes them behind a [`RegistryHandle`].
//! 3. **Resolution:** readers on any thread look functions up by index or name,
//!    resolve templates and factories, and [`FunctionRegistry::bind`] call sites.
//! 4. **Teardown:** [`FunctionRegistry::shutdown`] consumes the last handle.
//!
//! # Concurrency
//!
//! The tables are immutable after initialization. The only writes are the
//! per-descriptor type cache (CAS install) and the template/factory memo tables
//! (insert-if-absent under a short write lock). Both are idempotent.

mod bind;
mod builder;

use std::borrow::Cow;
use std::sync::Arc;

use flowvm_types::{TypeId, TypeIndex};
use rustc_hash::FxHashMap;

pub use self::bind::Binding;
pub use self::builder::RegistryBuilder;
use crate::argument::Argument;
use crate::config::RegistryConfig;
use crate::context;
use crate::descriptor::{FunctionDescriptor, Owner, TypeIds};
use crate::error::{RegistrationError, ResolveError, ShutdownError};
use crate::factory::{Dispatch, FactoryEntry};
use crate::ids::{FactoryId, FunctionIndex, StructId, TemplateId};
use crate::operand;
use crate::owner::StructEntry;
use crate::template::{self, Selection, TemplateGroup};

/// Shared ownership token for an initialized registry.
pub type RegistryHandle = Arc<FunctionRegistry>;

/// Immutable function tables plus their resolution caches.
pub struct FunctionRegistry {
	config: RegistryConfig,
	types: Arc<dyn TypeIndex>,
	default_context: TypeId,
	functions: Box<[FunctionDescriptor]>,
	by_name: FxHashMap<Box<str>, FunctionIndex>,
	templates: Box<[TemplateGroup]>,
	template_names: FxHashMap<Box<str>, TemplateId>,
	factories: Box<[FactoryEntry]>,
	structs: Box<[StructEntry]>,
}

impl FunctionRegistry {
	/// Freezes a builder into a shareable registry.
	///
	/// With `eager_type_resolution` enabled every argument type is resolved
	/// here, so an unknown type aborts initialization instead of surfacing at
	/// bind time.
	pub fn initialize(builder: RegistryBuilder) -> Result<RegistryHandle, RegistrationError> {
		let registry = Self {
			config: builder.config,
			types: builder.types,
			default_context: builder.default_context,
			functions: builder.functions.into_boxed_slice(),
			by_name: builder.by_name,
			templates: builder.templates.into_boxed_slice(),
			template_names: builder.template_names,
			factories: builder.factories.into_boxed_slice(),
			structs: builder.structs.into_boxed_slice(),
		};

		if registry.config.eager_type_resolution {
			for descriptor in registry.functions.iter() {
				descriptor
					.argument_type_ids(&*registry.types)
					.map_err(builder::registration_error)?;
			}
		}

		tracing::info!(
			functions = registry.functions.len(),
			templates = registry.templates.len(),
			factories = registry.factories.len(),
			structs = registry.structs.len(),
			eager = registry.config.eager_type_resolution,
			"function registry initialized"
		);
		Ok(Arc::new(registry))
	}

	/// Tears the registry down. Refuses while other handles are alive; the
	/// passed handle is released either way.
	pub fn shutdown(handle: RegistryHandle) -> Result<(), ShutdownError> {
		match Arc::try_unwrap(handle) {
			Ok(registry) => {
				tracing::info!(functions = registry.functions.len(), "function registry shut down");
				drop(registry);
				Ok(())
			}
			Err(shared) => {
				let handles = Arc::strong_count(&shared) - 1;
				tracing::warn!(handles, "function registry shutdown refused while shared");
				Err(ShutdownError::StillShared { handles })
			}
		}
	}

	pub fn config(&self) -> &RegistryConfig {
		&self.config
	}

	pub fn types(&self) -> &dyn TypeIndex {
		&*self.types
	}

	/// Context type required by functions that declare none.
	pub fn default_context(&self) -> TypeId {
		self.default_context
	}

	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}

	/// Iterates functions in index order.
	pub fn iter(&self) -> impl Iterator<Item = FunctionRef<'_>> + '_ {
		self.functions.iter().map(move |descriptor| FunctionRef {
			registry: self,
			descriptor,
		})
	}

	pub fn by_index(&self, index: FunctionIndex) -> Option<FunctionRef<'_>> {
		self.functions
			.get(index.as_usize())
			.map(|descriptor| FunctionRef { registry: self, descriptor })
	}

	/// Looks a function up by its registered name.
	pub fn by_name(&self, name: &str) -> Result<FunctionRef<'_>, ResolveError> {
		match self.by_name.get(name) {
			Some(&index) => Ok(FunctionRef {
				registry: self,
				descriptor: &self.functions[index.as_usize()],
			}),
			None => Err(ResolveError::NotFound {
				name: name.to_string(),
				suggestion: self.suggest(name),
			}),
		}
	}

	pub fn template(&self, id: TemplateId) -> Option<&TemplateGroup> {
		self.templates.get(id.as_usize())
	}

	pub fn template_by_name(&self, name: &str) -> Option<&TemplateGroup> {
		self.template_names.get(name).and_then(|&id| self.template(id))
	}

	pub fn factory(&self, id: FactoryId) -> Option<&FactoryEntry> {
		self.factories.get(id.as_usize())
	}

	pub fn struct_entry(&self, id: StructId) -> Option<&StructEntry> {
		self.structs.get(id.as_usize())
	}

	/// Resolves a template group against runtime argument types.
	pub fn resolve_template(&self, id: TemplateId, runtime: &[TypeId]) -> Result<FunctionRef<'_>, ResolveError> {
		let group = self.template(id).ok_or(ResolveError::UnknownTemplate(id))?;
		if let Some(index) = group.memoized(runtime) {
			return Ok(self.function_ref(index));
		}

		let mut signatures: Vec<(FunctionIndex, Arc<TypeIds>)> = Vec::with_capacity(group.members.len());
		for &member in &group.members {
			let types = self.functions[member.as_usize()].argument_type_ids(&*self.types)?;
			signatures.push((member, types));
		}
		let candidates = signatures.iter().map(|(index, types)| (*index, types.as_slice()));

		match template::select(candidates, runtime, &*self.types, self.config.subtype_overloads) {
			Selection::Found(winner) => {
				let winner = group.memoize(runtime, winner);
				tracing::debug!(
					template = group.name(),
					types = %self.types.describe(runtime),
					function = self.functions[winner.as_usize()].name(),
					"resolved template"
				);
				Ok(self.function_ref(winner))
			}
			Selection::NoMatch => Err(ResolveError::NoMatchingOverload {
				target: group.name().to_string(),
				types: self.types.describe(runtime),
			}),
			Selection::Ambiguous(twins) => {
				let candidates: Vec<String> = twins
					.iter()
					.map(|index| self.functions[index.as_usize()].name().to_string())
					.collect();
				tracing::error!(template = group.name(), ?candidates, "template members share a signature");
				Err(ResolveError::AmbiguousOverload {
					target: group.name().to_string(),
					types: self.types.describe(runtime),
					candidates,
				})
			}
		}
	}

	/// Resolves a dispatch factory against runtime operand types. Repeated calls
	/// with the same types return the same `Arc`.
	pub fn resolve_factory(&self, id: FactoryId, runtime: &[TypeId]) -> Result<Arc<Dispatch>, ResolveError> {
		let entry = self.factory(id).ok_or(ResolveError::UnknownFactory(id))?;
		entry
			.resolve(runtime, &*self.types)
			.ok_or_else(|| ResolveError::UnsupportedTypeCombination {
				factory: entry.name().to_string(),
				types: self.types.describe(runtime),
			})
	}

	/// Context type `descriptor` requires: its factory's, else its struct's, else the default.
	pub fn execute_context_type(&self, descriptor: &FunctionDescriptor) -> TypeId {
		let declared = match descriptor.owner {
			Owner::Factory(id) => self.factory(id).and_then(FactoryEntry::context_type),
			Owner::Struct(id) => self.struct_entry(id).and_then(StructEntry::context_type),
			Owner::None => None,
		};
		declared.unwrap_or(self.default_context)
	}

	pub fn supports_execute_context(&self, descriptor: &FunctionDescriptor, candidate: TypeId) -> bool {
		context::supports_execute_context(&*self.types, self.execute_context_type(descriptor), candidate)
	}

	/// Names the argument operand `operand_index` stands for. Factory-bound
	/// functions let their factory answer first.
	pub fn argument_name_for_operand<'a>(
		&'a self,
		descriptor: &'a FunctionDescriptor,
		operand_index: usize,
		total_operands: usize,
	) -> Result<Cow<'a, str>, ResolveError> {
		if let Owner::Factory(id) = descriptor.owner
			&& operand_index < total_operands
			&& let Some(name) = self
				.factory(id)
				.and_then(|entry| entry.factory().argument_name_for_operand(operand_index, total_operands))
		{
			return Ok(name);
		}
		self.argument_for_operand(descriptor, operand_index, total_operands)
			.map(|arg| Cow::Borrowed(arg.name()))
	}

	/// The declared argument operand `operand_index` stands for.
	pub fn argument_for_operand<'a>(
		&self,
		descriptor: &'a FunctionDescriptor,
		operand_index: usize,
		total_operands: usize,
	) -> Result<&'a Argument, ResolveError> {
		operand::argument_for_operand(descriptor.name(), descriptor.arguments(), operand_index, total_operands)
	}

	fn function_ref(&self, index: FunctionIndex) -> FunctionRef<'_> {
		FunctionRef {
			registry: self,
			descriptor: &self.functions[index.as_usize()],
		}
	}

	fn suggest(&self, name: &str) -> Option<String> {
		if !self.config.suggest_names {
			return None;
		}
		self.by_name
			.keys()
			.map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
			.filter(|(score, _)| *score > 0.8)
			.max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)))
			.map(|(_, candidate)| candidate.to_string())
	}
}

impl std::fmt::Debug for FunctionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FunctionRegistry")
			.field("functions", &self.functions.len())
			.field("templates", &self.templates.len())
			.field("factories", &self.factories.len())
			.field("structs", &self.structs.len())
			.finish_non_exhaustive()
	}
}

/// A descriptor paired with the registry that owns it.
#[derive(Clone, Copy)]
pub struct FunctionRef<'r> {
	registry: &'r FunctionRegistry,
	descriptor: &'r FunctionDescriptor,
}

impl<'r> FunctionRef<'r> {
	pub fn registry(&self) -> &'r FunctionRegistry {
		self.registry
	}

	pub fn descriptor(&self) -> &'r FunctionDescriptor {
		self.descriptor
	}

	/// Resolved argument types, computed once and cached.
	pub fn argument_type_indices(&self) -> Result<Arc<TypeIds>, ResolveError> {
		self.descriptor.argument_type_ids(self.registry.types())
	}

	/// The generic family this function belongs to. Groups with a single
	/// permutation are not generic and yield `None`.
	pub fn template(&self) -> Option<&'r TemplateGroup> {
		let group = self.registry.template(self.descriptor.template?)?;
		(group.num_permutations() > 1).then_some(group)
	}

	pub fn execute_context_type(&self) -> TypeId {
		self.registry.execute_context_type(self.descriptor)
	}

	pub fn supports_execute_context(&self, candidate: TypeId) -> bool {
		self.registry.supports_execute_context(self.descriptor, candidate)
	}

	pub fn argument_name_for_operand(&self, operand_index: usize, total_operands: usize) -> Result<Cow<'r, str>, ResolveError> {
		self.registry
			.argument_name_for_operand(self.descriptor, operand_index, total_operands)
	}

	pub fn argument_for_operand(&self, operand_index: usize, total_operands: usize) -> Result<&'r Argument, ResolveError> {
		self.registry
			.argument_for_operand(self.descriptor, operand_index, total_operands)
	}

	/// Name of the owning struct or factory.
	pub fn owner_name(&self) -> Option<&'r str> {
		match self.descriptor.owner {
			Owner::Struct(id) => self.registry.struct_entry(id).map(StructEntry::name),
			Owner::Factory(id) => self.registry.factory(id).map(FactoryEntry::name),
			Owner::None => None,
		}
	}

	/// Module of the owning struct.
	pub fn module_name(&self) -> Option<&'r str> {
		match self.descriptor.owner {
			Owner::Struct(id) => self.registry.struct_entry(id).map(StructEntry::module),
			_ => None,
		}
	}

	/// Module-relative header path of the owning struct, if it recorded one.
	pub fn module_relative_header_path(&self) -> Option<&'r str> {
		match self.descriptor.owner {
			Owner::Struct(id) => self.registry.struct_entry(id).and_then(StructEntry::header_path),
			_ => None,
		}
	}
}

impl std::ops::Deref for FunctionRef<'_> {
	type Target = FunctionDescriptor;

	fn deref(&self) -> &FunctionDescriptor {
		self.descriptor
	}
}

impl std::fmt::Debug for FunctionRef<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FunctionRef")
			.field("index", &self.descriptor.index)
			.field("name", &self.descriptor.name)
			.finish()
	}
}
