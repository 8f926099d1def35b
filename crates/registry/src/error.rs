use crate::ids::{FactoryId, FunctionIndex, StructId, TemplateId};

/// Fatal registration errors. Any of these aborts the registration phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
	/// The descriptor has an empty name or no invocable.
	#[error("invalid function descriptor: name={name:?} has_invocable={has_invocable}")]
	InvalidDescriptor { name: String, has_invocable: bool },

	/// Another descriptor already uses this name.
	#[error("duplicate function name: {name:?} already registered at {existing}")]
	DuplicateName { name: String, existing: FunctionIndex },

	/// A declared argument type does not resolve.
	#[error("unknown type {type_text:?} for argument {argument:?} of {function:?}")]
	UnknownType {
		function: String,
		argument: String,
		type_text: String,
	},

	/// An execute-context type text does not resolve.
	#[error("unknown execute context type {type_text:?} declared by {owner:?}")]
	UnknownContextType { owner: String, type_text: String },

	/// A variadic argument that is not the last one.
	#[error("variadic argument {argument:?} of {function:?} must be the last argument")]
	MisplacedVariadic { function: String, argument: String },

	/// A template member whose argument shape differs from the group's.
	#[error("{function:?} does not match the shape of template {template:?}: expected {expected}")]
	TemplateShapeMismatch {
		template: String,
		function: String,
		expected: String,
	},

	/// A template member whose type sequence is already taken.
	#[error("template {template:?} already has a member with types {types}: {existing:?}")]
	DuplicateTemplateSignature {
		template: String,
		types: String,
		existing: String,
	},

	#[error("unknown template: {0}")]
	UnknownTemplate(TemplateId),

	#[error("unknown dispatch factory: {0}")]
	UnknownFactory(FactoryId),

	#[error("unknown struct: {0}")]
	UnknownStruct(StructId),
}

/// Resolution errors, reported back to the bind step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
	/// No descriptor carries this name.
	#[error("function not found: {name:?}{}", suggestion_suffix(.suggestion))]
	NotFound { name: String, suggestion: Option<String> },

	#[error("unknown function index: {0}")]
	UnknownFunction(FunctionIndex),

	#[error("unknown template: {0}")]
	UnknownTemplate(TemplateId),

	#[error("unknown dispatch factory: {0}")]
	UnknownFactory(FactoryId),

	/// A declared argument type failed lazy resolution.
	#[error("unknown type {type_text:?} for argument {argument:?} of {function:?}")]
	UnknownType {
		function: String,
		argument: String,
		type_text: String,
	},

	/// No overload of `target` (a template, or a plain function at bind time)
	/// accepts the runtime types.
	#[error("no overload of {target:?} accepts {types}")]
	NoMatchingOverload { target: String, types: String },

	/// Two template members are equally good for the runtime types.
	#[error("ambiguous overload of {target:?} for {types}: {candidates:?}")]
	AmbiguousOverload {
		target: String,
		types: String,
		candidates: Vec<String>,
	},

	/// The factory has no variant for the runtime types.
	#[error("dispatch factory {factory:?} does not support {types}")]
	UnsupportedTypeCombination { factory: String, types: String },

	/// The operand index has no corresponding declared argument.
	#[error(
		"operand {operand_index} out of range for {function:?} ({total_operands} operands, {declared} declared arguments)"
	)]
	OperandIndexOutOfRange {
		function: String,
		operand_index: usize,
		total_operands: usize,
		declared: usize,
	},

	/// The caller's execute context does not satisfy the function's requirement.
	#[error("{function:?} requires execute context {required}, got {candidate}")]
	ContextMismatch {
		function: String,
		required: String,
		candidate: String,
	},
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
	match suggestion {
		Some(s) => format!(" (did you mean {s:?}?)"),
		None => String::new(),
	}
}

/// Returned when tearing down a registry that is still shared.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShutdownError {
	#[error("registry still shared by {handles} other handle(s)")]
	StillShared { handles: usize },
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid registry config: {0}")]
	Parse(#[from] toml::de::Error),
}
