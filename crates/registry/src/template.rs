//! Template groups: generic overload families.
//!
//! # Role
//!
//! A group collects functions with the same argument shape (count, names,
//! directions) and distinct type sequences. Resolution picks the member that
//! fits a call's runtime types.
//!
//! # Precedence
//!
//! 1. Exact match on every position.
//! 2. Otherwise, members whose declared types are equal to or supertypes of the
//!    runtime types; more exact positions win.
//! 3. Remaining ties go to the lowest function index.
//!
//! Two best candidates with identical declared sequences are ambiguous. The
//! builder rejects duplicate sequences, so reaching that state means the
//! registration invariant was broken.

use flowvm_types::{TypeId, TypeIndex};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::argument::Argument;
use crate::descriptor::TypeIds;
use crate::ids::{FunctionIndex, TemplateId};

/// A named overload family.
pub struct TemplateGroup {
	pub(crate) id: TemplateId,
	pub(crate) name: Box<str>,
	pub(crate) members: Vec<FunctionIndex>,
	pub(crate) notation: Option<String>,
	memo: RwLock<FxHashMap<TypeIds, FunctionIndex>>,
}

impl TemplateGroup {
	pub(crate) fn new(id: TemplateId, name: &str) -> Self {
		Self {
			id,
			name: Box::from(name),
			members: Vec::new(),
			notation: None,
			memo: RwLock::new(FxHashMap::default()),
		}
	}

	pub fn id(&self) -> TemplateId {
		self.id
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Member function indices in registration order.
	pub fn members(&self) -> &[FunctionIndex] {
		&self.members
	}

	pub fn num_permutations(&self) -> usize {
		self.members.len()
	}

	/// Shape of the group, e.g. `Add(in A,in B,out Result)`. `None` until the
	/// first member registers.
	pub fn notation(&self) -> Option<&str> {
		self.notation.as_deref()
	}

	pub(crate) fn memoized(&self, runtime: &[TypeId]) -> Option<FunctionIndex> {
		self.memo.read().get(runtime).copied()
	}

	/// Records a resolution. The first recorded winner stays.
	pub(crate) fn memoize(&self, runtime: &[TypeId], winner: FunctionIndex) -> FunctionIndex {
		*self.memo.write().entry(TypeIds::from_slice(runtime)).or_insert(winner)
	}
}

impl std::fmt::Debug for TemplateGroup {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TemplateGroup")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("members", &self.members)
			.finish_non_exhaustive()
	}
}

/// Renders the argument shape shared by every member of a group.
pub(crate) fn notation(name: &str, arguments: &[Argument]) -> String {
	let args: Vec<String> = arguments
		.iter()
		.map(|arg| format!("{} {}", arg.direction.notation(), arg.name))
		.collect();
	format!("{name}({})", args.join(","))
}

/// True if `arguments` has the same count, names and directions as `shape`.
pub(crate) fn same_shape(shape: &[Argument], arguments: &[Argument]) -> bool {
	shape.len() == arguments.len()
		&& shape
			.iter()
			.zip(arguments)
			.all(|(a, b)| a.name == b.name && a.direction == b.direction && a.is_variadic() == b.is_variadic())
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Selection {
	Found(FunctionIndex),
	NoMatch,
	Ambiguous(Vec<FunctionIndex>),
}

/// Picks the member that fits `runtime`.
pub(crate) fn select<'a>(
	candidates: impl IntoIterator<Item = (FunctionIndex, &'a [TypeId])>,
	runtime: &[TypeId],
	types: &dyn TypeIndex,
	subtype_overloads: bool,
) -> Selection {
	let mut best: Vec<(FunctionIndex, &'a [TypeId])> = Vec::new();
	let mut best_score = 0usize;

	for (index, declared) in candidates {
		let Some(score) = score(declared, runtime, types, subtype_overloads) else {
			continue;
		};
		if best.is_empty() || score > best_score {
			best.clear();
			best_score = score;
			best.push((index, declared));
		} else if score == best_score {
			best.push((index, declared));
		}
	}

	best.sort_by_key(|(index, _)| *index);
	let Some(&(winner, winner_types)) = best.first() else {
		return Selection::NoMatch;
	};
	let twins: Vec<FunctionIndex> = best
		.iter()
		.filter(|(_, declared)| *declared == winner_types)
		.map(|(index, _)| *index)
		.collect();
	if twins.len() > 1 {
		return Selection::Ambiguous(twins);
	}
	Selection::Found(winner)
}

/// Number of exactly matching positions, or `None` if some position does not fit.
fn score(declared: &[TypeId], runtime: &[TypeId], types: &dyn TypeIndex, subtype_overloads: bool) -> Option<usize> {
	if declared.len() != runtime.len() {
		return None;
	}
	let mut exact = 0;
	for (&want, &have) in declared.iter().zip(runtime) {
		if want == have {
			exact += 1;
		} else if !(subtype_overloads && types.is_subtype(have, want)) {
			return None;
		}
	}
	Some(exact)
}
