//! Dense identifiers for registry tables.

macro_rules! dense_id {
	($(#[$attr:meta])* $name:ident) => {
		$(#[$attr])*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub struct $name(pub u32);

		impl $name {
			/// Returns the underlying u32 value.
			#[inline]
			pub fn as_u32(self) -> u32 {
				self.0
			}

			#[inline]
			pub(crate) fn as_usize(self) -> usize {
				self.0 as usize
			}

			pub(crate) fn from_len(len: usize) -> Self {
				Self(u32::try_from(len).unwrap_or_else(|_| panic!("{} overflow: {}", stringify!($name), len)))
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}({})", stringify!($name), self.0)
			}
		}
	};
}

dense_id!(
	/// Position of a function descriptor in the registry table.
	FunctionIndex
);
dense_id!(
	/// Template group identifier.
	TemplateId
);
dense_id!(
	/// Dispatch factory identifier.
	FactoryId
);
dense_id!(
	/// Owning structural type identifier.
	StructId
);
