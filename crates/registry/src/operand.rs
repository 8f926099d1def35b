//! Operand-to-argument mapping.
//!
//! Positional for fixed arguments. A trailing variadic argument absorbs every
//! operand from its own position onwards.

use crate::argument::Argument;
use crate::error::ResolveError;

/// Returns the declared argument that operand `operand_index` of a
/// `total_operands`-slot call stands for.
pub fn argument_for_operand<'a>(
	function: &str,
	arguments: &'a [Argument],
	operand_index: usize,
	total_operands: usize,
) -> Result<&'a Argument, ResolveError> {
	let out_of_range = || ResolveError::OperandIndexOutOfRange {
		function: function.to_string(),
		operand_index,
		total_operands,
		declared: arguments.len(),
	};

	if operand_index >= total_operands {
		return Err(out_of_range());
	}
	if let Some(last) = arguments.last()
		&& last.is_variadic()
		&& operand_index >= arguments.len() - 1
	{
		return Ok(last);
	}
	arguments.get(operand_index).ok_or_else(out_of_range)
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	fn variadic_args() -> Vec<Argument> {
		vec![Argument::new("a", "T1"), Argument::new("items", "T2*")]
	}

	#[test]
	fn variadic_tail_absorbs_trailing_operands() {
		let args = variadic_args();
		let names: Vec<&str> = (0..4)
			.map(|i| argument_for_operand("Gather", &args, i, 4).unwrap().name())
			.collect();
		assert_eq!(names, ["a", "items", "items", "items"]);
	}

	#[test]
	fn index_equal_to_total_is_out_of_range() {
		let args = variadic_args();
		assert_eq!(
			argument_for_operand("Gather", &args, 4, 4).unwrap_err(),
			ResolveError::OperandIndexOutOfRange {
				function: "Gather".into(),
				operand_index: 4,
				total_operands: 4,
				declared: 2,
			}
		);
	}

	#[test]
	fn fixed_arguments_map_positionally() {
		let args = vec![Argument::new("a", "Int"), Argument::new("b", "Int"), Argument::output("Result", "Int")];
		assert_eq!(argument_for_operand("Add", &args, 2, 3).unwrap().name(), "Result");
		assert!(argument_for_operand("Add", &args, 3, 4).is_err(), "no argument declared past the end");
	}

	proptest! {
		/// Every in-range operand of a variadic call maps to some argument, and the
		/// mapping is positional before the tail.
		#[test]
		fn prop_variadic_mapping(total in 1usize..32, fixed in 0usize..4) {
			let mut args: Vec<Argument> = (0..fixed).map(|i| Argument::new(format!("p{i}"), "Int")).collect();
			args.push(Argument::new("rest", "Int*"));
			for operand in 0..total {
				let arg = argument_for_operand("F", &args, operand, total).unwrap();
				if operand < fixed {
					prop_assert_eq!(arg.name(), format!("p{operand}"));
				} else {
					prop_assert_eq!(arg.name(), "rest");
				}
			}
			prop_assert!(argument_for_operand("F", &args, total, total).is_err());
		}
	}
}
