//! # The Oracle: arity mismatch detection
//!
//! Diffs the canonical and observed registries by name. Only names present in
//! both are compared, and only `param_count` is compared: parameter types
//! are never checked.

use common::{CanonicalSignature, Mismatch, ObservedSignature, Registry};

pub struct ArityOracle;

impl ArityOracle {
    /// Returns every same-named pair whose arities differ.
    ///
    /// # Algorithm
    /// 1. Walk the observed registry (name-ordered).
    /// 2. Skip names with no canonical declaration.
    /// 3. Emit a [`Mismatch`] when `param_count` differs.
    ///
    /// The result is sorted by name, independent of file visitation order.
    pub fn find_mismatches(
        canonical: &Registry<CanonicalSignature>,
        observed: &Registry<ObservedSignature>,
    ) -> Vec<Mismatch> {
        // Registry iteration is name-ordered, so the output is too.
        observed
            .iter()
            .filter_map(|def| {
                let decl = canonical.get(&def.name)?;
                Mismatch::between(decl, def)
            })
            .collect()
    }
}
