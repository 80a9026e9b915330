//! Turn rotation between the two configured symbols.

use crate::Symbol;
use tracing::instrument;

/// Returns the symbol that moves after `current`.
///
/// Anything that is not `first` hands the turn back to `first`, so a
/// stale symbol left over from a settings change restarts rotation with
/// player one.
#[instrument]
pub fn next_turn<'a>(current: &Symbol, first: &'a Symbol, second: &'a Symbol) -> &'a Symbol {
    if current == first { second } else { first }
}
