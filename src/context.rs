//! The immutable, finalized [`Context`] (spec.md §3/§5): the single
//! artifact an ingester produces and a resolver consumes. Its fields are
//! private and there is no public mutator once built — spec.md §5's "must
//! be enforced structurally (e.g., moving into a read-only wrapper)
//! rather than by convention" requirement, satisfied by ordinary
//! visibility rather than any runtime check.

use crate::dbg::DebugSource;
use crate::error::Result;
use crate::finalize::finalize;
use crate::func::Function;
use crate::ingest::{ingest, IngestStats};
use crate::types::TypeTable;

/// A finalized view of one program's debug information: every retained
/// pointer-bearing type and every function's scope tree, ready for
/// [`resolve`](crate::resolve::resolve).
pub struct Context {
  types: TypeTable,
  functions: Vec<Function>,
  stats: IngestStats,
}

impl Context {
  pub(crate) fn new(types: TypeTable, functions: Vec<Function>, stats: IngestStats) -> Self {
    Self { types, functions, stats }
  }

  /// Ingest `source` and finalize it in one step — the only way to
  /// obtain a [`Context`] from outside this crate.
  pub fn build<D: DebugSource>(source: &D) -> Result<Self> {
    finalize(ingest(source)?)
  }

  /// The type table, indexable by [`TypeId`](crate::types::TypeId).
  #[must_use] pub fn types(&self) -> &TypeTable { &self.types }

  /// All functions, sorted by `(lo_pc, hi_pc)` (spec.md invariant I2).
  #[must_use] pub fn functions(&self) -> &[Function] { &self.functions }

  /// Build-time counters (compilation units seen, functions/types read,
  /// etc.), purely for logging — never consulted by scanning logic.
  #[must_use] pub fn stats(&self) -> IngestStats { self.stats }

  /// Binary search for the unique function whose `[lo_pc, hi_pc)`
  /// contains `pc`, per spec.md §4.8 step 1. `None` means the frame
  /// belongs to unmanaged code (a foreign library, the runtime itself).
  #[must_use] pub fn function_for_pc(&self, pc: u64) -> Option<&Function> {
    let idx = self
      .functions
      .binary_search_by(|f| {
        if pc < f.lo_pc() {
          std::cmp::Ordering::Greater
        } else if pc >= f.hi_pc() {
          std::cmp::Ordering::Less
        } else {
          std::cmp::Ordering::Equal
        }
      })
      .ok()?;
    Some(&self.functions[idx])
  }
}
