//! The context finalizer (spec component E, spec.md §4.7): compresses
//! every offset-form `TypeRef` reachable from the graph into a dense
//! index, then sorts functions by `(lo_pc, hi_pc)` so the resolver can
//! binary-search them.

use crate::context::Context;
use crate::error::{Result, ScanError};
use crate::func::{Function, Scope};
use crate::ingest::Ingested;
use crate::types::{TypeId, TypeRef};
use hashbrown::HashMap;

fn resolve_ref(r: &mut TypeRef, offset_to_type: &HashMap<u64, TypeId>) {
  let TypeRef::Offset(off) = *r else { return };
  if off == 0 {
    // "No target": spec.md §4.7 — left untouched.
    return;
  }
  let id = offset_to_type.get(&off).copied().unwrap_or_else(|| {
    log::warn!("type reference to offset {off:#x} did not match any tabled composite type; using base sentinel");
    TypeId::BASE
  });
  *r = TypeRef::Resolved(id);
}

fn resolve_scope(scope: &mut Scope, offset_to_type: &HashMap<u64, TypeId>) {
  for var in &mut scope.variables {
    resolve_ref(&mut var.ty, offset_to_type);
  }
  for child in &mut scope.children {
    resolve_scope(child, offset_to_type);
  }
}

fn check_no_overlap(functions: &[Function]) -> Result<()> {
  for pair in functions.windows(2) {
    let [a, b] = pair else { unreachable!() };
    if a.hi_pc() > b.lo_pc() {
      return Err(ScanError::OverlappingFunctions { a_lo: a.lo_pc(), a_hi: a.hi_pc(), b_lo: b.lo_pc(), b_hi: b.hi_pc() });
    }
  }
  Ok(())
}

/// Run both finalization passes over freshly ingested tables, producing
/// an immutable [`Context`]. Pass 1 (index assignment) is implicit: every
/// [`Type`](crate::types::Type) was already appended to a dense
/// [`IdxVec`](crate::idx::IdxVec) during ingestion, so its [`TypeId`] is
/// simply its position.
pub fn finalize(ingested: Ingested) -> Result<Context> {
  let Ingested { mut types, mut functions, offset_to_type, stats } = ingested;

  // Pass 2: reference compression.
  for ty in types.iter_mut() {
    for r in ty.refs_mut() {
      resolve_ref(r, &offset_to_type);
    }
  }
  for func in functions.iter_mut() {
    resolve_scope(&mut func.top_scope, &offset_to_type);
  }

  // Pass 3: function sort, using the full element count (spec.md §9's
  // resolution of the off-by-one Open Question).
  functions.sort_by(|a, b| (a.lo_pc(), a.hi_pc()).cmp(&(b.lo_pc(), b.hi_pc())));
  let functions = functions.into_vec();
  check_no_overlap(&functions)?;

  log::debug!("finalize complete: {} types, {} functions", types.len(), functions.len());
  Ok(Context::new(types, functions, stats))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::context::Context;
  use crate::func::Scope;
  use crate::ingest::IngestStats;
  use crate::idx::IdxVec;
  use crate::types::{Type, TypeTable};

  fn func_with_range(lo: u64, hi: u64) -> Function {
    Function {
      top_scope: Scope { lo_pc: lo, hi_pc: hi, variables: Vec::new(), children: Vec::new() },
      #[cfg(any(debug_assertions, feature = "names"))]
      name: None,
    }
  }

  #[test]
  fn overlapping_functions_is_an_error() {
    let types: TypeTable = IdxVec::new();
    let mut functions: IdxVec<crate::func::FuncId, Function> = IdxVec::new();
    functions.push(func_with_range(0x1000, 0x1100));
    functions.push(func_with_range(0x1050, 0x1200));
    let ingested = Ingested { types, functions, offset_to_type: HashMap::new(), stats: IngestStats::default() };
    assert!(matches!(finalize(ingested), Err(ScanError::OverlappingFunctions { .. })));
  }

  #[test]
  fn untabled_offset_resolves_to_base_sentinel() {
    let mut types: TypeTable = IdxVec::new();
    types.push(Type::Pointer {
      layers_of_indirection: 1,
      target: TypeRef::Offset(0xdead),
      untyped: false,
      #[cfg(any(debug_assertions, feature = "names"))]
      name: None,
    });
    let functions: IdxVec<crate::func::FuncId, Function> = IdxVec::new();
    let ingested = Ingested { types, functions, offset_to_type: HashMap::new(), stats: IngestStats::default() };
    let ctx: Context = finalize(ingested).unwrap();
    match &ctx.types()[TypeId::from_raw(0)] {
      Type::Pointer { target, .. } => assert_eq!(target.as_id(), TypeId::BASE),
      _ => panic!("expected pointer"),
    }
  }
}
