//! The debug-info ingester (spec component B, spec.md §4.2): walks
//! compilation units, dispatches each top-level entry to a type or
//! function reader, and hands the accumulated tables to
//! [`finalize`](crate::finalize::finalize).

use crate::dbg::{AttrKind, DebugSource, Entry, Tag};
use crate::error::{Result, ScanError};
use crate::func::{FuncId, Function};
use crate::func_reader::read_function;
use crate::idx::IdxVec;
use crate::type_reader::{read_array, read_pointer, read_struct, read_union};
use crate::types::{Type, TypeId, TypeTable};
use hashbrown::HashMap;

/// Everything [`finalize`](crate::finalize::finalize) needs: the raw
/// (offset-keyed) tables plus an offset→id index built during ingestion,
/// which spec.md §4.7 explicitly allows as a substitute for the linear
/// search it otherwise describes.
pub struct Ingested {
  pub types: TypeTable,
  pub functions: IdxVec<FuncId, Function>,
  pub offset_to_type: HashMap<u64, TypeId>,
  pub stats: IngestStats,
}

/// Build-time counters, purely for logging/telemetry (ambient, §4 of
/// `SPEC_FULL.md`); not used by any scanning logic.
#[derive(Default, Debug, Clone, Copy)]
pub struct IngestStats {
  pub compilation_units: u32,
  pub functions: u32,
  pub pointer_types: u32,
  pub struct_types: u32,
  pub union_types: u32,
  pub array_types: u32,
  pub base_opaque: u32,
  pub hoisted_types: u32,
}

#[cfg(any(debug_assertions, feature = "names"))]
pub(crate) fn extract_name<E: Entry>(entry: &E) -> Option<Box<str>> {
  entry.attr(AttrKind::Name).and_then(|a| a.as_str().map(Into::into))
}

fn push_type(types: &mut TypeTable, offset_to_type: &mut HashMap<u64, TypeId>, offset: u64, ty: Type) {
  let id = types.push(ty);
  offset_to_type.insert(offset, id);
}

/// Ingest every compilation unit `source` exposes into a flat,
/// not-yet-finalized set of tables (spec.md §4.2's `ingest(source) →
/// Context` algorithm, minus the finalization step).
pub fn ingest<D: DebugSource>(source: &D) -> Result<Ingested> {
  let mut types = TypeTable::new();
  let mut functions: IdxVec<FuncId, Function> = IdxVec::new();
  let mut offset_to_type = HashMap::new();
  let mut stats = IngestStats::default();

  for cu in source.compilation_units() {
    stats.compilation_units += 1;
    log::debug!("ingesting compilation unit at offset {:#x}", cu.offset());
    for entry in cu.children() {
      log::trace!("dispatching entry {:#x} tag={:?}", entry.offset(), entry.tag());
      match entry.tag() {
        Tag::Subprogram => {
          let (function, hoisted) = read_function(source, &entry)?;
          functions.push(function);
          stats.functions += 1;
          for h in hoisted {
            push_type(&mut types, &mut offset_to_type, h.offset, h.ty);
            stats.hoisted_types += 1;
          }
        }
        Tag::StructureType => {
          let ty = read_struct(source, &entry)?;
          push_type(&mut types, &mut offset_to_type, entry.offset(), ty);
          stats.struct_types += 1;
        }
        Tag::UnionType => {
          let ty = read_union(source, &entry)?;
          push_type(&mut types, &mut offset_to_type, entry.offset(), ty);
          stats.union_types += 1;
        }
        Tag::PointerType => {
          let ty = read_pointer(source, &entry)?;
          push_type(&mut types, &mut offset_to_type, entry.offset(), ty);
          stats.pointer_types += 1;
        }
        Tag::ArrayType => {
          let ty = read_array(source, &entry)?;
          push_type(&mut types, &mut offset_to_type, entry.offset(), ty);
          stats.array_types += 1;
        }
        tag if tag.is_base_opaque() => {
          stats.base_opaque += 1;
        }
        Tag::Variable => {
          // Top-level (global) variables: spec.md §4.2 "Ignored (future: globals)".
        }
        Tag::CompileUnit => {
          // Should not occur as a CU child; defensively treat as unknown below.
          return Err(ScanError::UnknownTag { offset: entry.offset(), tag: entry.tag() });
        }
        _ => return Err(ScanError::UnknownTag { offset: entry.offset(), tag: entry.tag() }),
      }
    }
  }

  log::debug!(
    "ingest complete: {} CUs, {} functions, {} types ({} hoisted, {} base/opaque skipped)",
    stats.compilation_units, stats.functions, types.len(), stats.hoisted_types, stats.base_opaque
  );
  Ok(Ingested { types, functions, offset_to_type, stats })
}
