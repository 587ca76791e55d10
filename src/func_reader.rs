//! The function/scope reader (spec component D, spec.md §4.4): builds a
//! per-function lexical-scope tree of pointer-typed variables.

use crate::dbg::{AttrKind, AttrValue, DebugSource, Entry, RawRange, Tag};
use crate::error::{Result, ScanError};
use crate::func::{Function, Scope, Variable};
use crate::location::copy_location_list;
use crate::type_reader::{read_array, read_pointer, read_struct, read_union, strip_transparent};
use crate::types::{Type, TypeRef};

/// A type entry discovered while walking a function's lexical scopes,
/// hoisted into the global type table by [`ingest`](crate::ingest::ingest)
/// once reading the function completes. Spec.md §4.2: "top-level types
/// defined inside a function are hoisted into the global type table;
/// their offset is globally unique."
pub struct HoistedType {
  pub offset: u64,
  pub ty: Type,
}

/// Resolve a scope's `[lo_pc, hi_pc)`, either from direct `low_pc`/
/// `high_pc` attributes or by evaluating a `ranges` attribute against the
/// enclosing scope's base address (spec.md §4.4).
fn scope_pc_range<E: Entry>(entry: &E, parent_base: u64) -> Result<(u64, u64)> {
  let offset = entry.offset();
  if let Some(lo) = entry.attr(AttrKind::LowPc).and_then(|a| a.as_u64()) {
    let hi_attr = entry.attr(AttrKind::HighPc).ok_or(ScanError::MissingAttribute { offset, attr: AttrKind::HighPc })?;
    let hi = match hi_attr {
      // Address-form high_pc is already absolute. Constant-form is an
      // unsigned offset from low_pc (the DWARF4+ convention). The
      // producer's attribute form decides which, never the value's
      // magnitude (spec.md §4.4) — a function loaded at a small address
      // with a body longer than that address is a real, valid case where
      // a magnitude-based guess would misclassify an offset as absolute.
      AttrValue::Address(hi) => hi,
      AttrValue::Unsigned(n) => lo + n,
      _ => return Err(ScanError::MissingAttribute { offset, attr: AttrKind::HighPc }),
    };
    return Ok((lo, hi));
  }

  if let Some(ranges) = entry.attr(AttrKind::Ranges).and_then(|a| match a {
    AttrValue::RangesList(r) => Some(r),
    _ => None,
  }) {
    let mut lo = u64::MAX;
    let mut hi = 0u64;
    let mut any = false;
    for r in ranges {
      match r {
        RawRange::AddressPair { lo: l, hi: h } => {
          let (l, h) = (l + parent_base, h + parent_base);
          lo = lo.min(l);
          hi = hi.max(h);
          any = true;
        }
        RawRange::EndOfList => break,
        RawRange::Unsupported => return Err(ScanError::UnsupportedRanges { offset }),
      }
    }
    if any {
      return Ok((lo, hi));
    }
  }

  Err(ScanError::MissingAttribute { offset, attr: AttrKind::LowPc })
}

/// `true` if, after stripping typedef/const, the attribute-referenced
/// type is a pointer (spec.md §9 Open Question: strip during variable
/// reading, not during the pointer chase).
fn is_pointer_type<D: DebugSource>(src: &D, type_offset: u64) -> Option<D::Entry> {
  let stripped = strip_transparent(src, type_offset)?;
  matches!(stripped.tag(), Tag::PointerType).then_some(stripped)
}

fn read_variable<D: DebugSource>(src: &D, entry: &D::Entry) -> Option<Variable> {
  if_chain::if_chain! {
    if let Some(type_off) = entry.attr(AttrKind::Type).and_then(|a| a.as_reference());
    if let Some(stripped) = is_pointer_type(src, type_off);
    if let Some(AttrValue::LocationList(raw)) = entry.attr(AttrKind::Location);
    then {
      Some(Variable {
        location: copy_location_list(&raw),
        ty: TypeRef::Offset(stripped.offset()),
        #[cfg(any(debug_assertions, feature = "names"))]
        name: crate::ingest::extract_name(entry),
      })
    } else {
      None
    }
  }
}

/// Recursively build a [`Scope`] from `entry`, whose `[lo_pc, hi_pc)` has
/// already been resolved by the caller (the top scope uses the
/// subprogram's own range; nested lexical blocks resolve their own via
/// [`scope_pc_range`]). Any type DIE found nested in the body is read and
/// appended to `hoisted` rather than discarded.
fn read_scope_body<D: DebugSource>(
  src: &D,
  entry: &D::Entry,
  lo_pc: u64,
  hi_pc: u64,
  hoisted: &mut Vec<HoistedType>,
) -> Result<Scope> {
  let mut scope = Scope { lo_pc, hi_pc, variables: Vec::new(), children: Vec::new() };
  for child in entry.children() {
    match child.tag() {
      Tag::FormalParameter | Tag::Variable => {
        if let Some(v) = read_variable(src, &child) {
          scope.variables.push(v);
        }
      }
      Tag::LexicalBlock => {
        let (lo, hi) = scope_pc_range(&child, lo_pc)?;
        scope.children.push(read_scope_body(src, &child, lo, hi, hoisted)?);
      }
      Tag::StructureType => hoisted.push(HoistedType { offset: child.offset(), ty: read_struct(src, &child)? }),
      Tag::UnionType => hoisted.push(HoistedType { offset: child.offset(), ty: read_union(src, &child)? }),
      Tag::PointerType => hoisted.push(HoistedType { offset: child.offset(), ty: read_pointer(src, &child)? }),
      Tag::ArrayType => hoisted.push(HoistedType { offset: child.offset(), ty: read_array(src, &child)? }),
      _ => {}
    }
  }
  Ok(scope)
}

/// Read one `subprogram` entry into a [`Function`] with a fully built
/// scope tree (spec component D's full contract), plus any type DIEs
/// nested in its body for the caller to hoist into the global table.
pub fn read_function<D: DebugSource>(src: &D, entry: &D::Entry) -> Result<(Function, Vec<HoistedType>)> {
  let (lo, hi) = scope_pc_range(entry, 0)?;
  let mut hoisted = Vec::new();
  let top_scope = read_scope_body(src, entry, lo, hi, &mut hoisted)?;
  let function = Function {
    top_scope,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: crate::ingest::extract_name(entry),
  };
  Ok((function, hoisted))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dbg::{RawLocEntry, RawLocOp};
  use crate::location::OP_FBREG;
  use crate::testutil::{FakeDebugSource, FakeEntry};

  fn loc(offset: i64) -> AttrValue {
    AttrValue::LocationList(vec![RawLocEntry {
      lo_pc: 0,
      hi_pc: 0,
      ops: smallvec::smallvec![RawLocOp { opcode: OP_FBREG, operand: offset }],
    }])
  }

  #[test]
  fn nested_block_variable_only_visible_in_its_own_range() {
    let mut src = FakeDebugSource::new();
    let ptr_ty = src.add(FakeEntry::new(0x10, Tag::PointerType));

    let a = FakeEntry::new(0x50, Tag::Variable).with_type(ptr_ty).with_attr(AttrKind::Location, loc(-8));
    let b = FakeEntry::new(0x54, Tag::Variable).with_type(ptr_ty).with_attr(AttrKind::Location, loc(-16));
    let inner = FakeEntry::new(0x60, Tag::LexicalBlock)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1010))
      .with_attr(AttrKind::HighPc, AttrValue::Address(0x1020))
      .with_children(vec![b]);
    let func = FakeEntry::new(0x70, Tag::Subprogram)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1000))
      .with_attr(AttrKind::HighPc, AttrValue::Address(0x1030))
      .with_children(vec![a, inner]);

    let (f, hoisted) = read_function(&src, &func).unwrap();
    assert!(hoisted.is_empty());
    assert_eq!(f.top_scope.variables.len(), 1);
    assert_eq!(f.top_scope.children.len(), 1);
    assert!(f.top_scope.contains(0x1005));
    assert!(f.top_scope.children[0].contains(0x1015));
    assert!(!f.top_scope.children[0].contains(0x1005));
  }

  /// A genuinely offset-form high_pc whose value is >= low_pc — e.g. a
  /// function loaded at a small address whose body is longer than that
  /// address, realistic for an early-loaded/PIE text segment. Must still
  /// be read as `lo + offset`, not misread as an already-absolute value
  /// just because it happens to be >= `lo`.
  #[test]
  fn offset_form_high_pc_at_or_above_low_pc_is_still_an_offset() {
    let src = FakeDebugSource::new();
    let func = FakeEntry::new(0x70, Tag::Subprogram)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1000))
      .with_attr(AttrKind::HighPc, AttrValue::Unsigned(0x2000))
      .with_children(vec![]);

    let (f, hoisted) = read_function(&src, &func).unwrap();
    assert!(hoisted.is_empty());
    assert_eq!(f.top_scope.lo_pc, 0x1000);
    assert_eq!(f.top_scope.hi_pc, 0x3000);
  }
}
