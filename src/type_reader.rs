//! Per-kind type readers (spec component C, spec.md §4.3): struct, union,
//! pointer, and array. Grounded on `examples/original_source/dwarf_reader.c`
//! (`dwarf_read_struct`, `dwarf_read_pointer`, `dwarf_read_array`, the
//! union-alternatives walk), reimplemented against the [`Entry`]/
//! [`DebugSource`] trait boundary instead of `libdwarf`.

use crate::dbg::{AttrKind, DebugSource, Entry, Tag};
use crate::error::{Result, ScanError};
use crate::location::decode_plus_uconst_offset;
use crate::types::{StructMember, Type, TypeRef};

/// Follow `DW_AT_type`-equivalent references through typedefs and
/// const-qualifiers until reaching a non-transparent entry.
///
/// Used to decide pointer-ness of struct members and variables (spec.md
/// §4.3/§4.4); deliberately *not* used by [`read_pointer`]'s own chase,
/// per the Open Question resolution in spec.md §9 and `DESIGN.md`.
pub fn strip_transparent<D: DebugSource>(src: &D, start_offset: u64) -> Option<D::Entry> {
  let mut entry = src.entry_at_offset(start_offset)?;
  loop {
    if matches!(entry.tag(), Tag::Typedef | Tag::ConstType) {
      let next = entry.attr(AttrKind::Type)?.as_reference()?;
      entry = src.entry_at_offset(next)?;
    } else {
      return Some(entry);
    }
  }
}

fn member_byte_offset<E: Entry>(member: &E) -> Result<u32> {
  let offset = member.offset();
  let Some(attr) = member.attr(AttrKind::DataMemberLocation) else {
    return Err(ScanError::MissingAttribute { offset, attr: AttrKind::DataMemberLocation });
  };
  if let Some(u) = attr.as_u64() {
    return u32::try_from(u).map_err(|_| ScanError::NegativeMemberOffset { offset });
  }
  if let Some(list) = attr.as_location_list() {
    return decode_plus_uconst_offset(offset, list);
  }
  Err(ScanError::UnsupportedLocationForm { offset })
}

/// Read a struct entry: only pointer-typed members (after transparent
/// stripping) survive. Member order is preserved.
pub fn read_struct<D: DebugSource>(src: &D, entry: &D::Entry) -> Result<Type> {
  let mut members = Vec::new();
  for child in entry.children() {
    if !matches!(child.tag(), Tag::Member) { continue }
    let Some(type_off) = child.attr(AttrKind::Type).and_then(|a| a.as_reference()) else { continue };
    let Some(stripped) = strip_transparent(src, type_off) else { continue };
    if !matches!(stripped.tag(), Tag::PointerType) { continue }
    let byte_offset = member_byte_offset(&child)?;
    members.push(StructMember { byte_offset, ty: TypeRef::Offset(stripped.offset()) });
  }
  Ok(Type::Struct {
    members,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: crate::ingest::extract_name(entry),
  })
}

/// Read a union entry: only pointer-typed alternatives survive. A union
/// with zero pointer alternatives is still a valid (empty) type.
pub fn read_union<D: DebugSource>(src: &D, entry: &D::Entry) -> Result<Type> {
  let mut alternatives = Vec::new();
  for child in entry.children() {
    if !matches!(child.tag(), Tag::Member) { continue }
    let Some(type_off) = child.attr(AttrKind::Type).and_then(|a| a.as_reference()) else { continue };
    let Some(stripped) = strip_transparent(src, type_off) else { continue };
    if !matches!(stripped.tag(), Tag::PointerType) { continue }
    alternatives.push(TypeRef::Offset(stripped.offset()));
  }
  Ok(Type::Union {
    alternatives,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: crate::ingest::extract_name(entry),
  })
}

/// Read an array entry: the element's `TypeRef` comes straight from the
/// entry's own type attribute (no pointer filtering — arrays are always
/// retained, the same as the original's `ArrayInfo`), and the count comes
/// from the single `subrange` child's upper bound.
pub fn read_array<D: DebugSource>(_src: &D, entry: &D::Entry) -> Result<Type> {
  let offset = entry.offset();
  let element = entry.attr(AttrKind::Type).and_then(|a| a.as_reference()).unwrap_or(0);
  let subrange = entry
    .children()
    .into_iter()
    .find(|c| matches!(c.tag(), Tag::SubrangeType))
    .ok_or(ScanError::MissingUpperBound { offset })?;
  let upper_bound = subrange
    .attr(AttrKind::UpperBound)
    .and_then(|a| a.as_u64())
    .ok_or(ScanError::MissingAttribute { offset: subrange.offset(), attr: AttrKind::UpperBound })?;
  let count = u32::try_from(upper_bound + 1).map_err(|_| ScanError::MissingUpperBound { offset: subrange.offset() })?;
  Ok(Type::Array {
    element: TypeRef::Offset(element),
    count,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: crate::ingest::extract_name(entry),
  })
}

/// Read a pointer entry, chasing through further pointer entries (for
/// `void**`-style multi-indirection) without stripping typedef/const
/// along the way (spec.md §9 Open Question resolution).
pub fn read_pointer<D: DebugSource>(src: &D, entry: &D::Entry) -> Result<Type> {
  let mut layers: u16 = 1;
  let mut current = entry.clone();
  loop {
    let Some(type_attr) = current.attr(AttrKind::Type) else {
      return Ok(Type::Pointer {
        layers_of_indirection: layers,
        target: TypeRef::Offset(0),
        untyped: true,
        #[cfg(any(debug_assertions, feature = "names"))]
        name: crate::ingest::extract_name(entry),
      });
    };
    let Some(next_offset) = type_attr.as_reference() else {
      return Ok(Type::Pointer {
        layers_of_indirection: layers,
        target: TypeRef::Offset(0),
        untyped: true,
        #[cfg(any(debug_assertions, feature = "names"))]
        name: crate::ingest::extract_name(entry),
      });
    };
    let Some(next) = src.entry_at_offset(next_offset) else {
      return Ok(Type::Pointer {
        layers_of_indirection: layers,
        target: TypeRef::Offset(next_offset),
        untyped: false,
        #[cfg(any(debug_assertions, feature = "names"))]
        name: crate::ingest::extract_name(entry),
      });
    };
    if matches!(next.tag(), Tag::PointerType) {
      layers += 1;
      current = next;
      continue;
    }
    return Ok(Type::Pointer {
      layers_of_indirection: layers,
      target: TypeRef::Offset(next.offset()),
      untyped: false,
      #[cfg(any(debug_assertions, feature = "names"))]
      name: crate::ingest::extract_name(entry),
    });
  }
}
