//! The trait boundary to the external debug-information decoder.
//!
//! Spec.md §1 declares the raw decoder out of scope: "treated as an opaque
//! tree source yielding entries with tag kind, attributes, and
//! parent/child/sibling navigation." This module is that contract. A host
//! wires a real DWARF library (or, in tests, an in-memory fixture) up to
//! these traits; nothing downstream of [`ingest`](crate::ingest) depends
//! on any particular decoder crate.

use smallvec::SmallVec;

/// The categorical kind of a debug-info entry (glossary: "Tag").
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Tag {
  CompileUnit,
  Subprogram,
  LexicalBlock,
  FormalParameter,
  Variable,
  StructureType,
  UnionType,
  PointerType,
  ArrayType,
  SubrangeType,
  Member,
  BaseType,
  EnumerationType,
  Typedef,
  ConstType,
  /// Any tag this ingester has no classification for.
  Other(u16),
}

impl Tag {
  /// True for the "record as base/opaque type" tag class (spec.md §4.2).
  #[must_use] pub fn is_base_opaque(self) -> bool {
    matches!(self, Tag::BaseType | Tag::EnumerationType | Tag::Typedef | Tag::ConstType)
  }
}

/// The kind of an attribute fetch (glossary: attribute).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AttrKind {
  Name,
  Type,
  LowPc,
  HighPc,
  Ranges,
  Location,
  UpperBound,
  Count,
  DataMemberLocation,
  ByteSize,
}

/// A single raw operator/operand pair inside a location expression, as
/// emitted by the external decoder after it has decoded whatever
/// variable-length encoding (ULEB/SLEB/fixed-width) the wire format uses.
/// Interpreting *which* operator families are meaningful is this crate's
/// job (spec.md §4.5), not the decoder's.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawLocOp {
  /// The raw opcode byte/word as the decoder saw it.
  pub opcode: u16,
  /// The (sign-extended, already-decoded) operand, when the operator
  /// takes one.
  pub operand: i64,
}

/// One entry of a location-list attribute: an operator sequence valid
/// over `[lo_pc, hi_pc)`, or unconditionally valid when both are zero.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RawLocEntry {
  pub lo_pc: u64,
  pub hi_pc: u64,
  pub ops: SmallVec<[RawLocOp; 2]>,
}

/// One entry of a DWARF-style ranges list, spec.md §4.4's "supported
/// sub-range kinds": a plain address pair, or the end-of-list marker.
/// Anything else (base-address selection, etc.) is surfaced to the
/// caller so it can raise [`ScanError::UnsupportedRanges`](crate::error::ScanError::UnsupportedRanges).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawRange {
  AddressPair { lo: u64, hi: u64 },
  EndOfList,
  Unsupported,
}

/// The value of a fetched attribute, already decoded from the wire
/// format (ULEB, fixed-width, block forms, ...) by the external decoder.
#[derive(Clone, PartialEq, Debug)]
pub enum AttrValue {
  /// A value of DWARF form class "address" — an absolute address, as
  /// `DW_FORM_addr` encodes `low_pc` and (in DWARF2/3-style images)
  /// `high_pc`. Distinct from [`Unsigned`](AttrValue::Unsigned) because
  /// `high_pc` is the one attribute whose *meaning* (absolute vs.
  /// offset-from-`low_pc`) depends on which of these two forms the
  /// producer chose (spec.md §4.4) — magnitude alone cannot tell them
  /// apart.
  Address(u64),
  /// A value of DWARF form class "constant" — e.g. `DW_FORM_dataN`. Used
  /// for plain unsigned quantities (array upper bounds, member byte
  /// offsets) and, for `high_pc` specifically, an offset to add to
  /// `low_pc` (the DWARF4+ convention).
  Unsigned(u64),
  Signed(i64),
  /// A cross-reference to another entry, identified by its debug-info
  /// offset (see [`TypeRef::Offset`](crate::types::TypeRef::Offset)).
  Reference(u64),
  String(Box<str>),
  LocationList(Vec<RawLocEntry>),
  RangesList(Vec<RawRange>),
  Flag(bool),
}

impl AttrValue {
  #[must_use] pub fn as_u64(&self) -> Option<u64> {
    match *self {
      AttrValue::Address(n) | AttrValue::Unsigned(n) => Some(n),
      AttrValue::Signed(n) if n >= 0 => Some(n as u64),
      _ => None,
    }
  }

  #[must_use] pub fn as_i64(&self) -> Option<i64> {
    match *self {
      AttrValue::Signed(n) => Some(n),
      AttrValue::Unsigned(n) => i64::try_from(n).ok(),
      _ => None,
    }
  }

  #[must_use] pub fn as_reference(&self) -> Option<u64> {
    match *self {
      AttrValue::Reference(off) => Some(off),
      _ => None,
    }
  }

  #[must_use] pub fn as_str(&self) -> Option<&str> {
    match self {
      AttrValue::String(s) => Some(s),
      _ => None,
    }
  }

  #[must_use] pub fn as_location_list(&self) -> Option<&[RawLocEntry]> {
    match self {
      AttrValue::LocationList(v) => Some(v),
      _ => None,
    }
  }

  #[must_use] pub fn as_ranges_list(&self) -> Option<&[RawRange]> {
    match self {
      AttrValue::RangesList(v) => Some(v),
      _ => None,
    }
  }
}

/// One debug-info entry: a tag plus attributes plus navigable children.
///
/// Implementations own whatever backing storage the real decoder uses;
/// this crate never holds on to entries past the ingestion of the
/// compilation unit they came from (spec.md design notes: "the core must
/// copy each expression's operand buffer into arena-owned memory").
pub trait Entry: Clone {
  /// This entry's byte offset in the debug-info section — the identity
  /// used for forward/backward cross-references before finalization.
  fn offset(&self) -> u64;

  /// This entry's tag.
  fn tag(&self) -> Tag;

  /// Direct children, in source sibling order.
  fn children(&self) -> Vec<Self>;

  /// Fetch an attribute by kind, if present on this entry.
  fn attr(&self, kind: AttrKind) -> Option<AttrValue>;
}

/// The external debug-info source: compilation-unit iteration plus
/// offset-to-entry lookup (used when a cross-reference is followed
/// eagerly at read time, e.g. the pointer-type chase in §4.3).
pub trait DebugSource {
  type Entry: Entry;

  /// All compilation units in this image, in source order.
  fn compilation_units(&self) -> Vec<Self::Entry>;

  /// Resolve a debug-info offset to the entry at that position, if any.
  fn entry_at_offset(&self, offset: u64) -> Option<Self::Entry>;
}
