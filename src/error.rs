//! Errors surfaced while building a [`Context`](crate::context::Context).
//!
//! Per spec.md §7, only ingest-time problems ("invalid input",
//! "unsupported construct", "structural integrity") are represented here
//! and abort the build. Scan-time misses (a frame PC with no owning
//! function, a variable with no PC-covering location expression) are
//! expected and recovered locally — they never reach this type.

use crate::dbg::{AttrKind, Tag};

/// Everything that can go wrong while ingesting debug information into a
/// [`Context`](crate::context::Context).
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
  /// A required attribute was absent on the entry at `offset`.
  #[error("entry at offset {offset:#x}: missing required attribute {attr:?}")]
  MissingAttribute {
    /// Debug-info offset of the offending entry.
    offset: u64,
    /// The attribute that was expected.
    attr: AttrKind,
  },

  /// A ranges-list attribute used a sub-range kind other than a plain
  /// `[addr, addr)` pair or end-of-list (e.g. base-address selection).
  #[error("entry at offset {offset:#x}: unsupported ranges-list sub-range kind")]
  UnsupportedRanges {
    /// Debug-info offset of the scope whose ranges attribute was rejected.
    offset: u64,
  },

  /// A struct member's `data_member_location` decoded to a negative
  /// offset.
  #[error("entry at offset {offset:#x}: struct member has a negative byte offset")]
  NegativeMemberOffset {
    /// Debug-info offset of the offending member entry.
    offset: u64,
  },

  /// A struct member's `data_member_location` was a location-expression
  /// list that was not a single `plus_uconst` operation.
  #[error("entry at offset {offset:#x}: unsupported member-offset location expression")]
  UnsupportedLocationForm {
    /// Debug-info offset of the offending member entry.
    offset: u64,
  },

  /// An array type's subrange child had no upper-bound attribute.
  #[error("entry at offset {offset:#x}: array subrange has no upper bound")]
  MissingUpperBound {
    /// Debug-info offset of the subrange entry.
    offset: u64,
  },

  /// A top-level compilation-unit child had a tag this ingester does not
  /// know how to classify.
  #[error("entry at offset {offset:#x}: unknown top-level tag {tag:?}")]
  UnknownTag {
    /// Debug-info offset of the offending entry.
    offset: u64,
    /// The unrecognized tag.
    tag: Tag,
  },

  /// Two functions' `[lo_pc, hi_pc)` ranges overlapped; spec.md invariant
  /// I2 requires at most one function per PC.
  #[error("function PC ranges overlap: [{a_lo:#x}, {a_hi:#x}) and [{b_lo:#x}, {b_hi:#x})")]
  OverlappingFunctions {
    /// Lower bound of the first function's range.
    a_lo: u64,
    /// Upper bound of the first function's range.
    a_hi: u64,
    /// Lower bound of the second function's range.
    b_lo: u64,
    /// Upper bound of the second function's range.
    b_hi: u64,
  },
}

/// Convenience alias used throughout the ingestion pipeline.
pub type Result<T> = std::result::Result<T, ScanError>;
