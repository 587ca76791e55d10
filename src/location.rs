//! Location-expression evaluation (spec.md §4.5) and struct member-offset
//! decoding (spec.md §4.6).
//!
//! Two operator families are recognized, matching the two ways bdwgc's
//! original DWARF reader (`examples/original_source/dwarf_reader.c`) saw
//! variables located: relative to the frame base, or relative to a saved
//! register. Any other operator is logged and the containing expression
//! is skipped — this crate does not implement a general DWARF expression
//! evaluator (spec.md §1 Non-goals).

use crate::dbg::{RawLocEntry, RawLocOp};
use crate::error::{Result, ScanError};
use crate::frame::Frame;
use crate::regmap::RegisterMap;
use smallvec::SmallVec;

/// `DW_OP_fbreg`: address = frame base + signed offset.
pub const OP_FBREG: u16 = 0x91;
/// `DW_OP_breg0`: first of a contiguous run of 32 "register + offset"
/// opcodes, one per DWARF register number.
pub const OP_BREG0: u16 = 0x70;
/// Last opcode in the `DW_OP_bregN` run.
pub const OP_BREG31: u16 = 0x8f;
/// `DW_OP_plus_uconst`: the only form accepted for a struct member's
/// `data_member_location` when it is expressed as a location list
/// (spec.md §4.6).
pub const OP_PLUS_UCONST: u16 = 0x23;

/// A decoded location operator — one of the two forms spec.md §4.5
/// recognizes, or a third bucket for anything else (skipped, never
/// evaluated).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operator {
  /// `address = frame.sp + offset`.
  FrameBaseOffset { offset: i64 },
  /// `address = frame.register_read(register) + offset`, where
  /// `register` is the DWARF register number (`opcode - OP_BREG0`).
  RegisterPlusOffset { register: u16, offset: i64 },
  /// Recognized as *some* operator but not one of the two forms above.
  Unsupported,
}

impl Operator {
  fn decode(op: RawLocOp) -> Self {
    if op.opcode == OP_FBREG {
      Operator::FrameBaseOffset { offset: op.operand }
    } else if (OP_BREG0..=OP_BREG31).contains(&op.opcode) {
      Operator::RegisterPlusOffset { register: op.opcode - OP_BREG0, offset: op.operand }
    } else {
      Operator::Unsupported
    }
  }
}

/// One location expression: a validity range (`[0, 0)` meaning "any pc")
/// and its first, governing operator. Spec.md §4.5 only ever evaluates an
/// expression's first operator, so that is all this type retains after
/// decoding a [`RawLocEntry`] — the remaining raw ops are not needed
/// downstream and are not copied, keeping the arena-owned copy cheap.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LocationExpr {
  pub lo_pc: u64,
  pub hi_pc: u64,
  pub op: Operator,
}

impl LocationExpr {
  /// `true` if this expression is valid at every PC (both bounds zero).
  #[must_use] pub fn always_valid(&self) -> bool { self.lo_pc == 0 && self.hi_pc == 0 }

  /// `true` if `pc` falls within this expression's validity range.
  #[must_use] pub fn covers(&self, pc: u64) -> bool {
    self.always_valid() || (self.lo_pc <= pc && pc < self.hi_pc)
  }
}

/// Deep-copy a decoder-owned location list into arena-owned
/// [`LocationExpr`]s. The external decoder may invalidate its buffers
/// once the compilation unit is closed (spec.md design notes), so this
/// copy must happen during ingestion, not lazily at scan time.
pub fn copy_location_list(raw: &[RawLocEntry]) -> SmallVec<[LocationExpr; 1]> {
  raw
    .iter()
    .map(|entry| LocationExpr {
      lo_pc: entry.lo_pc,
      hi_pc: entry.hi_pc,
      op: entry.ops.first().map_or(Operator::Unsupported, |&op| Operator::decode(op)),
    })
    .collect()
}

/// Evaluate a variable's location list against one frame, per spec.md
/// §4.5: "The evaluator selects the first expression whose validity range
/// contains the frame's PC and evaluates its first operator." Returns
/// `None` (no error) if no expression covers `pc`, or if the covering
/// expression's operator is not one of the two recognized forms — both
/// are expected, silently-recovered outcomes (spec.md §7).
pub fn evaluate(
  exprs: &[LocationExpr],
  pc: u64,
  frame: &impl Frame,
  regs: &impl RegisterMap,
) -> Option<u64> {
  let expr = exprs.iter().find(|e| e.covers(pc))?;
  match expr.op {
    Operator::FrameBaseOffset { offset } => Some(frame.sp().wrapping_add_signed(offset)),
    Operator::RegisterPlusOffset { register, offset } => {
      let unwind_reg = regs.map(register)?;
      let value = frame.register(unwind_reg)?;
      Some(value.wrapping_add_signed(offset))
    }
    Operator::Unsupported => {
      log::trace!("skipping location expression with unsupported operator");
      None
    }
  }
}

/// Decode a struct member's `data_member_location` when it was given as a
/// location-expression list (spec.md §4.6): "the only accepted form is a
/// single expression containing a single `plus_uconst` operator."
pub fn decode_plus_uconst_offset(offset: u64, raw: &[RawLocEntry]) -> Result<u32> {
  let [entry] = raw else {
    return Err(ScanError::UnsupportedLocationForm { offset });
  };
  let [op] = entry.ops.as_slice() else {
    return Err(ScanError::UnsupportedLocationForm { offset });
  };
  if op.opcode != OP_PLUS_UCONST || op.operand < 0 {
    return Err(ScanError::UnsupportedLocationForm { offset });
  }
  u32::try_from(op.operand).map_err(|_| ScanError::UnsupportedLocationForm { offset })
}
