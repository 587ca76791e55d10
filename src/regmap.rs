//! The fixed DWARF register number → unwinder register number mapping
//! (spec.md §6): "covering the x86 general-purpose, instruction-pointer,
//! flags, trap-number, and x87 stack."
//!
//! The algorithm in [`location`](crate::location) is architecture-
//! independent; only this table is x86-specific. A host targeting another
//! architecture builds an equivalent [`RegisterMap`] and passes it to
//! [`resolve`](crate::resolve::resolve) instead of [`X86_REGISTER_MAP`].

/// Maps a DWARF register number (the operand implied by a
/// `DW_OP_breg<N>` opcode, see [`location`](crate::location)) to the
/// register number the external unwinder expects in
/// [`Frame::register`](crate::frame::Frame::register).
pub trait RegisterMap {
  /// Translate a DWARF register number to an unwinder register number,
  /// or `None` if this architecture has no equivalent register.
  fn map(&self, dwarf_reg: u16) -> Option<u16>;
}

/// The first 19 DWARF register numbers for x86, mapped to themselves —
/// the unwinder interface in this crate already speaks DWARF register
/// numbers directly, so the "mapping" is the identity restricted to the
/// declared domain. A host whose unwinder uses a different numbering
/// supplies its own table with the same shape.
pub struct X86RegisterMap;

/// `eax, ecx, edx, ebx, esp, ebp, esi, edi, eip, eflags, trapno,
/// st0..st7` — the 19 registers spec.md §6 declares support for.
pub const X86_REGISTER_COUNT: u16 = 19;

impl RegisterMap for X86RegisterMap {
  fn map(&self, dwarf_reg: u16) -> Option<u16> {
    if dwarf_reg < X86_REGISTER_COUNT { Some(dwarf_reg) } else { None }
  }
}

/// The default table used when a caller does not supply its own.
pub const X86_REGISTER_MAP: X86RegisterMap = X86RegisterMap;
