//! The root resolver (spec component G, spec.md §4.8): for each frame,
//! find its owning function, descend the scope tree against the frame's
//! PC, and evaluate every in-scope variable's location to emit a
//! [`Root`].

use crate::context::Context;
use crate::frame::Frame;
use crate::func::Scope;
use crate::location::evaluate;
use crate::regmap::RegisterMap;
use crate::types::Root;

fn walk_scope(scope: &Scope, pc: u64, frame: &impl Frame, regs: &impl RegisterMap, out: &mut Vec<Root>) {
  // Children before own variables: spec.md §4.8 step 3 describes this as
  // a post-order choice, noting "any total order is acceptable."
  for child in &scope.children {
    if child.contains(pc) {
      walk_scope(child, pc, frame, regs, out);
    }
  }
  for var in &scope.variables {
    if let Some(address) = evaluate(&var.location, pc, frame, regs) {
      out.push(Root { address, ty: var.ty.as_id() });
    } else {
      log::trace!("variable at pc {pc:#x} has no location valid here; skipping");
    }
  }
}

/// Resolve every live root reachable from `call_stack` against
/// `context`. Frames whose PC matches no function are skipped (spec.md
/// §4.8 step 1; an expected, silent outcome for foreign frames).
pub fn resolve<F: Frame>(frames: &[F], context: &Context, regs: &impl RegisterMap) -> Vec<Root> {
  let mut out = Vec::new();
  for frame in frames {
    let pc = frame.pc();
    match context.function_for_pc(pc) {
      Some(function) => {
        log::trace!("frame pc {pc:#x} resolved to a known function");
        walk_scope(&function.top_scope, pc, frame, regs, &mut out);
      }
      None => log::trace!("frame pc {pc:#x} matched no function; skipping (foreign frame)"),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dbg::{AttrKind, AttrValue, RawLocEntry, RawLocOp, Tag};
  use crate::location::OP_FBREG;
  use crate::regmap::X86_REGISTER_MAP;
  use crate::testutil::{FakeDebugSource, FakeEntry, FakeFrame};

  fn loc(offset: i64) -> AttrValue {
    AttrValue::LocationList(vec![RawLocEntry {
      lo_pc: 0,
      hi_pc: 0,
      ops: smallvec::smallvec![RawLocOp { opcode: OP_FBREG, operand: offset }],
    }])
  }

  #[test]
  fn single_stack_pointer_variable_emits_one_root() {
    let mut src = FakeDebugSource::new();
    let void_ptr = FakeEntry::new(0x10, Tag::PointerType);
    let var = FakeEntry::new(0x20, Tag::Variable).with_type(void_ptr.clone()).with_attr(AttrKind::Location, loc(-8));
    let func = FakeEntry::new(0x30, Tag::Subprogram)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1000))
      .with_attr(AttrKind::HighPc, AttrValue::Address(0x1010))
      .with_children(vec![var]);
    // void_ptr must be a direct CU child (like func) so ingest tables it —
    // a variable's type offset only resolves to a real TypeId if the
    // pointee was itself discovered during top-level traversal or hoisting.
    let cu = FakeEntry::new(0, Tag::CompileUnit).with_children(vec![func, void_ptr]);
    src.add_cu(cu);

    let ctx = Context::build(&src).unwrap();
    let frame = FakeFrame { pc: 0x1004, sp: 0x7000, regs: Default::default() };
    let roots = resolve(&[frame], &ctx, &X86_REGISTER_MAP);

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].address, 0x7000u64.wrapping_sub(8));
    match &ctx.types()[roots[0].ty] {
      crate::types::Type::Pointer { untyped, .. } => assert!(*untyped),
      _ => panic!("expected pointer"),
    }
  }

  /// Scenario 2 (spec.md §8): a linked-list node `{int x; void* next;}`
  /// reached through a pointer held in a register, not on the stack.
  #[test]
  fn register_held_pointer_to_struct_emits_one_root() {
    let mut src = FakeDebugSource::new();
    // void_ptr, node, and node_ptr are all direct CU children (alongside
    // func) so ingest tables each of them — a struct member's or
    // variable's type offset only resolves to a real TypeId if the
    // pointee was itself discovered during top-level traversal or hoisting.
    let void_ptr = FakeEntry::new(0x10, Tag::PointerType);
    let next_member = FakeEntry::new(0x28, Tag::Member).with_type(void_ptr.clone()).with_attr(AttrKind::DataMemberLocation, AttrValue::Unsigned(8));
    let x_member = FakeEntry::new(0x24, Tag::Member).with_attr(AttrKind::DataMemberLocation, AttrValue::Unsigned(0));
    let node = FakeEntry::new(0x20, Tag::StructureType).with_children(vec![x_member, next_member]);
    let node_ptr = FakeEntry::new(0x30, Tag::PointerType).with_type(node.clone());

    let head = FakeEntry::new(0x40, Tag::Variable).with_type(node_ptr.clone()).with_attr(
      AttrKind::Location,
      AttrValue::LocationList(vec![RawLocEntry {
        lo_pc: 0,
        hi_pc: 0,
        ops: smallvec::smallvec![RawLocOp { opcode: crate::location::OP_BREG0 + 3, operand: 0 }],
      }]),
    );
    let func = FakeEntry::new(0x50, Tag::Subprogram)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1000))
      .with_attr(AttrKind::HighPc, AttrValue::Address(0x1010))
      .with_children(vec![head]);
    let cu = FakeEntry::new(0, Tag::CompileUnit).with_children(vec![func, void_ptr, node, node_ptr]);
    src.add_cu(cu);

    let ctx = Context::build(&src).unwrap();
    let mut regs = hashbrown::HashMap::new();
    regs.insert(3u16, 0x5000_0000u64);
    let frame = FakeFrame { pc: 0x1004, sp: 0, regs };
    let roots = resolve(&[frame], &ctx, &X86_REGISTER_MAP);

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].address, 0x5000_0000);
    match &ctx.types()[roots[0].ty] {
      crate::types::Type::Pointer { target, untyped, layers_of_indirection, .. } => {
        assert!(!untyped);
        assert_eq!(*layers_of_indirection, 1);
        match &ctx.types()[target.as_id()] {
          crate::types::Type::Struct { members, .. } => {
            assert_eq!(members.len(), 1);
            assert_eq!(members[0].byte_offset, 8);
          }
          _ => panic!("expected struct"),
        }
      }
      _ => panic!("expected pointer"),
    }
  }

  #[test]
  fn foreign_frame_is_skipped_deeper_frames_still_resolve() {
    let mut src = FakeDebugSource::new();
    let void_ptr = FakeEntry::new(0x10, Tag::PointerType);
    let var = FakeEntry::new(0x20, Tag::Variable).with_type(void_ptr.clone()).with_attr(AttrKind::Location, loc(-8));
    let func = FakeEntry::new(0x30, Tag::Subprogram)
      .with_attr(AttrKind::LowPc, AttrValue::Unsigned(0x1000))
      .with_attr(AttrKind::HighPc, AttrValue::Address(0x1010))
      .with_children(vec![var]);
    let cu = FakeEntry::new(0, Tag::CompileUnit).with_children(vec![func, void_ptr]);
    src.add_cu(cu);
    let ctx = Context::build(&src).unwrap();

    let innermost_foreign = FakeFrame { pc: 0x9000_0000, sp: 0x6000, regs: Default::default() };
    let managed = FakeFrame { pc: 0x1008, sp: 0x7000, regs: Default::default() };
    let roots = resolve(&[innermost_foreign, managed], &ctx, &X86_REGISTER_MAP);

    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].address, 0x7000u64.wrapping_sub(8));
  }
}
