//! The typed type graph (spec.md §3): pointer, struct, union, and array
//! types, resolved through indices so cycles (a struct pointing back to
//! itself through a pointer member) need no special casing.

use crate::idx::{mk_idx, IdxVec};

mk_idx! {
  /// A dense index into [`Context::types`](crate::context::Context::types).
  ///
  /// [`TypeId::BASE`] is the reserved sentinel denoting "any non-pointer-
  /// bearing type that may still appear as a pointee" — a base type,
  /// enum, typedef, or const that was never materialized into the table.
  pub struct TypeId(u32);
}

impl TypeId {
  /// The reserved sentinel for a base/opaque, non-composite type.
  pub const BASE: TypeId = TypeId(u32::MAX);

  /// True if this is the base/opaque sentinel rather than a real table
  /// entry.
  #[must_use] pub fn is_base(self) -> bool { self.0 == u32::MAX }
}

/// An unresolved or resolved cross-reference to a type.
///
/// Before [`finalize`](crate::finalize::finalize) runs, every `TypeRef`
/// produced by the readers is an [`Offset`](TypeRef::Offset) — the
/// debug-info byte offset of the referenced entry, exactly as it appeared
/// in the source attribute. After finalization every reachable `TypeRef`
/// is [`Resolved`](TypeRef::Resolved). Spec.md invariant I1 is "exactly
/// one representation is valid at any point"; this crate does not encode
/// that as a separate type per phase (the readers and the finalizer both
/// need to share `Type`/`Variable`/etc.), so [`TypeRef::as_id`] asserts
/// it instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TypeRef {
  /// A debug-info byte offset not yet compressed to an index. An offset
  /// of `0` means "no target" (e.g. a struct member attribute that was
  /// never populated) and is left untouched by the finalizer.
  Offset(u64),
  /// A finalized, dense index.
  Resolved(TypeId),
}

impl TypeRef {
  /// `true` for the "no target" placeholder offset.
  #[must_use] pub fn is_none(self) -> bool { matches!(self, TypeRef::Offset(0)) }

  /// The resolved [`TypeId`]. Panics if this reference has not been
  /// through [`finalize`](crate::finalize::finalize) — that would be a
  /// bug in the ingester/finalizer, not a recoverable runtime condition.
  #[must_use] pub fn as_id(self) -> TypeId {
    match self {
      TypeRef::Resolved(id) => id,
      TypeRef::Offset(off) => panic!("TypeRef::as_id on an unresolved offset {off:#x}"),
    }
  }
}

/// One member of a [`Type::Struct`]. Non-pointer members are never
/// represented — spec.md §4.3: "their only purpose would be sizing, which
/// is not needed for root scanning."
#[derive(Clone, Copy, Debug)]
pub struct StructMember {
  /// Byte offset of this member from the struct's base address.
  pub byte_offset: u32,
  /// The member's (pointer) type.
  pub ty: TypeRef,
}

/// A type retained in the graph because it is, or transitively contains,
/// a pointer.
///
/// Each variant carries an optional debug name, present whenever the
/// entry's decoder exposed one: a debug build always retains it, and the
/// `names` cargo feature keeps it in release builds too for hosts that
/// want readable diagnostics — the same gating `Function`/`Variable` use
/// (spec.md `SPEC_FULL.md` §3).
#[derive(Clone, Debug)]
pub enum Type {
  /// `layers_of_indirection` levels of `*` before reaching `target`
  /// (e.g. `void**` is 2 layers). When `untyped` is true there is no
  /// terminal pointee type (a `void*`) and `target` is meaningless.
  Pointer {
    layers_of_indirection: u16,
    target: TypeRef,
    untyped: bool,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: Option<Box<str>>,
  },
  /// A struct, reduced to only its pointer-typed members.
  Struct {
    members: Vec<StructMember>,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: Option<Box<str>>,
  },
  /// A union, reduced to only its pointer-typed alternatives.
  Union {
    alternatives: Vec<TypeRef>,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: Option<Box<str>>,
  },
  /// A fixed-size array. `count` is the upper-bound index plus one
  /// (spec.md §3), i.e. the element count.
  Array {
    element: TypeRef,
    count: u32,
    #[cfg(any(debug_assertions, feature = "names"))]
    name: Option<Box<str>>,
  },
}

impl Type {
  /// Visit every [`TypeRef`] owned by this type, in a stable order. Used
  /// by the finalizer's reference-compression pass and by invariant
  /// checks.
  pub fn refs(&self) -> Vec<TypeRef> {
    match self {
      Type::Pointer { target, untyped, .. } => {
        if *untyped { Vec::new() } else { vec![*target] }
      }
      Type::Struct { members, .. } => members.iter().map(|m| m.ty).collect(),
      Type::Union { alternatives, .. } => alternatives.clone(),
      Type::Array { element, .. } => vec![*element],
    }
  }

  /// Visit every [`TypeRef`] owned by this type mutably, for the
  /// finalizer's in-place offset-to-index rewrite.
  pub fn refs_mut(&mut self) -> Vec<&mut TypeRef> {
    match self {
      Type::Pointer { target, untyped, .. } => {
        if *untyped { Vec::new() } else { vec![target] }
      }
      Type::Struct { members, .. } => members.iter_mut().map(|m| &mut m.ty).collect(),
      Type::Union { alternatives, .. } => alternatives.iter_mut().collect(),
      Type::Array { element, .. } => vec![element],
    }
  }

}

/// The table of all retained types, indexed by [`TypeId`].
pub type TypeTable = IdxVec<TypeId, Type>;

/// A single emitted live root (spec.md §3): a runtime address holding a
/// live pointer, tagged with its static type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Root {
  /// The location in the mutator's address space holding the pointer.
  pub address: u64,
  /// The pointer's static type. Always a [`Type::Pointer`] entry —
  /// never [`TypeId::BASE`] — per spec.md §8's testable property that
  /// `types[type_id]` is a pointer type for every emitted root.
  pub ty: TypeId,
}
