//! The function/scope/variable shapes built by [`func_reader`] and walked
//! by [`resolve`] (spec.md §3's `Variable`, `Scope`, `Function`).

use crate::idx::mk_idx;
use crate::location::LocationExpr;
use crate::types::TypeRef;
use smallvec::SmallVec;

mk_idx! {
  /// A dense index into [`Context::functions`](crate::context::Context::functions).
  pub struct FuncId(u32);
}

/// A pointer-typed local or parameter. Non-pointer variables are dropped
/// during reading (spec.md §4.4) and never appear here.
#[derive(Clone, Debug)]
pub struct Variable {
  /// Candidate location expressions; [`location::evaluate`](crate::location::evaluate)
  /// picks the one whose validity range covers the current PC.
  pub location: SmallVec<[LocationExpr; 1]>,
  /// The variable's static (pointer) type.
  pub ty: TypeRef,
  /// Present in debug builds, or in release builds with the `names`
  /// feature; purely diagnostic.
  #[cfg(any(debug_assertions, feature = "names"))]
  pub name: Option<Box<str>>,
}

/// One lexical scope: a PC range, the pointer variables declared directly
/// in it, and nested scopes. Spec.md invariant I3: child ranges are
/// disjoint and contained in `[lo_pc, hi_pc)`.
#[derive(Clone, Debug, Default)]
pub struct Scope {
  pub lo_pc: u64,
  pub hi_pc: u64,
  pub variables: Vec<Variable>,
  pub children: Vec<Scope>,
}

impl Scope {
  /// `true` if `pc` falls within `[lo_pc, hi_pc)`.
  #[must_use] pub fn contains(&self, pc: u64) -> bool {
    self.lo_pc <= pc && pc < self.hi_pc
  }
}

/// One subprogram: its top-level scope (spanning the whole function body)
/// plus an optional debug name.
#[derive(Clone, Debug)]
pub struct Function {
  pub top_scope: Scope,
  #[cfg(any(debug_assertions, feature = "names"))]
  pub name: Option<Box<str>>,
}

impl Function {
  /// Convenience accessor mirroring spec.md §3's `[lo_pc, hi_pc)`.
  #[must_use] pub fn lo_pc(&self) -> u64 { self.top_scope.lo_pc }
  #[must_use] pub fn hi_pc(&self) -> u64 { self.top_scope.hi_pc }
}
