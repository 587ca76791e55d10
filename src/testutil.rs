//! In-memory `DebugSource`/`Entry`/`Frame` fixtures used only by this
//! crate's own tests (spec.md `SPEC_FULL.md` §4.12: tests should stay
//! hermetic rather than parsing a real DWARF image, the same way
//! `mmcc`'s own tests build small in-memory ASTs instead of real MM0
//! source files).

use crate::dbg::{AttrKind, AttrValue, DebugSource, Entry, Tag};
use crate::frame::Frame;
use hashbrown::HashMap;
use std::cell::RefCell;
use std::rc::Rc;

struct FakeEntryData {
  offset: u64,
  tag: Tag,
  attrs: RefCell<HashMap<AttrKind, AttrValue>>,
  children: RefCell<Vec<FakeEntry>>,
}

/// A hand-built debug-info entry for tests.
#[derive(Clone)]
pub struct FakeEntry(Rc<FakeEntryData>);

impl FakeEntry {
  #[must_use] pub fn new(offset: u64, tag: Tag) -> Self {
    Self(Rc::new(FakeEntryData { offset, tag, attrs: RefCell::new(HashMap::new()), children: RefCell::new(Vec::new()) }))
  }

  #[must_use] pub fn with_attr(self, kind: AttrKind, value: AttrValue) -> Self {
    self.0.attrs.borrow_mut().insert(kind, value);
    self
  }

  #[must_use] pub fn with_children(self, children: Vec<FakeEntry>) -> Self {
    *self.0.children.borrow_mut() = children;
    self
  }

  /// Convenience for `with_attr(AttrKind::Type, AttrValue::Reference(target.offset()))`.
  #[must_use] pub fn with_type(self, target: FakeEntry) -> Self {
    self.with_attr(AttrKind::Type, AttrValue::Reference(target.offset()))
  }
}

impl Entry for FakeEntry {
  fn offset(&self) -> u64 { self.0.offset }
  fn tag(&self) -> Tag { self.0.tag }
  fn children(&self) -> Vec<Self> { self.0.children.borrow().clone() }
  fn attr(&self, kind: AttrKind) -> Option<AttrValue> { self.0.attrs.borrow().get(&kind).cloned() }
}

/// An in-memory debug source: a list of compilation units plus a flat
/// offset→entry registry populated as entries are added.
#[derive(Default)]
pub struct FakeDebugSource {
  cus: Vec<FakeEntry>,
  registry: HashMap<u64, FakeEntry>,
}

impl FakeDebugSource {
  #[must_use] pub fn new() -> Self { Self::default() }

  fn register(&mut self, entry: &FakeEntry) {
    self.registry.insert(entry.offset(), entry.clone());
    for child in entry.children() {
      self.register(&child);
    }
  }

  /// Register a standalone entry (typically a type) so later
  /// cross-references can resolve it, and return it for chaining.
  pub fn add(&mut self, entry: FakeEntry) -> FakeEntry {
    self.register(&entry);
    entry
  }

  /// Register a compilation unit (and everything nested in it) and add
  /// it to the CU list [`DebugSource::compilation_units`] will return.
  pub fn add_cu(&mut self, cu: FakeEntry) {
    self.register(&cu);
    self.cus.push(cu);
  }
}

impl DebugSource for FakeDebugSource {
  type Entry = FakeEntry;
  fn compilation_units(&self) -> Vec<FakeEntry> { self.cus.clone() }
  fn entry_at_offset(&self, offset: u64) -> Option<FakeEntry> { self.registry.get(&offset).cloned() }
}

/// A hand-built call-stack frame for tests.
pub struct FakeFrame {
  pub pc: u64,
  pub sp: u64,
  pub regs: HashMap<u16, u64>,
}

impl Frame for FakeFrame {
  fn pc(&self) -> u64 { self.pc }
  fn sp(&self) -> u64 { self.sp }
  fn register(&self, unwind_reg: u16) -> Option<u64> { self.regs.get(&unwind_reg).copied() }
}
