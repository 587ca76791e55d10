//! A precise stack root scanner for natively compiled programs.
//!
//! Given debug information describing a program's types and functions,
//! and a snapshot of one thread's call stack, this crate computes the
//! set of pointer-typed live variables currently reachable from the
//! stack, each tagged with its static type. That set is the foundation
//! of a precise (non-conservative) garbage collector or leak analyzer
//! for a language compiled to native code.
//!
//! The crate is organized around three pipelines:
//!
//! - **Build time**: an external debug-info decoder ([`dbg::DebugSource`])
//!   is [`ingest`]ed into raw tables, then [`finalize`]d into an
//!   immutable [`context::Context`].
//! - **Scan time**: an external unwinder ([`frame::Unwinder`]) produces a
//!   [`frame::CallStack`] snapshot, which [`resolve::resolve`] walks
//!   against a `Context` to emit [`types::Root`]s.
//! - Everything in between — the type graph, the location-expression
//!   evaluator, the register mapping table — is internal plumbing shared
//!   by both.
//!
//! This crate does not decode DWARF (or any other debug format) itself,
//! unwind stacks itself, or trace/mark/sweep a heap. Those are the host's
//! job; see [`dbg`] and [`frame`] for the seams a host implements.

pub mod context;
pub mod dbg;
pub mod error;
pub mod finalize;
pub mod frame;
pub mod func;
mod func_reader;
pub mod idx;
mod ingest;
pub mod location;
pub mod regmap;
mod resolve;
#[cfg(test)]
mod testutil;
mod type_reader;
pub mod types;

pub use context::Context;
pub use error::{Result, ScanError};
pub use frame::{CallStack, Frame, Unwinder};
pub use ingest::{ingest, IngestStats, Ingested};
pub use resolve::resolve;
pub use types::{Root, Type, TypeId, TypeRef};
