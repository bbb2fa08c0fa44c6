//! Domain model for notes and their todo items.
//!
//! # Responsibility
//! - Define the plain value types shared by the collection store and editor
//!   sessions.
//! - Keep the JSON wire shape stable for local persistence.
//!
//! # Invariants
//! - Every note and todo is identified by an id that never changes.
//! - Snapshots are independent copies (`Clone`) compared structurally
//!   (`PartialEq`).

pub mod note;
