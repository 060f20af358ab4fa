//! Domain logic for the character sheet service.
//!
//! Everything in this crate is pure: the nested sheet types, the flat
//! join-row type, the row reassembler that folds join output back into
//! nested sheets, and the reconciler that diffs a submitted sheet against
//! the persisted id sets. No I/O happens here; the `charbook-db` crate
//! feeds rows in and applies diffs out.

pub mod error;
pub mod reassembly;
pub mod reconcile;
pub mod sheet;
pub mod types;
