//! Database record types.
//!
//! The nested domain types live in `charbook-core`; this module holds the
//! flat [`sheet_row::SheetRowRecord`] that `FromRow`-maps the join query
//! and converts into the core row type with an explicit field list.

pub mod sheet_row;
