//! Entity — the contract every record handled by a generic service satisfies.
//!
//! Concrete entities keep their non-key fields as `Option` so the same type can
//! serve as a full record, a partial *probe* for example-based queries, and a
//! *selective* write where only `Some` fields reach the store.

use std::fmt;

/// A persisted record type with a primary key.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Primary-key type.
    type Id: Clone + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Primary key, if the record has been assigned one.
    fn id(&self) -> Option<&Self::Id>;
}

/// Render a list of keys as `[a, b, c]` for log fields.
pub struct DisplayIds<'a, I>(pub &'a [I]);

impl<I: fmt::Display> fmt::Display for DisplayIds<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (idx, id) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            id.fmt(f)?;
        }
        f.write_str("]")
    }
}
