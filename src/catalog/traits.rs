use crate::error::{CatalogError, Result};

/// Core trait shared by every closed catalog enum
///
/// Catalog entries are fixed at compile time; selection is always by identity,
/// either by value or by looking up the stable string id.
pub trait CatalogEntry: Copy + Eq + Sized + 'static {
    /// Human-readable kind, used in lookup errors ("film stock", "paper", ...)
    const KIND: &'static str;

    /// All entries in catalog order
    fn all() -> &'static [Self];

    /// Stable identifier, e.g. `"ilford-bw"`
    fn id(&self) -> &'static str;

    /// Display name, e.g. `"Ilford HP5"`
    fn name(&self) -> &'static str;

    /// Look up an entry by its id
    fn from_id(id: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|entry| entry.id() == id)
            .ok_or_else(|| CatalogError::UnknownEntry { kind: Self::KIND, id: id.to_string() }.into())
    }

    /// Entry at the given catalog position
    fn at(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    /// Position of this entry in the catalog
    fn index(&self) -> usize {
        Self::all()
            .iter()
            .position(|entry| entry == self)
            .unwrap_or(0)
    }
}

/// Implements `FromStr` through [`CatalogEntry::from_id`]
macro_rules! impl_from_str {
    ($ty:ty) => {
        impl std::str::FromStr for $ty {
            type Err = crate::error::MemoirError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                <$ty as crate::catalog::CatalogEntry>::from_id(s)
            }
        }
    };
}

pub(crate) use impl_from_str;
