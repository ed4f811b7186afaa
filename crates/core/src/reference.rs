//! A reference to a related entity that may or may not have been loaded.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// Anything with a display name.
pub trait Named {
    fn display_name(&self) -> &str;
}

/// A related entity carried either as its raw id or as the loaded record.
///
/// Serialized untagged: a bare number for [`Reference::Id`], the full object
/// for [`Reference::Populated`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(DbId),
    Populated(T),
}

impl<T> Reference<T> {
    /// Wrap `record` if it was found, otherwise fall back to the id.
    pub fn resolve(id: DbId, record: Option<T>) -> Self {
        match record {
            Some(r) => Self::Populated(r),
            None => Self::Id(id),
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated(_))
    }

    pub fn as_populated(&self) -> Option<&T> {
        match self {
            Self::Populated(r) => Some(r),
            Self::Id(_) => None,
        }
    }
}

impl<T: Named> Reference<T> {
    /// Name to show for this reference; `#<id>` when only the id is known.
    pub fn display_name(&self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Populated(r) => r.display_name().to_string(),
        }
    }
}
