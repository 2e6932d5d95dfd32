//! Operation-kind enumeration used for statistics tracking.

use std::fmt;

/// The kinds of store operations the stats registry tracks.
///
/// Canonical string names (`as_str`) match the wire-level names a JMX or
/// metrics bridge would expose: `get`, `getAll`, `put`, `delete`,
/// `deleteall`, `exception`, `obsolete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Single-key read.
    Get,
    /// Batch read.
    GetAll,
    /// Write.
    Put,
    /// Single-key or version-scoped delete.
    Delete,
    /// Bulk delete (map-driven or expression-driven).
    DeleteAll,
    /// Any error surfaced by the wrapped store.
    Exception,
    /// An obsolete-version put rejection specifically.
    Obsolete,
}

impl OperationKind {
    /// All operation kinds, in enumeration order. Used by the stats
    /// registry to pre-populate one counter per kind.
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Get,
        OperationKind::GetAll,
        OperationKind::Put,
        OperationKind::Delete,
        OperationKind::DeleteAll,
        OperationKind::Exception,
        OperationKind::Obsolete,
    ];

    /// Canonical string name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Get => "get",
            OperationKind::GetAll => "getAll",
            OperationKind::Put => "put",
            OperationKind::Delete => "delete",
            OperationKind::DeleteAll => "deleteall",
            OperationKind::Exception => "exception",
            OperationKind::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
