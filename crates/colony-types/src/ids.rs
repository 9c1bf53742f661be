//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity the host reports carries a strongly-typed ID so that a worker
//! ID can never be looked up in the structure table by accident. Cached
//! targets hold these IDs as weak references: they are resolved against the
//! current [`WorldSnapshot`] every tick and never assumed alive.
//!
//! [`WorldSnapshot`]: crate::structs::WorldSnapshot

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a worker owned by the colony.
    AgentId
}

define_id! {
    /// Unique identifier for a built structure (spawn, extension, tower, ...).
    StructureId
}

define_id! {
    /// Unique identifier for a pending construction site.
    SiteId
}

define_id! {
    /// Unique identifier for an energy source (resource node).
    SourceId
}

define_id! {
    /// Unique identifier for a visible hostile entity.
    HostileId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let agent = AgentId::new();
        let structure = StructureId::new();
        // Different types -- the compiler enforces no mixing.
        assert_ne!(agent.into_inner(), Uuid::nil());
        assert_ne!(structure.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrips_through_uuid() {
        let raw = Uuid::now_v7();
        let id = SiteId::from(raw);
        assert_eq!(Uuid::from(id), raw);
        assert_eq!(id.to_string(), raw.to_string());
    }
}
