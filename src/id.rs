//! Code for handling keys and arena indices
//!
//! Keys (node, carrier, edge, goal keys, tags) are cheap, atomically reference-counted strings,
//! so errors carrying them can cross threads. Slots are stored in an arena owned by the graph
//! and addressed by plain indices.

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone, std::hash::Hash, PartialEq, Eq, PartialOrd, Ord, Debug, serde::Serialize,
        )]
        /// A key type (e.g. `NodeID`, `CarrierID`, etc.)
        pub struct $name(pub std::sync::Arc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::sync::Arc::from(s))
            }
        }

        impl $name {
            /// Create a new key from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::sync::Arc::from(id))
            }

            /// The key as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}
pub(crate) use define_id_type;

macro_rules! define_index_type {
    ($name:ident) => {
        #[derive(Clone, Copy, std::hash::Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
        /// A stable index into one of the graph's arenas
        pub struct $name(pub(crate) usize);

        impl $name {
            /// The position of the item in its arena
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}
pub(crate) use define_index_type;

define_id_type! {Tag}
