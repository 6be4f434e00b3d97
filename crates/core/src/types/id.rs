//! Newtype IDs for type-safe entity references.
//!
//! Catalog rows, orders and quotes are all identified by short strings
//! (`T001`, `ORDER_1718000000000`, `QT1718000000000`). The `define_id!`
//! macro wraps them so a tool id can never be passed where an order id is
//! expected.

use chrono::{DateTime, Utc};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `new()`, `as_str()`, `into_inner()`
/// - `Display`, `From<&str>`, `From<String>` and `AsRef<str>`
///
/// # Example
///
/// ```rust
/// # use nexus_core::define_id;
/// define_id!(SkuId);
/// define_id!(BatchId);
///
/// let sku = SkuId::new("T001");
/// assert_eq!(sku.as_str(), "T001");
///
/// // These are different types, so this won't compile:
/// // let _: BatchId = sku;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID, trimming surrounding whitespace.
            #[must_use]
            pub fn new(id: impl AsRef<str>) -> Self {
                Self(id.as_ref().trim().to_owned())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self::new(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ToolId);
define_id!(OrderId);
define_id!(QuoteId);

impl ToolId {
    /// Synthesize an id for a spreadsheet row that has none (`T001`, `T002`, ...).
    ///
    /// `row_index` is zero-based.
    #[must_use]
    pub fn for_row(row_index: usize) -> Self {
        Self(format!("T{:03}", row_index + 1))
    }
}

impl OrderId {
    /// Order id derived from a timestamp (`ORDER_<unix-millis>`).
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self(format!("ORDER_{}", timestamp.timestamp_millis()))
    }

    /// Order id for the current instant.
    #[must_use]
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }
}

impl QuoteId {
    /// Quote id derived from a timestamp (`QT<unix-millis>`).
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self(format!("QT{}", timestamp.timestamp_millis()))
    }

    /// Quote id for the current instant.
    #[must_use]
    pub fn generate() -> Self {
        Self::at(Utc::now())
    }
}
