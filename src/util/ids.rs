//! Strongly typed identifiers for domain records.
//!
//! Every identifier is an opaque string owned by the collaborator that stores the
//! record. Wrapping them keeps a product id from ever being passed where a pickup
//! location id is expected, and lets cache keys stay typed.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a cooperative member.
    MemberId
);
string_id!(
    /// Identifier of a product.
    ProductId
);
string_id!(
    /// Identifier of a product type (e.g. vegetables, eggs).
    ProductTypeId
);
string_id!(
    /// Identifier of a pickup location.
    PickupLocationId
);
string_id!(
    /// Identifier of a subscription.
    SubscriptionId
);
string_id!(
    /// Identifier of a growing period.
    GrowingPeriodId
);
string_id!(
    /// Identifier of a waiting-list entry.
    WaitingListEntryId
);
string_id!(
    /// Name of a basket size (e.g. `small`, `medium`).
    BasketSizeName
);
