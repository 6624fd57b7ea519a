//! Newtype wrappers for domain identifiers.
//!
//! All identifiers are database-assigned `BIGINT` sequences. They serialize as
//! plain JSON numbers so clients can send `{"offerId": 1}`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_newtype!(
    /// Identifies a user account.
    UserId
);

id_newtype!(
    /// Identifies a purchasable offer in the catalog.
    OfferId
);

id_newtype!(
    /// Identifies an order (one checkout).
    OrderId
);

id_newtype!(
    /// Identifies an issued ticket. Not the scanned credential; see `final_key`.
    TicketId
);

id_newtype!(
    /// Identifies a login OTP challenge.
    OtpChallengeId
);
