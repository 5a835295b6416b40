//! The session token stored in the encrypted auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserID;

mod expiry_format {
    //! Serialize an [OffsetDateTime] with fixed-width fields.
    //!
    //! The default serde format writes midnight as "0:00:00.0", which it then
    //! fails to parse because it expects a two digit hour.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expiry: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = expiry
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the logged in user and when their session ends.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}
