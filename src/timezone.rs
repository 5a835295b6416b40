use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Like [get_local_offset], but an unknown timezone is an error.
pub fn local_offset_or_error(canonical_timezone: &str) -> Result<UtcOffset, Error> {
    get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))
}

/// The current wall clock time in `canonical_timezone`.
///
/// # Errors
///
/// Returns an [Error::InvalidTimezoneError] if `canonical_timezone` is not a
/// known timezone name.
pub fn local_now(canonical_timezone: &str) -> Result<PrimitiveDateTime, Error> {
    let offset = local_offset_or_error(canonical_timezone)?;
    let now = OffsetDateTime::now_utc().to_offset(offset);

    Ok(PrimitiveDateTime::new(now.date(), now.time()))
}

#[cfg(test)]
mod timezone_tests {
    use time::UtcOffset;

    use crate::{
        Error,
        timezone::{get_local_offset, local_now},
    };

    #[test]
    fn utc_has_zero_offset() {
        assert_eq!(get_local_offset("Etc/UTC"), Some(UtcOffset::UTC));
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        assert_eq!(
            local_now("Mars/Olympus_Mons"),
            Err(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }
}
