//! UTC timestamp formatting, second precision.

use time::OffsetDateTime;

/// `YYYY-MM-DDTHH:MM:SSZ` for the current UTC time.
pub fn iso_now() -> String {
    iso(OffsetDateTime::now_utc())
}

/// `YYYY-MM-DDTHH:MM:SSZ`.
pub fn iso(t: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        t.year(),
        t.month() as u8,
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// `YYYYMMDDTHHMMSS` — compact, filesystem-safe, lexically sortable.
pub fn compact_now() -> String {
    compact(OffsetDateTime::now_utc())
}

/// `YYYYMMDDTHHMMSS`.
pub fn compact(t: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        t.year(),
        t.month() as u8,
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// `YYYYMMDD-HHMMSS` — the stamp embedded in change ids.
pub fn change_stamp_now() -> String {
    let t = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}-{:02}{:02}{:02}",
        t.year(),
        t.month() as u8,
        t.day(),
        t.hour(),
        t.minute(),
        t.second()
    )
}

/// `YYYY-MM-DD` — the current UTC calendar date, the unit of monitor
/// idempotency.
pub fn utc_date_now() -> String {
    utc_date(OffsetDateTime::now_utc())
}

/// `YYYY-MM-DD`.
pub fn utc_date(t: OffsetDateTime) -> String {
    format!("{:04}-{:02}-{:02}", t.year(), t.month() as u8, t.day())
}
