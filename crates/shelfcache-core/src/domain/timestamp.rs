use time::OffsetDateTime;

/// Milliseconds since the Unix epoch for `value`.
pub fn epoch_millis(value: OffsetDateTime) -> i64 {
    (value.unix_timestamp_nanos() / 1_000_000) as i64
}

pub fn now_epoch_millis() -> i64 {
    epoch_millis(OffsetDateTime::now_utc())
}
