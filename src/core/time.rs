use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

pub(crate) fn format_optional(value: Option<PrimitiveDateTime>) -> Option<String> {
    value.map(format_primitive)
}

/// Whole seconds from `now` until `deadline`, rounded up and clamped at zero.
pub(crate) fn seconds_until(now: PrimitiveDateTime, deadline: PrimitiveDateTime) -> i64 {
    let remaining = deadline - now;
    if remaining.is_negative() || remaining.is_zero() {
        return 0;
    }
    let whole = remaining.whole_seconds();
    if remaining.subsec_nanoseconds() > 0 {
        whole + 1
    } else {
        whole
    }
}
