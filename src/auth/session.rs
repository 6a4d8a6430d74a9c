use time::{Duration, OffsetDateTime};

/// Outcome of the session freshness check on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The window from the last mint is still open: reuse the existing
    /// session, report when it lapses, write nothing.
    Fresh { expires_at: OffsetDateTime },
    /// The window is over (or no token was ever minted): mint a new token
    /// and persist the new issuance instant.
    Lapsed,
}

/// Login's decision engine: `expiry = token_issued_at + window`, fresh
/// strictly before expiry, lapsed at and after it.
///
/// A user who has never logged in carries the epoch as `token_issued_at`,
/// which lands in the lapsed branch with no special case. Refresh never
/// calls this: an explicit renewal request always mints.
pub fn check(token_issued_at: OffsetDateTime, now: OffsetDateTime, window: Duration) -> Freshness {
    let expires_at = token_issued_at + window;
    if now < expires_at {
        Freshness::Fresh { expires_at }
    } else {
        Freshness::Lapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const WINDOW: Duration = Duration::hours(24);

    #[test]
    fn open_window_is_fresh_and_reports_expiry() {
        let issued = datetime!(2026-03-01 08:00:00 UTC);
        let now = datetime!(2026-03-01 20:00:00 UTC);
        assert_eq!(
            check(issued, now, WINDOW),
            Freshness::Fresh {
                expires_at: datetime!(2026-03-02 08:00:00 UTC)
            }
        );
    }

    #[test]
    fn one_second_before_expiry_is_still_fresh() {
        let issued = datetime!(2026-03-01 08:00:00 UTC);
        let now = datetime!(2026-03-02 07:59:59 UTC);
        assert!(matches!(check(issued, now, WINDOW), Freshness::Fresh { .. }));
    }

    #[test]
    fn exact_expiry_instant_is_lapsed() {
        let issued = datetime!(2026-03-01 08:00:00 UTC);
        let now = datetime!(2026-03-02 08:00:00 UTC);
        assert_eq!(check(issued, now, WINDOW), Freshness::Lapsed);
    }

    #[test]
    fn past_expiry_is_lapsed() {
        let issued = datetime!(2026-03-01 08:00:00 UTC);
        let now = datetime!(2026-03-05 08:00:00 UTC);
        assert_eq!(check(issued, now, WINDOW), Freshness::Lapsed);
    }

    #[test]
    fn never_issued_reads_as_lapsed() {
        let epoch = OffsetDateTime::UNIX_EPOCH;
        let now = datetime!(2026-03-01 08:00:00 UTC);
        assert_eq!(check(epoch, now, WINDOW), Freshness::Lapsed);
    }
}
