use crate::domain::walk_documents;
use crate::page::template::ListingRow;
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Collects a listing row for every document under `root`.
pub fn scan_listing(root: &Path, suffix: &str, now: SystemTime) -> io::Result<Vec<ListingRow>> {
    let mut rows = Vec::new();

    walk_documents(root, suffix, &mut |doc| {
        rows.push(ListingRow {
            name: doc.display_name(suffix).to_string(),
            modified: humanize_age(doc.modified, now),
            size: humanize_bytes(doc.size),
            link: doc.link(),
            id: doc.id,
        });
        Ok(())
    })?;

    Ok(rows)
}

/// Relative age of `then` as seen at `now`, e.g. `3 minutes ago`.
pub fn humanize_age(then: SystemTime, now: SystemTime) -> String {
    let then: DateTime<Utc> = then.into();
    let now: DateTime<Utc> = now.into();
    let delta = now.signed_duration_since(then);

    let (seconds, suffix) = if delta.num_seconds() < 0 {
        (-delta.num_seconds(), "from now")
    } else {
        (delta.num_seconds(), "ago")
    };

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 12 * MONTH;

    let (amount, unit) = match seconds {
        0 => return "now".to_string(),
        s if s < MINUTE => (s, "second"),
        s if s < HOUR => (s / MINUTE, "minute"),
        s if s < DAY => (s / HOUR, "hour"),
        s if s < WEEK => (s / DAY, "day"),
        s if s < MONTH => (s / WEEK, "week"),
        s if s < YEAR => (s / MONTH, "month"),
        s => (s / YEAR, "year"),
    };

    if amount == 1 {
        format!("1 {unit} {suffix}")
    } else {
        format!("{amount} {unit}s {suffix}")
    }
}

/// Size in SI units, e.g. `82 B`, `1.2 kB`, `23 MB`.
pub fn humanize_bytes(size: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if size < 10 {
        return format!("{size} B");
    }

    let mut exp = 0;
    let mut divisor = 1u64;
    while exp < UNITS.len() - 1 && size / divisor >= 1000 {
        divisor *= 1000;
        exp += 1;
    }
    let value = size as f64 / divisor as f64;
    // one decimal below 10, like `1.2 kB`
    let value = (value * 10.0 + 0.5).floor() / 10.0;

    if value < 10.0 {
        format!("{value:.1} {}", UNITS[exp])
    } else {
        format!("{value:.0} {}", UNITS[exp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn ages_read_naturally() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(10_000_000);
        let ago = |secs| humanize_age(now - Duration::from_secs(secs), now);

        assert_eq!(ago(0), "now");
        assert_eq!(ago(1), "1 second ago");
        assert_eq!(ago(45), "45 seconds ago");
        assert_eq!(ago(60), "1 minute ago");
        assert_eq!(ago(3 * 3600), "3 hours ago");
        assert_eq!(ago(2 * 86_400), "2 days ago");
        assert_eq!(ago(14 * 86_400), "2 weeks ago");
        assert_eq!(ago(400 * 86_400), "1 year ago");
        assert_eq!(
            humanize_age(now + Duration::from_secs(120), now),
            "2 minutes from now"
        );
    }

    #[test]
    fn sizes_use_si_units() {
        assert_eq!(humanize_bytes(0), "0 B");
        assert_eq!(humanize_bytes(9), "9 B");
        assert_eq!(humanize_bytes(82), "82 B");
        assert_eq!(humanize_bytes(1_200), "1.2 kB");
        assert_eq!(humanize_bytes(23_000_000), "23 MB");
        assert_eq!(humanize_bytes(1 << 30), "1.1 GB");
    }
}
