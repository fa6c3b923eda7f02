use chrono::{DateTime, TimeDelta, Utc};
use std::path::Path;

use super::types::StateError;
use crate::util::atomic_write;

/// Timestamp of the previous poll, kept in a one-line text file.
///
/// Informational only: deduplication never consults it.
pub struct LastFetchMarker;

impl LastFetchMarker {
    /// Read the marker at `path`, falling back to `now - fallback_offset`
    /// when the file does not exist. An offset reaching past the earliest
    /// representable time yields that earliest time.
    pub fn read(
        path: &Path,
        now: DateTime<Utc>,
        fallback_offset: TimeDelta,
    ) -> Result<DateTime<Utc>, StateError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    offset_secs = fallback_offset.num_seconds(),
                    "No last-fetch marker, using fallback offset"
                );
                return Ok(now
                    .checked_sub_signed(fallback_offset)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC));
            }
            Err(e) => return Err(StateError::io(path, e)),
        };

        let value = content.trim();
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| StateError::Timestamp {
                path: path.to_path_buf(),
                value: value.to_string(),
                source,
            })
    }

    /// Overwrite the marker with `at`.
    pub fn write(path: &Path, at: DateTime<Utc>) -> Result<(), StateError> {
        atomic_write(path, at.to_rfc3339().as_bytes()).map_err(|e| StateError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_file_uses_offset() {
        let dir = tempfile::tempdir().unwrap();
        let offset = TimeDelta::seconds(645);
        let marker =
            LastFetchMarker::read(&dir.path().join("last_date_published.txt"), now(), offset)
                .unwrap();
        assert_eq!(marker, now() - offset);
    }

    #[test]
    fn test_missing_file_with_unbounded_offset_saturates() {
        let dir = tempfile::tempdir().unwrap();
        let marker = LastFetchMarker::read(
            &dir.path().join("last_date_published.txt"),
            now(),
            TimeDelta::MAX,
        )
        .unwrap();
        assert_eq!(marker, DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_date_published.txt");
        let at = now() - TimeDelta::minutes(7);

        LastFetchMarker::write(&path, at).unwrap();
        let read = LastFetchMarker::read(&path, now(), TimeDelta::zero()).unwrap();
        assert_eq!(read, at);
    }

    #[test]
    fn test_accepts_offset_and_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_date_published.txt");
        std::fs::write(&path, "2024-03-02T07:00:00-05:00\n").unwrap();

        let read = LastFetchMarker::read(&path, now(), TimeDelta::zero()).unwrap();
        assert_eq!(read, now());
    }

    #[test]
    fn test_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_date_published.txt");
        std::fs::write(&path, "yesterday").unwrap();

        let err = LastFetchMarker::read(&path, now(), TimeDelta::zero()).unwrap_err();
        assert!(matches!(err, StateError::Timestamp { .. }));
        assert!(err.to_string().contains("yesterday"));
    }
}
