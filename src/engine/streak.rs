use chrono::NaiveDate;

use crate::store::schema::ProfileData;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fold one practice day into the profile's streak.
///
/// Practicing the day after the last recorded day extends the streak,
/// practicing again on the same day keeps it, anything else restarts at 1.
pub fn record_practice(profile: &mut ProfileData, day: NaiveDate) {
    let today = day.format(DATE_FORMAT).to_string();
    if profile.last_practice_date.as_deref() == Some(today.as_str()) {
        return;
    }

    let last = profile
        .last_practice_date
        .as_deref()
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok());
    profile.streak_days = match last {
        Some(last) if day.signed_duration_since(last).num_days() == 1 => profile.streak_days + 1,
        _ => 1,
    };
    profile.best_streak = profile.best_streak.max(profile.streak_days);
    profile.last_practice_date = Some(today);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_first_practice_starts_streak() {
        let mut profile = ProfileData::default();
        record_practice(&mut profile, day("2026-03-01"));
        assert_eq!(profile.streak_days, 1);
        assert_eq!(profile.best_streak, 1);
        assert_eq!(profile.last_practice_date.as_deref(), Some("2026-03-01"));
    }

    #[test]
    fn test_consecutive_days_extend() {
        let mut profile = ProfileData::default();
        record_practice(&mut profile, day("2026-02-27"));
        record_practice(&mut profile, day("2026-02-28"));
        record_practice(&mut profile, day("2026-03-01"));
        assert_eq!(profile.streak_days, 3);
        assert_eq!(profile.best_streak, 3);
    }

    #[test]
    fn test_same_day_keeps_streak() {
        let mut profile = ProfileData::default();
        record_practice(&mut profile, day("2026-03-01"));
        record_practice(&mut profile, day("2026-03-02"));
        record_practice(&mut profile, day("2026-03-02"));
        assert_eq!(profile.streak_days, 2);
    }

    #[test]
    fn test_gap_resets_but_best_survives() {
        let mut profile = ProfileData::default();
        record_practice(&mut profile, day("2026-03-01"));
        record_practice(&mut profile, day("2026-03-02"));
        record_practice(&mut profile, day("2026-03-05"));
        assert_eq!(profile.streak_days, 1);
        assert_eq!(profile.best_streak, 2);
    }

    #[test]
    fn test_unparsable_last_date_restarts() {
        let mut profile = ProfileData::default();
        profile.streak_days = 9;
        profile.last_practice_date = Some("yesterday".to_string());
        record_practice(&mut profile, day("2026-03-01"));
        assert_eq!(profile.streak_days, 1);
    }
}
