//! Achievement evaluation: monotonic unlocks and point accrual.
//!
//! Unlock rules are tagged variants with an explicit match table - no
//! string-keyed category dispatch. An achievement, once unlocked, is never
//! re-evaluated or revoked, even if a later recompute would make its
//! predicate false; `total_points` only ever grows.

use crate::WorkoutStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points awarded per unlock
pub const POINTS_PER_UNLOCK: u64 = 50;

/// Predicate an achievement unlocks on
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnlockRule {
    /// Lifetime workout count reaches the requirement
    Workouts { required: u32 },
    /// Lifetime volume reaches the requirement
    Volume { required: f64 },
    /// Consecutive-day streak reaches the requirement
    StreakDays { required: u32 },
    /// Workouts this week reach the profile's weekly goal
    WeeklyGoal,
}

/// A gamified badge with monotonic unlock state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub rule: UnlockRule,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    fn locked(id: &str, name: &str, rule: UnlockRule) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rule,
            unlocked: false,
            unlocked_at: None,
        }
    }
}

/// The user's full achievement set plus accrued points.
///
/// Persists for the lifetime of the profile; see the `state` module for the
/// locked, atomic load/save path.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AchievementBook {
    pub achievements: Vec<Achievement>,
    pub total_points: u64,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self {
            achievements: default_achievements(),
            total_points: 0,
        }
    }
}

/// Built-in achievement ladder
fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::locked("first_workout", "First Rep", UnlockRule::Workouts { required: 1 }),
        Achievement::locked("workouts_10", "Regular", UnlockRule::Workouts { required: 10 }),
        Achievement::locked("workouts_50", "Dedicated", UnlockRule::Workouts { required: 50 }),
        Achievement::locked("workouts_100", "Century Club", UnlockRule::Workouts { required: 100 }),
        Achievement::locked("volume_10k", "Ten Tonnes", UnlockRule::Volume { required: 10_000.0 }),
        Achievement::locked("volume_100k", "Heavy Hitter", UnlockRule::Volume { required: 100_000.0 }),
        Achievement::locked("volume_500k", "Half a Million", UnlockRule::Volume { required: 500_000.0 }),
        Achievement::locked("streak_3", "Three In A Row", UnlockRule::StreakDays { required: 3 }),
        Achievement::locked("streak_7", "Full Week", UnlockRule::StreakDays { required: 7 }),
        Achievement::locked("streak_30", "Iron Month", UnlockRule::StreakDays { required: 30 }),
        Achievement::locked("weekly_goal", "Weekly Goal", UnlockRule::WeeklyGoal),
    ]
}

/// The explicit rule table.
///
/// A missing or unavailable input (e.g., a zero weekly goal) degrades to
/// "requirement not met" rather than raising.
fn satisfied(rule: &UnlockRule, stats: &WorkoutStats, weekly_goal: u32) -> bool {
    match rule {
        UnlockRule::Workouts { required } => stats.total_workouts >= *required,
        UnlockRule::Volume { required } => stats.total_volume >= *required,
        UnlockRule::StreakDays { required } => stats.current_streak_days >= *required,
        UnlockRule::WeeklyGoal => weekly_goal > 0 && stats.this_week_workouts >= weekly_goal,
    }
}

impl AchievementBook {
    /// Evaluate every still-locked achievement against the stats.
    ///
    /// Newly satisfied achievements are unlocked, stamped with `now`, and
    /// returned; points accrue per unlock. Already-unlocked achievements are
    /// never revisited, so calling this twice with identical stats unlocks
    /// and awards nothing the second time.
    pub fn check(&mut self, stats: &WorkoutStats, weekly_goal: u32, now: DateTime<Utc>) -> Vec<Achievement> {
        let mut newly_unlocked = Vec::new();

        for achievement in self.achievements.iter_mut() {
            if achievement.unlocked {
                continue;
            }
            if satisfied(&achievement.rule, stats, weekly_goal) {
                achievement.unlocked = true;
                achievement.unlocked_at = Some(now);
                tracing::info!("Unlocked achievement {}", achievement.id);
                newly_unlocked.push(achievement.clone());
            }
        }

        self.total_points += POINTS_PER_UNLOCK * newly_unlocked.len() as u64;
        newly_unlocked
    }

    /// Achievements currently unlocked
    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats_with(total_workouts: u32, total_volume: f64) -> WorkoutStats {
        WorkoutStats {
            total_workouts,
            total_volume,
            ..WorkoutStats::default()
        }
    }

    #[test]
    fn test_first_workout_unlocks() {
        let mut book = AchievementBook::default();
        let newly = book.check(&stats_with(1, 500.0), 3, Utc::now());

        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, "first_workout");
        assert!(newly[0].unlocked_at.is_some());
        assert_eq!(book.total_points, POINTS_PER_UNLOCK);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut book = AchievementBook::default();
        let stats = stats_with(10, 15_000.0);

        let first = book.check(&stats, 3, Utc::now());
        assert_eq!(first.len(), 3); // first_workout, workouts_10, volume_10k
        let points_after_first = book.total_points;

        let second = book.check(&stats, 3, Utc::now());
        assert!(second.is_empty());
        assert_eq!(book.total_points, points_after_first);
    }

    #[test]
    fn test_points_are_non_decreasing() {
        let mut book = AchievementBook::default();
        let mut last_points = 0;

        for (workouts, volume) in [(1, 100.0), (5, 5_000.0), (1, 0.0), (10, 20_000.0)] {
            book.check(&stats_with(workouts, volume), 3, Utc::now());
            assert!(book.total_points >= last_points);
            last_points = book.total_points;
        }
    }

    #[test]
    fn test_unlock_is_monotonic_when_stats_regress() {
        let mut book = AchievementBook::default();
        book.check(&stats_with(10, 0.0), 3, Utc::now());
        assert!(book.achievements.iter().any(|a| a.id == "workouts_10" && a.unlocked));

        // History shrank (deletes); the unlock and its points survive
        let newly = book.check(&stats_with(2, 0.0), 3, Utc::now());
        assert!(newly.is_empty());
        let regular = book.achievements.iter().find(|a| a.id == "workouts_10").unwrap();
        assert!(regular.unlocked);
        assert_eq!(book.total_points, 2 * POINTS_PER_UNLOCK);
    }

    #[test]
    fn test_streak_rule_uses_streak_days() {
        let mut book = AchievementBook::default();
        let mut stats = stats_with(5, 0.0);
        stats.current_streak_days = 3;

        let newly = book.check(&stats, 3, Utc::now());
        assert!(newly.iter().any(|a| a.id == "streak_3"));
        assert!(!newly.iter().any(|a| a.id == "streak_7"));
    }

    #[test]
    fn test_missing_streak_data_means_not_met() {
        let mut book = AchievementBook::default();
        // Default stats carry a zero streak; no streak badge can fire
        let newly = book.check(&stats_with(100, 1_000_000.0), 3, Utc::now());
        assert!(newly.iter().all(|a| !matches!(a.rule, UnlockRule::StreakDays { .. })));
    }

    #[test]
    fn test_weekly_goal_against_profile() {
        let mut book = AchievementBook::default();
        let mut stats = stats_with(4, 0.0);
        stats.this_week_workouts = 3;

        let newly = book.check(&stats, 4, Utc::now());
        assert!(!newly.iter().any(|a| a.id == "weekly_goal"));

        stats.this_week_workouts = 4;
        let newly = book.check(&stats, 4, Utc::now());
        assert!(newly.iter().any(|a| a.id == "weekly_goal"));
    }

    #[test]
    fn test_zero_weekly_goal_never_fires() {
        let mut book = AchievementBook::default();
        let mut stats = stats_with(1, 0.0);
        stats.this_week_workouts = 10;

        let newly = book.check(&stats, 0, Utc::now());
        assert!(!newly.iter().any(|a| a.id == "weekly_goal"));
    }

    #[test]
    fn test_unlocked_iterator() {
        let mut book = AchievementBook::default();
        assert_eq!(book.unlocked().count(), 0);
        book.check(&stats_with(1, 0.0), 3, Utc::now());
        assert_eq!(book.unlocked().count(), 1);
    }
}
