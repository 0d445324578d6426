/// Level arithmetic
///
/// A user's level is derived from accumulated points with a square-root curve:
///
/// ```text
/// level = clamp(floor(sqrt(points / 50)) + 1, 1, 999)
/// ```
///
/// | Level | Minimum points |
/// |-------|----------------|
/// | 1     | 0              |
/// | 2     | 50             |
/// | 3     | 200            |
/// | 4     | 450            |
/// | 10    | 4,050          |
///
/// Totals of zero or below always map to level 1.
///
/// # Example
///
/// ```
/// use levelboard_shared::leveling::{level_from_points, points_for_level};
///
/// assert_eq!(level_from_points(0), 1);
/// assert_eq!(level_from_points(60), 2);
/// assert_eq!(points_for_level(3), 200);
/// ```

use serde::Serialize;

/// Points scale of the level curve
pub const BASE: i64 = 50;

/// Lowest reachable level
pub const MIN_LEVEL: i32 = 1;

/// Highest reachable level
pub const MAX_LEVEL: i32 = 999;

/// Computes the level for a point total
pub fn level_from_points(points: i64) -> i32 {
    if points <= 0 {
        return MIN_LEVEL;
    }

    // floor(sqrt(p / 50)) == isqrt(p div 50) for integer p
    let root = isqrt(points / BASE);
    (root + 1).clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as i32
}

/// Point total at which `level` is completed
///
/// This is the first total of the next level, so
/// `level_from_points(threshold_for_level(l)) == l + 1` (capped at 999).
pub fn threshold_for_level(level: i32) -> i64 {
    let level = level as i64;
    BASE * level * level
}

/// Minimum point total that yields `level`
///
/// Inverse of [`level_from_points`] on level boundaries.
pub fn points_for_level(level: i32) -> i64 {
    let below = (level.clamp(MIN_LEVEL, MAX_LEVEL) - 1) as i64;
    BASE * below * below
}

/// Progress of a point total through its current level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LevelProgress {
    /// Current level
    pub level: i32,

    /// Minimum points of the current level
    pub level_floor: i64,

    /// Minimum points of the next level (None at the level cap)
    pub next_level_at: Option<i64>,

    /// Points still missing to reach the next level (None at the level cap)
    pub points_to_next: Option<i64>,
}

impl LevelProgress {
    /// Computes progress for a point total
    pub fn for_points(points: i64) -> Self {
        let level = level_from_points(points);
        let next_level_at = (level < MAX_LEVEL).then(|| points_for_level(level + 1));

        Self {
            level,
            level_floor: points_for_level(level),
            next_level_at,
            points_to_next: next_level_at.map(|next| (next - points.max(0)).max(0)),
        }
    }
}

fn isqrt(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }

    let mut root = (n as f64).sqrt() as i64;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_levels() {
        assert_eq!(level_from_points(0), 1);
        assert_eq!(level_from_points(49), 1);
        assert_eq!(level_from_points(50), 2);
        assert_eq!(level_from_points(60), 2);
        assert_eq!(level_from_points(199), 2);
        assert_eq!(level_from_points(200), 3);
    }

    #[test]
    fn test_negative_points_clamp_to_first_level() {
        assert_eq!(level_from_points(-1), 1);
        assert_eq!(level_from_points(-1_000_000), 1);
        assert_eq!(level_from_points(i64::MIN), 1);
    }

    #[test]
    fn test_level_cap() {
        assert_eq!(level_from_points(points_for_level(MAX_LEVEL)), MAX_LEVEL);
        assert_eq!(level_from_points(i64::MAX), MAX_LEVEL);
    }

    #[test]
    fn test_points_for_level_is_inverse_on_boundaries() {
        for level in MIN_LEVEL..=MAX_LEVEL {
            assert_eq!(level_from_points(points_for_level(level)), level);
            if level > MIN_LEVEL {
                assert_eq!(level_from_points(points_for_level(level) - 1), level - 1);
            }
        }
    }

    #[test]
    fn test_threshold_completes_level() {
        assert_eq!(threshold_for_level(1), 50);
        assert_eq!(threshold_for_level(2), 200);

        for level in MIN_LEVEL..=MAX_LEVEL {
            let expected = (level + 1).min(MAX_LEVEL);
            assert_eq!(level_from_points(threshold_for_level(level)), expected);
        }
    }

    #[test]
    fn test_monotonic_and_bounded() {
        let mut previous = level_from_points(0);
        for points in (0..200_000).step_by(7) {
            let level = level_from_points(points);
            assert!(level >= previous, "level dropped at {} points", points);
            assert!((MIN_LEVEL..=MAX_LEVEL).contains(&level));
            previous = level;
        }
    }

    #[test]
    fn test_level_progress() {
        let progress = LevelProgress::for_points(60);
        assert_eq!(progress.level, 2);
        assert_eq!(progress.level_floor, 50);
        assert_eq!(progress.next_level_at, Some(200));
        assert_eq!(progress.points_to_next, Some(140));

        let capped = LevelProgress::for_points(i64::MAX);
        assert_eq!(capped.level, MAX_LEVEL);
        assert!(capped.next_level_at.is_none());
        assert!(capped.points_to_next.is_none());
    }
}
