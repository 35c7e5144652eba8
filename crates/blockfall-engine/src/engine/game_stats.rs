use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Base points for line clears, indexed by the number of lines cleared at once.
///
/// The base is multiplied by the level at the time of the clear.
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

/// Points per row for a soft drop step.
const SOFT_DROP_POINTS: usize = 1;
/// Points per row descended by a hard drop.
const HARD_DROP_POINTS: usize = 2;

/// Automatic drop interval in milliseconds, indexed by `level - 1`.
///
/// Levels past the end of the table use the last entry.
const GRAVITY_TABLE_MILLIS: [u64; 15] = [
    1000, 793, 617, 473, 355, 262, 190, 135, 94, 64, 43, 28, 18, 12, 8,
];

/// Game statistics: score, lines, level and gravity speed.
///
/// # Scoring
///
/// - Line clears: 100 / 300 / 500 / 800 points for 1 / 2 / 3 / 4 lines, times the level
/// - Soft drop: 1 point per row, hard drop: 2 points per row, regardless of level
///
/// No combo, back-to-back or T-spin bonuses.
///
/// # Leveling
///
/// The level starts at 1 and goes up every [`GameStats::LINES_PER_LEVEL`] lines.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4); // 4 lines at level 1
///
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameStats {
    score: usize,
    drop_points: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    pub const LINES_PER_LEVEL: usize = 10;

    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            drop_points: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    /// Returns the current score, drop points included.
    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the part of the score earned by soft and hard drops.
    #[must_use]
    pub const fn drop_points(&self) -> usize {
        self.drop_points
    }

    /// Returns the current level, starting at 1.
    #[must_use]
    pub const fn level(&self) -> usize {
        1 + self.total_cleared_lines / Self::LINES_PER_LEVEL
    }

    /// Returns the automatic drop interval for the current level.
    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        let index = usize::min(self.level() - 1, GRAVITY_TABLE_MILLIS.len() - 1);
        Duration::from_millis(GRAVITY_TABLE_MILLIS[index])
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by number of lines cleared.
    ///
    /// - `[0]`: locks that cleared nothing
    /// - `[1]`..`[4]`: singles, doubles, triples and quads
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Awards the points for one soft drop step.
    pub const fn soft_drop(&mut self) {
        self.add_drop_points(SOFT_DROP_POINTS);
    }

    /// Awards the points for a hard drop that descended `rows` rows.
    pub const fn hard_drop(&mut self, rows: usize) {
        self.add_drop_points(rows * HARD_DROP_POINTS);
    }

    const fn add_drop_points(&mut self, points: usize) {
        self.drop_points += points;
        self.score += points;
    }

    /// Updates statistics after a piece is locked and returns the line clear points.
    ///
    /// The points use the level from before the clear.
    ///
    /// # Panics
    ///
    /// Panics if `cleared_lines` is greater than 4.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) -> usize {
        let points = SCORE_TABLE[cleared_lines] * self.level();
        self.completed_pieces += 1;
        self.line_cleared_counter[cleared_lines] += 1;
        self.total_cleared_lines += cleared_lines;
        self.score += points;
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stats() {
        let stats = GameStats::new();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.total_cleared_lines(), 0);
        assert_eq!(stats.gravity_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_line_clear_points_at_level_one() {
        for (lines, expected) in [(0, 0), (1, 100), (2, 300), (3, 500), (4, 800)] {
            let mut stats = GameStats::new();
            assert_eq!(stats.complete_piece_drop(lines), expected);
            assert_eq!(stats.score(), expected);
        }
    }

    #[test]
    fn test_level_multiplier_uses_level_before_clear() {
        let mut stats = GameStats::new();
        assert_eq!(stats.complete_piece_drop(4), 800);
        assert_eq!(stats.complete_piece_drop(4), 800);
        assert_eq!(stats.level(), 1);
        // Reaches 10 lines; still scored at level 1.
        assert_eq!(stats.complete_piece_drop(2), 300);
        assert_eq!(stats.level(), 2);
        assert_eq!(stats.complete_piece_drop(1), 200);
        assert_eq!(stats.score(), 800 + 800 + 300 + 200);
        assert_eq!(stats.total_cleared_lines(), 11);
        assert_eq!(stats.line_cleared_counter(), &[0, 1, 1, 0, 2]);
        assert_eq!(stats.completed_pieces(), 4);
    }

    #[test]
    fn test_gravity_interval_follows_level() {
        let mut stats = GameStats::new();
        let mut previous = stats.gravity_interval();
        for _ in 1..GRAVITY_TABLE_MILLIS.len() {
            for _ in 0..GameStats::LINES_PER_LEVEL {
                stats.complete_piece_drop(1);
            }
            let interval = stats.gravity_interval();
            assert!(interval < previous, "level {}", stats.level());
            previous = interval;
        }
        assert_eq!(stats.level(), GRAVITY_TABLE_MILLIS.len());
        assert_eq!(previous, Duration::from_millis(8));

        // Clamped past the end of the table.
        for _ in 0..5 * GameStats::LINES_PER_LEVEL {
            stats.complete_piece_drop(1);
        }
        assert_eq!(stats.gravity_interval(), Duration::from_millis(8));
    }

    #[test]
    fn test_drop_points_do_not_scale_with_level() {
        let mut stats = GameStats::new();
        for _ in 0..3 {
            stats.complete_piece_drop(4);
        }
        assert_eq!(stats.level(), 2);
        let before = stats.score();
        stats.soft_drop();
        stats.hard_drop(7);
        assert_eq!(stats.score(), before + 1 + 14);
        assert_eq!(stats.drop_points(), 15);
    }

    #[test]
    fn test_stats_serialization() {
        let mut stats = GameStats::new();
        stats.complete_piece_drop(2);
        stats.hard_drop(3);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["score"], 306);
        assert_eq!(value["total_cleared_lines"], 2);
        let deserialized: GameStats = serde_json::from_value(value).unwrap();
        assert_eq!(deserialized, stats);
    }
}
