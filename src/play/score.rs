use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Star marks as tenths of the maximum score.
pub const STAR_TENTHS: [u32; 3] = [3, 6, 9];

/// Three score marks with one-way latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    marks: [u32; 3],
    achieved: [bool; 3],
}

impl StarThresholds {
    pub fn new(max_score: u32) -> Self {
        Self {
            marks: STAR_TENTHS.map(|tenths| (max_score as u64 * tenths as u64 / 10) as u32),
            achieved: [false; 3],
        }
    }

    pub fn marks(&self) -> [u32; 3] {
        self.marks
    }

    pub fn achieved(&self) -> [bool; 3] {
        self.achieved
    }

    /// Latch every mark `score` has reached. Returns newly latched stars
    /// (0-based).
    pub fn update(&mut self, score: u32) -> Vec<usize> {
        let mut latched = Vec::new();
        for (i, mark) in self.marks.iter().enumerate() {
            if !self.achieved[i] && score >= *mark {
                self.achieved[i] = true;
                latched.push(i);
            }
        }
        latched
    }
}

/// Running tally for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub misses: u32,
    pub perfect: u32,
    max_score: u32,
    stars: StarThresholds,
}

impl ScoreState {
    /// Marks of zero (maps worth under four points) are reached at the
    /// start and latch immediately.
    pub fn new(max_score: u32) -> Self {
        let mut stars = StarThresholds::new(max_score);
        stars.update(0);
        Self {
            score: 0,
            streak: 0,
            max_streak: 0,
            misses: 0,
            perfect: 0,
            max_score,
            stars,
        }
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn award(&mut self, points: u32) {
        if points == 0 {
            return;
        }
        self.score = self.score.saturating_add(points);
        for star in self.stars.update(self.score) {
            info!(star = star + 1, score = self.score, "Star achieved");
        }
    }

    /// Perfect judgement: extends the streak.
    pub fn register_perfect(&mut self) {
        self.perfect += 1;
        self.streak += 1;
        self.max_streak = self.max_streak.max(self.streak);
    }

    pub fn register_miss(&mut self) {
        self.misses += 1;
        self.break_streak();
    }

    pub fn break_streak(&mut self) {
        if self.streak > 0 {
            debug!(final_streak = self.streak, "Streak ended");
        }
        self.streak = 0;
    }

    pub fn stars(&self) -> [bool; 3] {
        self.stars.achieved()
    }

    pub fn star_marks(&self) -> [u32; 3] {
        self.stars.marks()
    }

    /// Score as a fraction of the maximum, clamped to 1.0.
    pub fn progress(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        (self.score as f64 / self.max_score as f64).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_are_floored_tenths() {
        assert_eq!(StarThresholds::new(30).marks(), [9, 18, 27]);
        assert_eq!(StarThresholds::new(25).marks(), [7, 15, 22]);
    }

    #[test]
    fn stars_latch_in_order() {
        let mut score = ScoreState::new(30);
        score.award(10);
        assert_eq!(score.stars(), [true, false, false]);
        score.award(10);
        assert_eq!(score.stars(), [true, true, false]);
        score.award(10);
        assert_eq!(score.stars(), [true, true, true]);
    }

    #[test]
    fn zero_marks_latch_before_any_points() {
        for max_score in 1..=3 {
            let score = ScoreState::new(max_score);
            assert_eq!(score.star_marks()[0], 0);
            assert!(score.stars()[0]);
        }
        let score = ScoreState::new(3);
        assert_eq!(score.star_marks(), [0, 1, 2]);
        assert_eq!(score.stars(), [true, false, false]);
        assert_eq!(ScoreState::new(1).stars(), [true, true, true]);
    }

    #[test]
    fn marks_do_not_overflow() {
        assert_eq!(
            StarThresholds::new(u32::MAX).marks(),
            [1_288_490_188, 2_576_980_377, 3_865_470_565]
        );
        let mut score = ScoreState::new(u32::MAX);
        score.award(u32::MAX);
        score.award(10);
        assert_eq!(score.score, u32::MAX);
        assert_eq!(score.stars(), [true, true, true]);
    }

    #[test]
    fn big_award_latches_several_stars() {
        let mut stars = StarThresholds::new(100);
        assert_eq!(stars.update(65), vec![0, 1]);
        assert!(stars.update(65).is_empty());
        assert_eq!(stars.update(90), vec![2]);
    }

    #[test]
    fn streak_bookkeeping() {
        let mut score = ScoreState::new(30);
        score.register_perfect();
        score.register_perfect();
        score.register_miss();
        score.register_perfect();
        assert_eq!(score.streak, 1);
        assert_eq!(score.max_streak, 2);
        assert_eq!(score.misses, 1);
        assert_eq!(score.perfect, 3);
    }

    #[test]
    fn progress_is_clamped() {
        let mut score = ScoreState::new(20);
        score.award(5);
        assert_eq!(score.progress(), 0.25);
        score.award(100);
        assert_eq!(score.progress(), 1.0);
    }
}
