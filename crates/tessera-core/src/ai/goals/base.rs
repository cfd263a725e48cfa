//! Goal Evaluator: scores candidate goals, filters non-positive scores,
//! sorts descending, and makes a weighted-random pick among the top
//! candidates (spec §4.6, steps 1-5).

use crate::ai::context::AIContext;
use crate::enums::AIState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalScore {
    pub name: &'static str,
    pub target_state: AIState,
    pub score: f64,
}

pub trait GoalScorer: Send + Sync {
    fn name(&self) -> &'static str;
    fn target_state(&self) -> AIState;
    fn score(&self, ctx: &AIContext) -> f64;
}

pub struct GoalEvaluator<'a> {
    scorers: &'a [&'a dyn GoalScorer],
}

impl<'a> GoalEvaluator<'a> {
    pub fn new(scorers: &'a [&'a dyn GoalScorer]) -> Self {
        Self { scorers }
    }

    /// Scores every registered goal, drops non-positive scores, and sorts
    /// the survivors descending.
    pub fn evaluate(&self, ctx: &AIContext) -> Vec<GoalScore> {
        let mut scored: Vec<GoalScore> = self
            .scorers
            .iter()
            .map(|scorer| GoalScore { name: scorer.name(), target_state: scorer.target_state(), score: scorer.score(ctx) })
            .filter(|s| s.score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        scored
    }

    /// Weighted-random pick from the top `top_n` candidates. Weights are
    /// `max(score - min_score + 0.1, 0.1)`; `rng_value` (drawn from
    /// `AI_DECISION, entity.id, tick + 50`) walks the cumulative
    /// distribution.
    pub fn select(candidates: &[GoalScore], rng_value: f64, top_n: usize) -> Option<GoalScore> {
        if candidates.is_empty() {
            return None;
        }
        let pool = &candidates[..candidates.len().min(top_n)];
        let min_score = pool.iter().map(|c| c.score).fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = pool.iter().map(|c| (c.score - min_score + 0.1).max(0.1)).collect();
        let total: f64 = weights.iter().sum();
        let target = rng_value * total;

        let mut cumulative = 0.0;
        for (candidate, weight) in pool.iter().zip(weights.iter()) {
            cumulative += weight;
            if target < cumulative {
                return Some(*candidate);
            }
        }
        pool.last().copied()
    }
}
