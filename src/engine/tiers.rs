// ==========================================
// 采购建议引擎 - 速度分层
// ==========================================
// 职责: 按速度子分的百分位把候选划分为 fast / medium / slow
// 百分位定义: 严格低于自身速度子分的候选数 / (n - 1)；n = 1 时为 1.0
// 同分候选百分位相同，因此落在同一层
// ==========================================

use crate::config::TierConfig;
use crate::domain::types::VelocityTier;
use crate::engine::scoring::ScoredCandidate;

/// 为排序后的候选分层（输出与输入一一对应）
pub fn assign_velocity_tiers(ranked: &[ScoredCandidate<'_>], config: &TierConfig) -> Vec<VelocityTier> {
    let n = ranked.len();
    if n == 0 {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = ranked.iter().map(|s| s.score.velocity).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    ranked
        .iter()
        .map(|s| {
            let percentile = if n == 1 {
                1.0
            } else {
                let below = sorted.partition_point(|v| *v < s.score.velocity);
                below as f64 / (n - 1) as f64
            };
            tier_for_percentile(percentile, config)
        })
        .collect()
}

fn tier_for_percentile(percentile: f64, config: &TierConfig) -> VelocityTier {
    if percentile >= config.fast_percentile {
        VelocityTier::Fast
    } else if percentile >= config.medium_percentile {
        VelocityTier::Medium
    } else {
        VelocityTier::Slow
    }
}
