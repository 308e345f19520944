// ==========================================
// 采购建议引擎 - 硬约束过滤引擎
// ==========================================
// 红线: 不短路，所有未通过规则都要记录（用户需要看到全部排除原因）
// ==========================================
// 输入: Candidate + ConstraintSet
// 输出: FilterVerdict（passed + 有序失败原因列表）
// ==========================================

use crate::domain::candidate::Candidate;
use crate::domain::constraint::ConstraintSet;
use crate::domain::result::FilterVerdict;
use crate::domain::types::{FilterReason, GoalKind, VolatilityPolicy};
use rayon::prelude::*;
use tracing::{debug, instrument};

// ==========================================
// FilterEngine - 过滤引擎
// ==========================================
pub struct FilterEngine {
    constraints: ConstraintSet,
    goal_kind: GoalKind,
}

impl FilterEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - `constraints`: 本次运行的约束集
    /// - `goal_kind`: 目标类型（补货目标下波动规则可降级为扣分）
    pub fn new(constraints: &ConstraintSet, goal_kind: GoalKind) -> Self {
        Self { constraints: constraints.clone(), goal_kind }
    }

    /// 补货目标 + Penalize 策略下，波动超限不做硬过滤
    pub fn volatility_is_penalized(&self) -> bool {
        self.goal_kind == GoalKind::Restock
            && self.constraints.restock_volatility_policy == VolatilityPolicy::Penalize
    }

    /// 评估单个候选
    ///
    /// 规则顺序（依次全部评估）:
    /// 1) brand_restricted
    /// 2) hazmat
    /// 3) no_pricing_data（定价缺失时跳过 ROI 规则）
    /// 4) roi_too_low
    /// 5) too_much_competition
    /// 6) price_unstable
    /// 7) too_slow
    pub fn evaluate(&self, candidate: &Candidate) -> FilterVerdict {
        let c = &self.constraints;
        let mut failures = Vec::new();

        if candidate.brand_restricted || candidate.supplier_brand_restricted {
            failures.push(FilterReason::BrandRestricted);
        }

        if candidate.hazmat && c.avoid_hazmat {
            failures.push(FilterReason::Hazmat);
        }

        let priced = candidate.has_pricing_data(c.pricing_basis);
        if !priced {
            failures.push(FilterReason::NoPricingData);
        }

        if let (true, Some(min_roi)) = (priced, c.min_roi_pct) {
            if let Some(resolved) = candidate.economics(c.pricing_basis) {
                if resolved.economics.roi_pct < min_roi {
                    failures.push(FilterReason::RoiTooLow);
                }
            }
        }

        if let (Some(count), Some(max)) = (candidate.competitor_count, c.max_competitors) {
            if count > max {
                failures.push(FilterReason::TooMuchCompetition);
            }
        }

        if let (Some(ratio), Some(max)) = (candidate.volatility_ratio, c.max_volatility_ratio) {
            if ratio > max && !self.volatility_is_penalized() {
                failures.push(FilterReason::PriceUnstable);
            }
        }

        if let Some(max_days) = c.max_days_to_sell {
            if candidate.days_to_sell_one_pack() > max_days {
                failures.push(FilterReason::TooSlow);
            }
        }

        if !failures.is_empty() {
            debug!(product_id = %candidate.product_id, ?failures, "候选未通过过滤");
        }

        FilterVerdict::from_failures(&candidate.product_id, failures)
    }

    /// 批量评估（候选之间相互独立，并行执行，结果保持输入顺序）
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub fn evaluate_batch(&self, candidates: &[Candidate]) -> Vec<FilterVerdict> {
        candidates.par_iter().map(|c| self.evaluate(c)).collect()
    }
}
