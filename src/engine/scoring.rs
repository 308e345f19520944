// ==========================================
// 采购建议引擎 - 综合评分引擎
// ==========================================
// 职责: 对通过过滤的候选计算 0~100 综合分（四个加权子分）
// 红线: 每个子分不超过其权重；可选信号缺失取中性中点而不是 0
// ==========================================

use crate::config::ScoringConfig;
use crate::domain::candidate::Candidate;
use crate::domain::constraint::ConstraintSet;
use crate::domain::result::Score;
use crate::domain::types::PricingBasis;
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::instrument;

/// 可选信号缺失时使用的中性值
const NEUTRAL: f64 = 0.5;

// ==========================================
// ScoredCandidate - 评分后的候选（优化器输入）
// ==========================================
#[derive(Debug, Clone)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    pub score: Score,
    pub unit_cost: Decimal,
    pub unit_profit: Decimal,
    pub basis: PricingBasis,
    pub basis_fell_back: bool,
}

impl<'a> ScoredCandidate<'a> {
    pub fn pack_size(&self) -> u32 {
        self.candidate.effective_pack_size()
    }

    pub fn pack_cost(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.pack_size())
    }

    pub fn pack_profit(&self) -> Decimal {
        self.unit_profit * Decimal::from(self.pack_size())
    }

    pub fn days_to_sell_one_pack(&self) -> f64 {
        self.candidate.days_to_sell_one_pack()
    }
}

// ==========================================
// ScoringEngine - 评分引擎
// ==========================================
pub struct ScoringEngine {
    config: ScoringConfig,
    pricing_basis: PricingBasis,
    roi_floor_pct: f64,
    /// 波动超限仅扣分时的阈值（补货 + Penalize 策略）
    penalize_volatility_above: Option<f64>,
}

impl ScoringEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - `config`: 评分曲线与权重
    /// - `constraints`: 约束集（ROI 下限即盈利曲线起点）
    /// - `penalize_volatility`: 是否将波动超限折算为风险扣分
    pub fn new(config: &ScoringConfig, constraints: &ConstraintSet, penalize_volatility: bool) -> Self {
        let roi_floor_pct = constraints
            .min_roi_pct
            .and_then(|d| d.to_f64())
            .unwrap_or(0.0);
        let penalize_volatility_above = if penalize_volatility {
            constraints.max_volatility_ratio
        } else {
            None
        };

        Self {
            config: config.clone(),
            pricing_basis: constraints.pricing_basis,
            roi_floor_pct,
            penalize_volatility_above,
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 计算单个候选的综合分
    pub fn score(&self, candidate: &Candidate) -> Score {
        let w = &self.config.weights;

        let profitability = self.profitability_score(candidate).clamp(0.0, w.profitability);
        let velocity = self.velocity_score(candidate).clamp(0.0, w.velocity);
        let competition = self.competition_score(candidate).clamp(0.0, w.competition);
        let risk = self.risk_score(candidate).clamp(0.0, w.risk);

        let total = (profitability + velocity + competition + risk).clamp(0.0, 100.0);

        Score { total, profitability, velocity, competition, risk }
    }

    /// 评分并附带单位经济性（供排序/优化使用）
    ///
    /// 定价数据缺失时返回 None（正常情况下已被过滤引擎拦截）
    pub fn score_candidate<'a>(&self, candidate: &'a Candidate) -> Option<ScoredCandidate<'a>> {
        let resolved = candidate.economics(self.pricing_basis)?;
        let unit_cost = candidate.unit_cost?;
        Some(ScoredCandidate {
            candidate,
            score: self.score(candidate),
            unit_cost,
            unit_profit: resolved.economics.net_profit,
            basis: resolved.basis,
            basis_fell_back: resolved.fell_back,
        })
    }

    /// 批量评分（并行，保持输入顺序）
    #[instrument(skip(self, candidates), fields(count = candidates.len()))]
    pub fn score_batch<'a>(&self, candidates: &[&'a Candidate]) -> Vec<ScoredCandidate<'a>> {
        candidates
            .par_iter()
            .filter_map(|c| self.score_candidate(*c))
            .collect()
    }

    // ==========================================
    // 子分计算
    // ==========================================

    /// 盈利子分: ROI 边际递减曲线 + 单位净利饱和曲线
    fn profitability_score(&self, candidate: &Candidate) -> f64 {
        let cfg = &self.config;
        let resolved = match candidate.economics(self.pricing_basis) {
            Some(r) => r,
            None => return 0.0,
        };

        let roi = resolved.economics.roi_pct.to_f64().unwrap_or(0.0);
        let ceiling = cfg.roi_ceiling_pct.max(self.roi_floor_pct + 1.0);
        let x = ((roi - self.roi_floor_pct) / (ceiling - self.roi_floor_pct)).clamp(0.0, 1.0);
        let k = cfg.roi_curve_k;
        let roi_part = (1.0 - (-k * x).exp()) / (1.0 - (-k).exp());

        let profit = resolved.economics.net_profit.to_f64().unwrap_or(0.0).max(0.0);
        let profit_part = saturate(profit, cfg.profit_half_point);

        cfg.weights.profitability * (cfg.roi_share * roi_part + (1.0 - cfg.roi_share) * profit_part)
    }

    /// 速度子分: 月销量饱和曲线 + 售出一包天数的倒数
    fn velocity_score(&self, candidate: &Candidate) -> f64 {
        let cfg = &self.config;
        let units = candidate.monthly_velocity.filter(|v| v.is_finite()).unwrap_or(0.0).max(0.0);
        let units_part = saturate(units, cfg.velocity_half_point);

        let days = candidate.days_to_sell_one_pack();
        let speed_part = if days.is_finite() {
            1.0 / (1.0 + days / cfg.days_to_sell_half_point)
        } else {
            0.0
        };

        cfg.weights.velocity * (cfg.units_share * units_part + (1.0 - cfg.units_share) * speed_part)
    }

    /// 竞争子分: 无竞争卖家得满分
    fn competition_score(&self, candidate: &Candidate) -> f64 {
        let cfg = &self.config;
        let part = match candidate.competitor_count {
            Some(n) => {
                let h = cfg.competition_half_point;
                h / (h + n as f64)
            }
            None => NEUTRAL,
        };
        cfg.weights.competition * part
    }

    /// 风险子分: 价格稳定性 + 可选质量信号
    fn risk_score(&self, candidate: &Candidate) -> f64 {
        let cfg = &self.config;

        let stability = match candidate.volatility_ratio {
            Some(ratio) if ratio.is_finite() => {
                if matches!(self.penalize_volatility_above, Some(max) if ratio > max) {
                    0.0
                } else {
                    (1.0 - (ratio - 1.0).abs() / cfg.volatility_tolerance).clamp(0.0, 1.0)
                }
            }
            _ => NEUTRAL,
        };

        let quality = match candidate.quality_signal {
            Some(q) if q.is_finite() => q.clamp(0.0, 1.0),
            _ => NEUTRAL,
        };

        cfg.weights.risk * (cfg.stability_share * stability + (1.0 - cfg.stability_share) * quality)
    }
}

/// x / (x + half)，x=half 时为 0.5
fn saturate(x: f64, half: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    x / (x + half)
}
