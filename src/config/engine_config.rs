// ==========================================
// 采购建议引擎 - 运行配置
// ==========================================
// 职责: 评分权重 / 速度分层阈值 / 备货上限 / 补货阈值 / 解释阈值
// 红线: 按次传入，不读取进程级共享可变状态
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 评分权重（合计必须为 100）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_profitability_weight")]
    pub profitability: f64,
    #[serde(default = "default_velocity_weight")]
    pub velocity: f64,
    #[serde(default = "default_competition_weight")]
    pub competition: f64,
    #[serde(default = "default_risk_weight")]
    pub risk: f64,
}

fn default_profitability_weight() -> f64 {
    40.0
}
fn default_velocity_weight() -> f64 {
    30.0
}
fn default_competition_weight() -> f64 {
    15.0
}
fn default_risk_weight() -> f64 {
    15.0
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            profitability: default_profitability_weight(),
            velocity: default_velocity_weight(),
            competition: default_competition_weight(),
            risk: default_risk_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.profitability + self.velocity + self.competition + self.risk
    }
}

/// 评分曲线参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,

    /// 高 ROI 上限（%），超过后盈利子分封顶
    pub roi_ceiling_pct: f64,

    /// ROI 曲线弯曲度（越大边际递减越明显）
    pub roi_curve_k: f64,

    /// ROI 曲线在盈利子分中的占比（其余为单位净利）
    pub roi_share: f64,

    /// 单位净利达到该值时净利部分得一半
    pub profit_half_point: f64,

    /// 月销量达到该值时销量部分得一半
    pub velocity_half_point: f64,

    /// 售出一包天数的半衰点
    pub days_to_sell_half_point: f64,

    /// 月销量在速度子分中的占比（其余为售出天数）
    pub units_share: f64,

    /// 竞争卖家数达到该值时竞争子分得一半
    pub competition_half_point: f64,

    /// 波动比偏离 1 达到该值时稳定性为 0
    pub volatility_tolerance: f64,

    /// 价格稳定性在风险子分中的占比（其余为质量信号）
    pub stability_share: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            roi_ceiling_pct: 150.0,
            roi_curve_k: 3.0,
            roi_share: 0.7,
            profit_half_point: 5.0,
            velocity_half_point: 30.0,
            days_to_sell_half_point: 7.0,
            units_share: 0.6,
            competition_half_point: 5.0,
            volatility_tolerance: 0.5,
            stability_share: 0.7,
        }
    }
}

/// 速度分层阈值（按速度子分的百分位）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// 百分位 >= 该值为 fast
    pub fast_percentile: f64,
    /// 百分位 >= 该值为 medium，否则 slow
    pub medium_percentile: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self { fast_percentile: 0.70, medium_percentile: 0.30 }
    }
}

/// 数量取整与速度封顶
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// 单个商品最多备几天的货（按当前速度）
    pub max_days_of_stock: f64,
    /// MeetBudget 未达目标时，允许最后入选商品再补一整包（超出部分作为 overshoot 报告）
    pub complete_final_pack: bool,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self { max_days_of_stock: 60.0, complete_final_pack: false }
    }
}

/// 补货目标参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestockConfig {
    pub reorder_threshold_days: f64, // 低于该覆盖天数才需要补货（low 上界）
    pub critical_days: f64,
    pub urgent_days: f64,
    pub target_cover_days: f64,      // 补货后恢复到的覆盖天数
    pub critical_multiplier: f64,
    pub urgent_multiplier: f64,
    pub low_multiplier: f64,
}

impl Default for RestockConfig {
    fn default() -> Self {
        Self {
            reorder_threshold_days: 30.0,
            critical_days: 7.0,
            urgent_days: 14.0,
            target_cover_days: 45.0,
            critical_multiplier: 3.0,
            urgent_multiplier: 2.0,
            low_multiplier: 1.0,
        }
    }
}

/// 解释规则阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationConfig {
    /// 子分 >= 权重 × 该比例时输出正面标签
    pub top_tier_ratio: f64,
    /// 子分 <= 权重 × 该比例时输出负面提示
    pub bottom_tier_ratio: f64,
    /// 波动比 >= 该值视为近期价格飙升
    pub spike_ratio: f64,
    /// 覆盖天数高于补货阈值但在该裕量内，提示接近补货点
    pub near_reorder_margin_days: f64,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self {
            top_tier_ratio: 0.75,
            bottom_tier_ratio: 0.25,
            spike_ratio: 1.2,
            near_reorder_margin_days: 7.0,
        }
    }
}

// ==========================================
// EngineConfig - 单次运行的完整配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub tiers: TierConfig,
    pub sizing: SizingConfig,
    pub restock: RestockConfig,
    pub explanation: ExplanationConfig,
}

impl EngineConfig {
    /// 从 JSON 字符串加载（缺省字段使用默认值）
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// 从 JSON 文件加载
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// 配置校验
    ///
    /// # 返回
    /// - Ok(()): 配置可用
    /// - Err(String): 第一个不合法项的说明
    pub fn validate(&self) -> Result<(), String> {
        let w = &self.scoring.weights;
        let parts = [w.profitability, w.velocity, w.competition, w.risk];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(format!("scoring weights must be non-negative, got {:?}", parts));
        }
        if (w.sum() - 100.0).abs() > 1e-6 {
            return Err(format!("scoring weights must sum to 100, got {}", w.sum()));
        }

        let s = &self.scoring;
        let positives = [
            ("roi_ceiling_pct", s.roi_ceiling_pct),
            ("roi_curve_k", s.roi_curve_k),
            ("profit_half_point", s.profit_half_point),
            ("velocity_half_point", s.velocity_half_point),
            ("days_to_sell_half_point", s.days_to_sell_half_point),
            ("competition_half_point", s.competition_half_point),
            ("volatility_tolerance", s.volatility_tolerance),
            ("max_days_of_stock", self.sizing.max_days_of_stock),
            ("target_cover_days", self.restock.target_cover_days),
        ];
        for (name, value) in positives {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{} must be positive, got {}", name, value));
            }
        }

        for (name, share) in [
            ("roi_share", s.roi_share),
            ("units_share", s.units_share),
            ("stability_share", s.stability_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(format!("{} must be within [0, 1], got {}", name, share));
            }
        }

        let t = &self.tiers;
        if !(0.0..=1.0).contains(&t.fast_percentile)
            || !(0.0..=1.0).contains(&t.medium_percentile)
            || t.medium_percentile > t.fast_percentile
        {
            return Err(format!(
                "tier percentiles must satisfy 0 <= medium <= fast <= 1, got medium={} fast={}",
                t.medium_percentile, t.fast_percentile
            ));
        }

        let r = &self.restock;
        if !(0.0 < r.critical_days
            && r.critical_days <= r.urgent_days
            && r.urgent_days <= r.reorder_threshold_days)
        {
            return Err(format!(
                "restock bands must satisfy 0 < critical <= urgent <= reorder, got {}/{}/{}",
                r.critical_days, r.urgent_days, r.reorder_threshold_days
            ));
        }
        if [r.critical_multiplier, r.urgent_multiplier, r.low_multiplier]
            .iter()
            .any(|m| !m.is_finite() || *m <= 0.0)
        {
            return Err("restock urgency multipliers must be positive".to_string());
        }

        Ok(())
    }
}
