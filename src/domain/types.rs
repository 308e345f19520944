// ==========================================
// 采购建议引擎 - 领域类型定义
// ==========================================
// 职责: 封闭枚举（过滤原因/目标类型/定价口径/紧急等级/速度分层）
// 序列化格式: snake_case 标签字符串（与下游持久化/展示层约定一致）
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 过滤原因 (Filter Reason)
// ==========================================
// 红线: 集合固定，顺序即评估顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterReason {
    BrandRestricted,    // 品牌受限（全局或供应商级）
    Hazmat,             // 危险品且本次规避
    NoPricingData,      // 缺少标识/成本/价格数据（阻断评分）
    RoiTooLow,          // ROI 低于下限
    TooMuchCompetition, // 竞争卖家过多
    PriceUnstable,      // 价格波动比超限
    TooSlow,            // 售出一包所需天数超限
}

impl FilterReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterReason::BrandRestricted => "brand_restricted",
            FilterReason::Hazmat => "hazmat",
            FilterReason::NoPricingData => "no_pricing_data",
            FilterReason::RoiTooLow => "roi_too_low",
            FilterReason::TooMuchCompetition => "too_much_competition",
            FilterReason::PriceUnstable => "price_unstable",
            FilterReason::TooSlow => "too_slow",
        }
    }

    /// 面向用户的说明文本
    pub fn describe(&self) -> &'static str {
        match self {
            FilterReason::BrandRestricted => "Brand is restricted for this account or supplier",
            FilterReason::Hazmat => "Hazmat product excluded by constraints",
            FilterReason::NoPricingData => "Missing identifier, cost or pricing data",
            FilterReason::RoiTooLow => "ROI below the configured minimum",
            FilterReason::TooMuchCompetition => "Too many competing sellers",
            FilterReason::PriceUnstable => "Price volatility above the configured maximum",
            FilterReason::TooSlow => "Takes too long to sell one pack",
        }
    }
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 目标类型 (Goal Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    MeetBudget,
    HitProfitTarget,
    #[serde(rename = "restock_inventory")]
    Restock,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::MeetBudget => "meet_budget",
            GoalKind::HitProfitTarget => "hit_profit_target",
            GoalKind::Restock => "restock_inventory",
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GoalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "meet_budget" | "meet-budget" => Ok(GoalKind::MeetBudget),
            "hit_profit_target" | "hit-profit-target" => Ok(GoalKind::HitProfitTarget),
            "restock_inventory" | "restock-inventory" | "restock" => Ok(GoalKind::Restock),
            other => Err(format!("unknown goal type: {}", other)),
        }
    }
}

// ==========================================
// 定价口径 (Pricing Basis)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PricingBasis {
    #[default]
    Spot,            // 当前价
    TrailingAverage, // 历史均价
}

impl fmt::Display for PricingBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingBasis::Spot => write!(f, "spot"),
            PricingBasis::TrailingAverage => write!(f, "trailing_average"),
        }
    }
}

// ==========================================
// 补货目标下的价格波动处理策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityPolicy {
    #[default]
    Exclude,  // 硬过滤 price_unstable
    Penalize, // 仅在风险子分中扣分
}

// ==========================================
// 补货紧急等级 (Urgency Band)
// ==========================================
// 顺序: Critical > Urgent > Low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBand {
    Critical, // < 7 天
    Urgent,   // < 14 天
    Low,      // < 30 天
}

impl UrgencyBand {
    pub fn label(&self) -> &'static str {
        match self {
            UrgencyBand::Critical => "critical",
            UrgencyBand::Urgent => "urgent",
            UrgencyBand::Low => "low",
        }
    }
}

impl fmt::Display for UrgencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 速度分层 (Velocity Tier)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityTier {
    Fast,
    Medium,
    Slow,
}

impl VelocityTier {
    /// 固定遍历顺序（同时也是欠配平局时的优先顺序）
    pub const ALL: [VelocityTier; 3] = [VelocityTier::Fast, VelocityTier::Medium, VelocityTier::Slow];

    pub fn index(&self) -> usize {
        match self {
            VelocityTier::Fast => 0,
            VelocityTier::Medium => 1,
            VelocityTier::Slow => 2,
        }
    }
}

impl fmt::Display for VelocityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VelocityTier::Fast => write!(f, "fast"),
            VelocityTier::Medium => write!(f, "medium"),
            VelocityTier::Slow => write!(f, "slow"),
        }
    }
}
