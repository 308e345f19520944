// ==========================================
// 采购建议引擎 - 运行结果领域模型
// ==========================================
// 职责: 过滤判定 / 评分 / 选品 / 运行结果
// 红线: RunResult 创建后不可变，是唯一向下游交付的产物
// ==========================================

use crate::domain::constraint::ConstraintSet;
use crate::domain::goal::Goal;
use crate::domain::types::{FilterReason, UrgencyBand, VelocityTier};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// FilterVerdict - 过滤判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterVerdict {
    pub product_id: String,
    pub passed: bool,
    /// 全部未通过的规则（按评估顺序）
    pub failures: Vec<FilterReason>,
}

impl FilterVerdict {
    pub fn from_failures(product_id: &str, failures: Vec<FilterReason>) -> Self {
        Self {
            product_id: product_id.to_string(),
            passed: failures.is_empty(),
            failures,
        }
    }
}

// ==========================================
// Score - 综合评分
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub total: f64,         // 0..=100
    pub profitability: f64, // 0..=profitability 权重
    pub velocity: f64,      // 0..=velocity 权重
    pub competition: f64,   // 0..=competition 权重
    pub risk: f64,          // 0..=risk 权重
}

/// 解释生成器的输出
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Explanation {
    pub why_recommended: Vec<String>,
    pub warnings: Vec<String>,
}

// ==========================================
// Selection - 选中商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub product_id: String,
    pub title: String,
    pub quantity: u32,          // 包装单位的正整数倍
    pub pack_size: u32,
    pub unit_cost: Decimal,
    pub cost: Decimal,          // unit_cost × quantity
    pub projected_profit: Decimal, // net_profit × quantity
    pub score: f64,
    pub days_to_sell: f64,      // 按当前速度售完本次数量的天数
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub velocity_tier: Option<VelocityTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency_band: Option<UrgencyBand>,
    pub why_recommended: Vec<String>,
    pub warnings: Vec<String>,
}

// ==========================================
// 未入选（被过滤 / 评分后未选中）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcludedCandidate {
    pub product_id: String,
    pub title: String,
    pub reasons: Vec<FilterReason>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnselectedCandidate {
    pub product_id: String,
    pub title: String,
    pub score: Score,
    pub reason: String,
    pub why_recommended: Vec<String>,
    pub warnings: Vec<String>,
}

// ==========================================
// 汇总指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunCounts {
    pub total: usize,
    pub filtered_out: usize,
    pub scored: usize,
    pub selected: usize,
    pub unselected: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunTotals {
    pub total_cost: Decimal,
    pub total_projected_profit: Decimal,
    /// 总利润 / 总成本 × 100
    pub blended_roi_pct: Decimal,
    /// 按成本加权的平均售完天数
    pub avg_days_to_sell: f64,
}

/// 目标未达成（不是错误）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortfall {
    pub target: Decimal,
    pub achieved: Decimal,
    pub gap: Decimal,
    pub message: String,
}

/// 最后一件商品整包取整导致的超额花费
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overshoot {
    pub product_id: String,
    pub amount: Decimal,
}

// ==========================================
// RunResult - 运行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub reference_time: DateTime<Utc>,
    pub goal: Goal,
    pub constraints: ConstraintSet,
    pub counts: RunCounts,
    pub filtered_out: Vec<ExcludedCandidate>,
    pub unselected: Vec<UnselectedCandidate>,
    pub selections: Vec<Selection>,
    pub totals: RunTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortfall: Option<Shortfall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overshoot: Option<Overshoot>,
    pub warnings: Vec<String>,
}

impl RunResult {
    pub fn has_shortfall(&self) -> bool {
        self.shortfall.is_some()
    }

    pub fn selection(&self, product_id: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.product_id == product_id)
    }

    pub fn excluded(&self, product_id: &str) -> Option<&ExcludedCandidate> {
        self.filtered_out.iter().find(|e| e.product_id == product_id)
    }

    pub fn unselected(&self, product_id: &str) -> Option<&UnselectedCandidate> {
        self.unselected.iter().find(|u| u.product_id == product_id)
    }
}
