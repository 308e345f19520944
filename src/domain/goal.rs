// ==========================================
// 采购建议引擎 - 采购目标
// ==========================================
// 红线: 三种目标的封闭枚举，不做插件式扩展
// ==========================================

use crate::domain::types::{GoalKind, VelocityTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 速度分层配比（按花费占比）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMix {
    pub fast: f64,
    pub medium: f64,
    pub slow: f64,
}

impl Default for TierMix {
    fn default() -> Self {
        Self { fast: 0.6, medium: 0.3, slow: 0.1 }
    }
}

impl TierMix {
    pub fn ratio(&self, tier: VelocityTier) -> f64 {
        match tier {
            VelocityTier::Fast => self.fast,
            VelocityTier::Medium => self.medium,
            VelocityTier::Slow => self.slow,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let parts = [self.fast, self.medium, self.slow];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(format!("tier_mix ratios must be non-negative, got {:?}", parts));
        }
        if parts.iter().sum::<f64>() <= 0.0 {
            return Err("tier_mix ratios must not all be zero".to_string());
        }
        Ok(())
    }
}

/// 采购目标（每次运行恰好一个）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    MeetBudget {
        target_spend: Decimal,
    },
    HitProfitTarget {
        target_profit: Decimal,
        max_spend: Decimal,
        #[serde(default)]
        tier_mix: TierMix,
    },
    #[serde(rename = "restock_inventory")]
    Restock {
        max_spend: Decimal,
    },
}

impl Goal {
    pub fn kind(&self) -> GoalKind {
        match self {
            Goal::MeetBudget { .. } => GoalKind::MeetBudget,
            Goal::HitProfitTarget { .. } => GoalKind::HitProfitTarget,
            Goal::Restock { .. } => GoalKind::Restock,
        }
    }

    /// 花费上限（MeetBudget 的目标花费即上限）
    pub fn spend_ceiling(&self) -> Decimal {
        match self {
            Goal::MeetBudget { target_spend } => *target_spend,
            Goal::HitProfitTarget { max_spend, .. } => *max_spend,
            Goal::Restock { max_spend } => *max_spend,
        }
    }

    /// 结构校验
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Goal::MeetBudget { target_spend } => {
                if *target_spend <= Decimal::ZERO {
                    return Err(format!("target_spend must be positive, got {}", target_spend));
                }
            }
            Goal::HitProfitTarget { target_profit, max_spend, tier_mix } => {
                if *target_profit <= Decimal::ZERO {
                    return Err(format!("target_profit must be positive, got {}", target_profit));
                }
                if *max_spend <= Decimal::ZERO {
                    return Err(format!("max_spend must be positive, got {}", max_spend));
                }
                tier_mix.validate()?;
            }
            Goal::Restock { max_spend } => {
                if *max_spend <= Decimal::ZERO {
                    return Err(format!("max_spend must be positive, got {}", max_spend));
                }
            }
        }
        Ok(())
    }
}
