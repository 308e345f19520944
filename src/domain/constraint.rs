// ==========================================
// 采购建议引擎 - 约束集
// ==========================================
// 红线: 单次运行内只读
// ==========================================

use crate::domain::types::{PricingBasis, VolatilityPolicy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 硬约束集合（过滤引擎的输入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConstraintSet {
    /// 最低 ROI（%）
    #[serde(default)]
    pub min_roi_pct: Option<Decimal>,

    /// 最多竞争卖家数
    #[serde(default)]
    pub max_competitors: Option<u32>,

    /// 最大价格波动比（当前价 / 历史均价）
    #[serde(default)]
    pub max_volatility_ratio: Option<f64>,

    /// 是否规避危险品
    #[serde(default)]
    pub avoid_hazmat: bool,

    /// 定价口径
    #[serde(default)]
    pub pricing_basis: PricingBasis,

    /// 售出一包的最长天数（可选）
    #[serde(default)]
    pub max_days_to_sell: Option<f64>,

    /// 补货目标下价格波动超限的处理方式
    #[serde(default)]
    pub restock_volatility_policy: VolatilityPolicy,
}

impl ConstraintSet {
    /// 结构校验（非法阈值视为结构性输入错误）
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ratio) = self.max_volatility_ratio {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(format!("max_volatility_ratio must be positive, got {}", ratio));
            }
        }
        if let Some(days) = self.max_days_to_sell {
            if !days.is_finite() || days <= 0.0 {
                return Err(format!("max_days_to_sell must be positive, got {}", days));
            }
        }
        Ok(())
    }
}
