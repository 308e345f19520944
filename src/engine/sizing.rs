// ==========================================
// 采购建议引擎 - 数量取整与速度封顶
// ==========================================
// 红线: 数量必须是包装单位的正整数倍；
//       单品备货量不超过其自身速度在 max_days_of_stock 天内能消化的量
// ==========================================

use crate::config::SizingConfig;
use crate::domain::candidate::Candidate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

// ==========================================
// QuantitySizer - 三种目标共用的数量规则
// ==========================================
pub struct QuantitySizer {
    max_days_of_stock: f64,
    complete_final_pack: bool,
}

impl QuantitySizer {
    pub fn new(config: &SizingConfig) -> Self {
        Self {
            max_days_of_stock: config.max_days_of_stock,
            complete_final_pack: config.complete_final_pack,
        }
    }

    pub fn max_days_of_stock(&self) -> f64 {
        self.max_days_of_stock
    }

    pub fn complete_final_pack(&self) -> bool {
        self.complete_final_pack
    }

    /// 速度封顶（包数）: floor(日销量 × 备货天数 / 包装单位)
    pub fn cap_packs(&self, candidate: &Candidate) -> u32 {
        let units = candidate.daily_velocity() * self.max_days_of_stock;
        if !units.is_finite() || units <= 0.0 {
            return 0;
        }
        let packs = (units / candidate.effective_pack_size() as f64).floor();
        if packs >= u32::MAX as f64 {
            u32::MAX
        } else {
            packs as u32
        }
    }

    /// 在剩余额度内最多能买几包（向下取整）
    pub fn affordable_packs(&self, remaining: Decimal, pack_cost: Decimal) -> u32 {
        if remaining <= Decimal::ZERO || pack_cost <= Decimal::ZERO {
            return 0;
        }
        to_packs((remaining / pack_cost).floor())
    }

    /// 件数向上取整到包数
    pub fn units_to_packs_ceil(&self, units: f64, pack_size: u32) -> u32 {
        if !units.is_finite() || units <= 0.0 {
            return 0;
        }
        let packs = (units / pack_size.max(1) as f64).ceil();
        if packs >= u32::MAX as f64 {
            u32::MAX
        } else {
            packs as u32
        }
    }
}

fn to_packs(value: Decimal) -> u32 {
    value.to_u32().unwrap_or(u32::MAX)
}
