// ==========================================
// 采购建议引擎 - 候选商品领域模型
// ==========================================
// 职责: 单个商品-供应商关联的时点快照（单位经济性/需求/竞争/风险）
// 红线: 运行期内不可变，引擎只读
// ==========================================

use crate::domain::types::PricingBasis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 一个月按 30 天折算日销量
pub const DAYS_PER_MONTH: f64 = 30.0;

// ==========================================
// UnitEconomics - 单位经济性（上游已算好）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub sell_price: Decimal, // 单位售价
    pub net_profit: Decimal, // 单位净利（扣除费用后）
    pub roi_pct: Decimal,    // ROI（%）
}

// ==========================================
// Candidate - 候选商品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    // ===== 标识 =====
    pub product_id: String,
    #[serde(default)]
    pub title: String,

    // ===== 成本与经济性 =====
    #[serde(default)]
    pub unit_cost: Option<Decimal>,
    #[serde(default)]
    pub spot: Option<UnitEconomics>,
    #[serde(default)]
    pub trailing_average: Option<UnitEconomics>,

    // ===== 需求信号 =====
    #[serde(default)]
    pub monthly_velocity: Option<f64>, // 月销量（件）

    // ===== 竞争与风险 =====
    #[serde(default)]
    pub competitor_count: Option<u32>,
    #[serde(default)]
    pub volatility_ratio: Option<f64>, // 当前价 / 历史均价
    #[serde(default)]
    pub quality_signal: Option<f64>,   // 0..1，可选质量信号
    #[serde(default)]
    pub hazmat: bool,
    #[serde(default)]
    pub brand_restricted: bool,          // 全局品牌受限
    #[serde(default)]
    pub supplier_brand_restricted: bool, // 供应商级品牌受限

    // ===== 采购单位 =====
    #[serde(default = "default_pack_size")]
    pub pack_size: u32,

    // ===== 补货（仅补货目标使用） =====
    #[serde(default)]
    pub days_of_cover: Option<f64>,
}

fn default_pack_size() -> u32 {
    1
}

/// 解析后的定价口径（可能发生口径回退）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEconomics<'a> {
    pub economics: &'a UnitEconomics,
    pub basis: PricingBasis,
    pub fell_back: bool,
}

impl Candidate {
    /// 最小采购单位（0 视为 1）
    pub fn effective_pack_size(&self) -> u32 {
        self.pack_size.max(1)
    }

    /// 日销量；缺失/非法按 0 处理
    pub fn daily_velocity(&self) -> f64 {
        match self.monthly_velocity {
            Some(v) if v.is_finite() && v > 0.0 => v / DAYS_PER_MONTH,
            _ => 0.0,
        }
    }

    /// 按当前速度售出指定数量所需天数；无速度时为无穷大
    pub fn days_to_sell(&self, quantity: u32) -> f64 {
        let daily = self.daily_velocity();
        if daily <= 0.0 {
            return f64::INFINITY;
        }
        quantity as f64 / daily
    }

    /// 售出一包所需天数
    pub fn days_to_sell_one_pack(&self) -> f64 {
        self.days_to_sell(self.effective_pack_size())
    }

    pub fn has_identifier(&self) -> bool {
        !self.product_id.trim().is_empty()
    }

    /// 按定价口径解析单位经济性
    ///
    /// 规则:
    /// 1) 选定口径存在 → 使用选定口径
    /// 2) 选定口径缺失、另一口径存在 → 回退并标记 fell_back
    /// 3) 均缺失 → None
    pub fn economics(&self, basis: PricingBasis) -> Option<ResolvedEconomics<'_>> {
        let (preferred, fallback, fallback_basis) = match basis {
            PricingBasis::Spot => (&self.spot, &self.trailing_average, PricingBasis::TrailingAverage),
            PricingBasis::TrailingAverage => (&self.trailing_average, &self.spot, PricingBasis::Spot),
        };

        if let Some(economics) = preferred {
            return Some(ResolvedEconomics { economics, basis, fell_back: false });
        }
        fallback.as_ref().map(|economics| ResolvedEconomics {
            economics,
            basis: fallback_basis,
            fell_back: true,
        })
    }

    /// 是否具备可评分的定价数据
    pub fn has_pricing_data(&self, basis: PricingBasis) -> bool {
        let cost_ok = matches!(self.unit_cost, Some(cost) if cost > Decimal::ZERO);
        let price_ok = matches!(
            self.economics(basis),
            Some(resolved) if resolved.economics.sell_price > Decimal::ZERO
        );
        self.has_identifier() && cost_ok && price_ok
    }

    /// 一包的采购成本
    pub fn pack_cost(&self) -> Option<Decimal> {
        self.unit_cost.map(|cost| cost * Decimal::from(self.effective_pack_size()))
    }

    /// 是否缺少可选风险信号（用于解释"中性评分"）
    pub fn has_sparse_signals(&self) -> bool {
        self.competitor_count.is_none()
            || self.volatility_ratio.is_none()
            || self.quality_signal.is_none()
    }
}
