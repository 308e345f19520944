// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{DateTime, TimeZone, Utc};
use purchase_advisor::domain::{Candidate, UnitEconomics};
use purchase_advisor::engine::RunContext;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ==========================================
// Candidate 构建器
// ==========================================
// 默认: 成本 $10，spot 售价 $25、净利 $5（ROI 50%），
//       月销 60 件，3 个竞争卖家，价格稳定，质量 0.8，单件包装
pub struct CandidateBuilder {
    candidate: Candidate,
}

impl CandidateBuilder {
    pub fn new(product_id: &str) -> Self {
        Self {
            candidate: Candidate {
                product_id: product_id.to_string(),
                title: format!("Item {}", product_id),
                unit_cost: Some(dec!(10)),
                spot: Some(UnitEconomics {
                    sell_price: dec!(25),
                    net_profit: dec!(5),
                    roi_pct: dec!(50),
                }),
                trailing_average: None,
                monthly_velocity: Some(60.0),
                competitor_count: Some(3),
                volatility_ratio: Some(1.0),
                quality_signal: Some(0.8),
                hazmat: false,
                brand_restricted: false,
                supplier_brand_restricted: false,
                pack_size: 1,
                days_of_cover: None,
            },
        }
    }

    pub fn unit_cost(mut self, cost: Decimal) -> Self {
        self.candidate.unit_cost = Some(cost);
        self
    }

    pub fn no_unit_cost(mut self) -> Self {
        self.candidate.unit_cost = None;
        self
    }

    /// 按 ROI 设置 spot 经济性（净利 = 成本 × ROI）
    pub fn roi(mut self, roi_pct: Decimal) -> Self {
        let cost = self.candidate.unit_cost.unwrap_or(dec!(10));
        let net_profit = cost * roi_pct / dec!(100);
        self.candidate.spot = Some(UnitEconomics {
            sell_price: cost * dec!(2) + net_profit,
            net_profit,
            roi_pct,
        });
        self
    }

    pub fn spot(mut self, sell_price: Decimal, net_profit: Decimal, roi_pct: Decimal) -> Self {
        self.candidate.spot = Some(UnitEconomics { sell_price, net_profit, roi_pct });
        self
    }

    pub fn no_spot(mut self) -> Self {
        self.candidate.spot = None;
        self
    }

    pub fn trailing(mut self, sell_price: Decimal, net_profit: Decimal, roi_pct: Decimal) -> Self {
        self.candidate.trailing_average = Some(UnitEconomics { sell_price, net_profit, roi_pct });
        self
    }

    pub fn velocity(mut self, monthly_units: f64) -> Self {
        self.candidate.monthly_velocity = Some(monthly_units);
        self
    }

    pub fn no_velocity(mut self) -> Self {
        self.candidate.monthly_velocity = None;
        self
    }

    pub fn competitors(mut self, count: u32) -> Self {
        self.candidate.competitor_count = Some(count);
        self
    }

    pub fn no_competitor_data(mut self) -> Self {
        self.candidate.competitor_count = None;
        self
    }

    pub fn volatility(mut self, ratio: f64) -> Self {
        self.candidate.volatility_ratio = Some(ratio);
        self
    }

    pub fn no_volatility_data(mut self) -> Self {
        self.candidate.volatility_ratio = None;
        self
    }

    pub fn quality(mut self, signal: f64) -> Self {
        self.candidate.quality_signal = Some(signal);
        self
    }

    pub fn hazmat(mut self) -> Self {
        self.candidate.hazmat = true;
        self
    }

    pub fn brand_restricted(mut self) -> Self {
        self.candidate.brand_restricted = true;
        self
    }

    pub fn supplier_brand_restricted(mut self) -> Self {
        self.candidate.supplier_brand_restricted = true;
        self
    }

    pub fn pack_size(mut self, size: u32) -> Self {
        self.candidate.pack_size = size;
        self
    }

    pub fn days_of_cover(mut self, days: f64) -> Self {
        self.candidate.days_of_cover = Some(days);
        self
    }

    pub fn build(self) -> Candidate {
        self.candidate
    }
}

/// 固定参考时间（保证重复运行结果一致）
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
}

pub fn fixed_context() -> RunContext {
    RunContext::new(reference_time())
}

/// 一组混合候选（不同 ROI / 速度 / 包装）
pub fn mixed_pool() -> Vec<Candidate> {
    vec![
        CandidateBuilder::new("P01").roi(dec!(80)).velocity(120.0).competitors(1).build(),
        CandidateBuilder::new("P02").roi(dec!(45)).velocity(40.0).pack_size(4).build(),
        CandidateBuilder::new("P03").unit_cost(dec!(6)).roi(dec!(120)).velocity(15.0).pack_size(6).build(),
        CandidateBuilder::new("P04").roi(dec!(30)).velocity(200.0).competitors(9).build(),
        CandidateBuilder::new("P05").unit_cost(dec!(22)).roi(dec!(60)).velocity(25.0).pack_size(2).build(),
        CandidateBuilder::new("P06").roi(dec!(95)).velocity(8.0).no_competitor_data().build(),
        CandidateBuilder::new("P07").roi(dec!(10)).velocity(90.0).build(),
        CandidateBuilder::new("P08").roi(dec!(70)).velocity(60.0).hazmat().build(),
        CandidateBuilder::new("P09").unit_cost(dec!(3)).roi(dec!(40)).velocity(300.0).pack_size(12).build(),
        CandidateBuilder::new("P10").roi(dec!(55)).velocity(2.0).pack_size(10).build(),
    ]
}
