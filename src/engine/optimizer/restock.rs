// ==========================================
// 采购建议引擎 - 补货规划（Restock）
// ==========================================
// 规则:
// 1) 只处理覆盖天数低于补货阈值的候选，按覆盖天数划分 critical / urgent / low
// 2) 优先级 = 综合分 × 紧急系数（稳定排序，同优先级保持原排名）
// 3) 需求量 = ceil((目标覆盖天数 - 当前覆盖天数) × 日销量)，向上取整到包，
//    再受速度封顶与剩余额度约束
// 4) 额度用尽仍有未满足需求 → shortfall
// ==========================================

use crate::config::RestockConfig;
use crate::domain::result::Shortfall;
use crate::domain::types::UrgencyBand;
use crate::engine::optimizer::{money, OptimizationOutcome, Pick};
use crate::engine::scoring::ScoredCandidate;
use crate::engine::sizing::QuantitySizer;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

pub struct RestockPlanner<'s> {
    sizer: &'s QuantitySizer,
    config: &'s RestockConfig,
}

/// 一条补货需求
struct ReorderNeed {
    rank: usize,
    band: UrgencyBand,
    days_of_cover: f64,
    priority: f64,
    /// 恢复到目标覆盖所需包数（已按速度封顶）
    packs: u32,
    velocity_capped: bool,
}

/// 覆盖天数对应的紧急等级；不低于补货阈值返回 None
pub fn urgency_band(days_of_cover: f64, config: &RestockConfig) -> Option<UrgencyBand> {
    if !days_of_cover.is_finite() || days_of_cover >= config.reorder_threshold_days {
        None
    } else if days_of_cover < config.critical_days {
        Some(UrgencyBand::Critical)
    } else if days_of_cover < config.urgent_days {
        Some(UrgencyBand::Urgent)
    } else {
        Some(UrgencyBand::Low)
    }
}

impl<'s> RestockPlanner<'s> {
    pub fn new(sizer: &'s QuantitySizer, config: &'s RestockConfig) -> Self {
        Self { sizer, config }
    }

    fn multiplier(&self, band: UrgencyBand) -> f64 {
        match band {
            UrgencyBand::Critical => self.config.critical_multiplier,
            UrgencyBand::Urgent => self.config.urgent_multiplier,
            UrgencyBand::Low => self.config.low_multiplier,
        }
    }

    /// 按 紧急度 × 综合分 依次补货，直到额度用尽
    #[instrument(skip(self, ranked), fields(candidates = ranked.len(), max_spend = %max_spend))]
    pub fn plan(&self, ranked: &[ScoredCandidate<'_>], max_spend: Decimal) -> OptimizationOutcome {
        let mut outcome = OptimizationOutcome::default();
        let mut needs: Vec<ReorderNeed> = Vec::new();

        for (rank, scored) in ranked.iter().enumerate() {
            let candidate = scored.candidate;
            let Some(days_of_cover) = candidate.days_of_cover else {
                outcome.skipped.push((rank, "No days-of-cover data".to_string()));
                continue;
            };
            let Some(band) = urgency_band(days_of_cover, self.config) else {
                outcome.skipped.push((rank, "Not below reorder threshold".to_string()));
                continue;
            };
            if candidate.daily_velocity() <= 0.0 {
                outcome.skipped.push((rank, "No sales velocity to size restock".to_string()));
                continue;
            }

            let cap = self.sizer.cap_packs(candidate);
            if cap == 0 {
                outcome.skipped.push((rank, "Sales velocity too low to absorb one pack".to_string()));
                continue;
            }

            let missing_days = (self.config.target_cover_days - days_of_cover.max(0.0)).max(0.0);
            let units = (missing_days * candidate.daily_velocity()).ceil();
            let wanted = self.sizer.units_to_packs_ceil(units, scored.pack_size()).max(1);

            needs.push(ReorderNeed {
                rank,
                band,
                days_of_cover,
                priority: scored.score.total * self.multiplier(band),
                packs: wanted.min(cap),
                velocity_capped: wanted > cap,
            });
        }

        // 稳定排序：同优先级保持综合排名顺序
        needs.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        let mut spent = Decimal::ZERO;
        let mut needed_cost = Decimal::ZERO;
        let mut unmet = 0usize;

        for need in &needs {
            let scored = &ranked[need.rank];
            let pack_cost = scored.pack_cost();
            needed_cost += pack_cost * Decimal::from(need.packs);

            let affordable = self.sizer.affordable_packs(max_spend - spent, pack_cost);
            let packs = need.packs.min(affordable);
            if packs == 0 {
                unmet += 1;
                outcome.skipped.push((need.rank, "Budget exhausted before this reorder".to_string()));
                continue;
            }

            let mut pick = Pick::new(need.rank, scored, packs);
            pick.urgency_band = Some(need.band);
            pick.notes.push(format!(
                "{} restock: {:.1} days of cover, restoring toward {:.0} days",
                capitalize(need.band.label()),
                need.days_of_cover,
                self.config.target_cover_days
            ));
            if need.velocity_capped {
                pick.warnings.push(format!(
                    "Quantity capped by sales velocity ({:.0} days of stock)",
                    self.sizer.max_days_of_stock()
                ));
            }
            if packs < need.packs {
                unmet += 1;
                pick.warnings.push(format!(
                    "Partial restock: {} of {} packs fit the remaining budget",
                    packs, need.packs
                ));
            }

            spent += pick.cost;
            debug!(
                product_id = %scored.candidate.product_id,
                band = %need.band,
                priority = need.priority,
                quantity = pick.quantity,
                spent = %spent,
                "补货"
            );
            outcome.picks.push(pick);
        }

        if unmet > 0 {
            let gap = needed_cost - spent;
            let message = format!(
                "Budget of {} covers {} of {} in reorder needs; {} products not fully restocked",
                money(max_spend),
                money(spent),
                money(needed_cost),
                unmet
            );
            outcome.warnings.push(message.clone());
            outcome.shortfall = Some(Shortfall { target: needed_cost, achieved: spent, gap, message });
        }

        outcome
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
