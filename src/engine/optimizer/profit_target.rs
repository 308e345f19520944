// ==========================================
// 采购建议引擎 - 利润目标规划（HitProfitTarget）
// ==========================================
// 规则:
// 1) 候选按速度子分百分位分为 fast / medium / slow 三层
// 2) 每次加一包：选 花费/配比 最小的层（平局 fast → medium → slow），
//    取该层排名最高、未到速度封顶、且加一包后不超过花费上限的候选
// 3) 累计利润 >= 目标 → 停止；没有任何层还能加包 → 停止并给出 shortfall
// 红线: 配比为 0 的层不参与；花费永不超过 max_spend
// ==========================================

use crate::config::TierConfig;
use crate::domain::goal::TierMix;
use crate::domain::result::Shortfall;
use crate::domain::types::VelocityTier;
use crate::engine::optimizer::{money, OptimizationOutcome, Pick};
use crate::engine::scoring::ScoredCandidate;
use crate::engine::sizing::QuantitySizer;
use crate::engine::tiers::assign_velocity_tiers;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

pub struct ProfitTargetPlanner<'s> {
    sizer: &'s QuantitySizer,
    tiers: &'s TierConfig,
}

/// 单层的游标状态
struct TierLane {
    tier: VelocityTier,
    ratio: f64,
    ranks: Vec<usize>,
    cursor: usize,
    spend: Decimal,
}

impl<'s> ProfitTargetPlanner<'s> {
    pub fn new(sizer: &'s QuantitySizer, tiers: &'s TierConfig) -> Self {
        Self { sizer, tiers }
    }

    /// 按分层配比逐包加入，直到达到利润目标或花费上限
    #[instrument(skip(self, ranked, tier_mix), fields(
        candidates = ranked.len(),
        target_profit = %target_profit,
        max_spend = %max_spend
    ))]
    pub fn plan(
        &self,
        ranked: &[ScoredCandidate<'_>],
        target_profit: Decimal,
        max_spend: Decimal,
        tier_mix: &TierMix,
    ) -> OptimizationOutcome {
        let tiers = assign_velocity_tiers(ranked, self.tiers);
        let caps: Vec<u32> = ranked.iter().map(|s| self.sizer.cap_packs(s.candidate)).collect();
        let mut blocked: Vec<Option<&'static str>> = vec![None; ranked.len()];

        let mut lanes: Vec<TierLane> = VelocityTier::ALL
            .iter()
            .map(|tier| TierLane {
                tier: *tier,
                ratio: tier_mix.ratio(*tier),
                ranks: Vec::new(),
                cursor: 0,
                spend: Decimal::ZERO,
            })
            .collect();

        for (rank, scored) in ranked.iter().enumerate() {
            let lane = &mut lanes[tiers[rank].index()];
            if lane.ratio <= 0.0 {
                blocked[rank] = Some("Velocity tier excluded by the requested tier mix");
            } else if caps[rank] == 0 {
                blocked[rank] = Some("Sales velocity too low to absorb one pack");
            } else if scored.unit_profit <= Decimal::ZERO {
                blocked[rank] = Some("No projected profit per unit");
            } else {
                lane.ranks.push(rank);
            }
        }

        let mut packs: Vec<u32> = vec![0; ranked.len()];
        let mut order: Vec<usize> = Vec::new();
        let mut spend = Decimal::ZERO;
        let mut profit = Decimal::ZERO;

        while profit < target_profit {
            // 推进各层游标，跳过已封顶或已买不起的候选（花费只增不减，跳过后不会回退）
            for lane in lanes.iter_mut() {
                while let Some(&rank) = lane.ranks.get(lane.cursor) {
                    if packs[rank] >= caps[rank] {
                        lane.cursor += 1;
                    } else if spend + ranked[rank].pack_cost() > max_spend {
                        if packs[rank] == 0 {
                            blocked[rank] = Some("Pack cost exceeds the remaining spend ceiling");
                        }
                        lane.cursor += 1;
                    } else {
                        break;
                    }
                }
            }

            let next = lanes
                .iter()
                .enumerate()
                .filter(|(_, lane)| lane.cursor < lane.ranks.len())
                .map(|(idx, lane)| (idx, lane.spend.to_f64().unwrap_or(f64::MAX) / lane.ratio))
                .fold(None::<(usize, f64)>, |best, (idx, fill)| match best {
                    Some((_, best_fill)) if best_fill <= fill => best,
                    _ => Some((idx, fill)),
                });

            let Some((lane_idx, _)) = next else {
                break;
            };

            let lane = &mut lanes[lane_idx];
            let rank = lane.ranks[lane.cursor];
            let scored = &ranked[rank];
            if packs[rank] == 0 {
                order.push(rank);
            }
            packs[rank] += 1;
            lane.spend += scored.pack_cost();
            spend += scored.pack_cost();
            profit += scored.pack_profit();

            debug!(
                product_id = %scored.candidate.product_id,
                tier = %lane.tier,
                spend = %spend,
                profit = %profit,
                "加入一包"
            );
        }

        let mut outcome = OptimizationOutcome::default();
        let mix_total = tier_mix.fast + tier_mix.medium + tier_mix.slow;

        for &rank in &order {
            let scored = &ranked[rank];
            let tier = tiers[rank];
            let mut pick = Pick::new(rank, scored, packs[rank]);
            pick.velocity_tier = Some(tier);
            pick.notes.push(format!(
                "Drawn from the {} tier toward a {:.0}% share of spend",
                tier,
                tier_mix.ratio(tier) / mix_total * 100.0
            ));
            if packs[rank] >= caps[rank] {
                pick.warnings.push(format!(
                    "Quantity capped by sales velocity ({:.0} days of stock)",
                    self.sizer.max_days_of_stock()
                ));
            }
            outcome.picks.push(pick);
        }

        for rank in 0..ranked.len() {
            if packs[rank] > 0 {
                continue;
            }
            let reason = match blocked[rank] {
                Some(reason) => reason.to_string(),
                None if profit >= target_profit => {
                    "Profit target reached before this candidate was needed".to_string()
                }
                None => "Spend ceiling reached before this candidate was needed".to_string(),
            };
            outcome.skipped.push((rank, reason));
        }

        if profit < target_profit {
            let gap = target_profit - profit;
            let message = format!(
                "Projected profit {} is {} short of the {} target within the {} spend ceiling",
                money(profit),
                money(gap),
                money(target_profit),
                money(max_spend)
            );
            outcome.warnings.push(message.clone());
            outcome.shortfall = Some(Shortfall { target: target_profit, achieved: profit, gap, message });
        }

        outcome
    }
}
