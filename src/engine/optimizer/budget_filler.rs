// ==========================================
// 采购建议引擎 - 预算填充（MeetBudget）
// ==========================================
// 规则:
// 1) 按排序依次处理候选
// 2) 取满足 累计花费 <= 目标 的最大整包数（向下取整），受速度封顶约束
// 3) 一包都放不下的候选跳过，继续尝试排名更低的候选
// 4) 累计花费达到目标即停止；候选用尽仍未达到 → shortfall
// 5) complete_final_pack 开启时，未达目标则给最后入选商品再补一整包，
//    超出部分（小于一包）作为 overshoot 报告
// ==========================================

use crate::domain::result::{Overshoot, Shortfall};
use crate::engine::optimizer::{money, OptimizationOutcome, Pick};
use crate::engine::scoring::ScoredCandidate;
use crate::engine::sizing::QuantitySizer;
use rust_decimal::Decimal;
use tracing::{debug, instrument};

pub struct BudgetFiller<'s> {
    sizer: &'s QuantitySizer,
}

impl<'s> BudgetFiller<'s> {
    pub fn new(sizer: &'s QuantitySizer) -> Self {
        Self { sizer }
    }

    /// 贪心填充预算
    ///
    /// # 参数
    /// - `ranked`: 已排序候选
    /// - `target_spend`: 目标花费
    #[instrument(skip(self, ranked), fields(candidates = ranked.len(), target_spend = %target_spend))]
    pub fn fill(&self, ranked: &[ScoredCandidate<'_>], target_spend: Decimal) -> OptimizationOutcome {
        let mut outcome = OptimizationOutcome::default();
        let mut spent = Decimal::ZERO;

        for (rank, scored) in ranked.iter().enumerate() {
            if spent >= target_spend {
                outcome.skipped.push((rank, "Budget already met by higher-ranked products".to_string()));
                continue;
            }

            let cap = self.sizer.cap_packs(scored.candidate);
            if cap == 0 {
                outcome.skipped.push((rank, "Sales velocity too low to absorb one pack".to_string()));
                continue;
            }

            let affordable = self.sizer.affordable_packs(target_spend - spent, scored.pack_cost());
            if affordable == 0 {
                outcome.skipped.push((rank, "Pack cost exceeds the remaining budget".to_string()));
                continue;
            }
            let packs = cap.min(affordable);

            let mut pick = Pick::new(rank, scored, packs);
            pick.notes.push(format!(
                "Fills {} of the {} budget",
                money(pick.cost),
                money(target_spend)
            ));
            if cap < affordable {
                pick.warnings.push(format!(
                    "Quantity capped by sales velocity ({:.0} days of stock)",
                    self.sizer.max_days_of_stock()
                ));
            }

            spent += pick.cost;
            debug!(
                product_id = %scored.candidate.product_id,
                quantity = pick.quantity,
                cost = %pick.cost,
                spent = %spent,
                "预算填充"
            );
            outcome.picks.push(pick);
        }

        if spent < target_spend && self.sizer.complete_final_pack() {
            spent += self.complete_final_pack(ranked, &mut outcome, target_spend - spent);
        }

        if spent < target_spend {
            let gap = target_spend - spent;
            let message = format!(
                "Eligible products exhausted: planned spend {} is {} short of the {} target",
                money(spent),
                money(gap),
                money(target_spend)
            );
            outcome.warnings.push(message.clone());
            outcome.shortfall = Some(Shortfall { target: target_spend, achieved: spent, gap, message });
        }

        outcome
    }

    /// 最后入选商品再补一包（仅当其未被速度封顶）
    ///
    /// # 返回
    /// 追加的花费；不满足条件时为 0
    fn complete_final_pack(
        &self,
        ranked: &[ScoredCandidate<'_>],
        outcome: &mut OptimizationOutcome,
        gap: Decimal,
    ) -> Decimal {
        let Some(pick) = outcome.picks.last_mut() else {
            return Decimal::ZERO;
        };
        let scored = &ranked[pick.rank];
        let packs = pick.quantity / scored.pack_size();
        if packs >= self.sizer.cap_packs(scored.candidate) {
            return Decimal::ZERO;
        }

        let pack_cost = scored.pack_cost();
        let amount = pack_cost - gap;
        pick.quantity += scored.pack_size();
        pick.cost += pack_cost;
        pick.projected_profit += scored.pack_profit();
        pick.warnings.push(format!(
            "Final pack rounding exceeds target spend by {}",
            money(amount)
        ));

        let product_id = scored.candidate.product_id.clone();
        outcome.warnings.push(format!(
            "Spend exceeds target by {} to complete a full pack of {}",
            money(amount),
            product_id
        ));
        outcome.overshoot = Some(Overshoot { product_id, amount });
        pack_cost
    }
}
