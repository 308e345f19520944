// ==========================================
// 采购建议引擎 - 运行编排器
// ==========================================
// 用途: 按 过滤 → 评分 → 排序 → 选品 → 解释 → 汇总 的顺序执行一次运行
// 红线: 只有结构性输入错误会返回 Err；单品问题折叠为过滤失败，
//       目标不可达折叠为 shortfall
// ==========================================

use crate::config::EngineConfig;
use crate::domain::candidate::Candidate;
use crate::domain::constraint::ConstraintSet;
use crate::domain::goal::Goal;
use crate::domain::result::{
    ExcludedCandidate, RunCounts, RunResult, RunTotals, Selection, UnselectedCandidate,
};
use crate::engine::control::RunControl;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::explanation::ExplanationGenerator;
use crate::engine::filter::FilterEngine;
use crate::engine::optimizer::{OptimizationOutcome, Optimizer, Pick};
use crate::engine::ranking::RankingSorter;
use crate::engine::scoring::{ScoredCandidate, ScoringEngine};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 评分后未入选且优化器没有给出原因时的默认说明
const DEFAULT_UNSELECTED_REASON: &str = "Goal satisfied before this candidate was needed";

// ==========================================
// RunContext - 单次运行的外部上下文
// ==========================================
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Option<Uuid>,
    pub reference_time: DateTime<Utc>,
    pub control: RunControl,
}

impl RunContext {
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        Self { run_id: None, reference_time, control: RunControl::new() }
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = control;
        self
    }
}

// ==========================================
// RunOrchestrator - 运行编排器
// ==========================================
pub struct RunOrchestrator {
    config: EngineConfig,
    sorter: RankingSorter,
}

impl RunOrchestrator {
    /// 创建编排器（配置按次传入，不读取全局状态）
    pub fn new(config: EngineConfig) -> Self {
        Self { config, sorter: RankingSorter::new() }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 以当前时间为参考时间执行一次运行
    pub fn run(
        &self,
        candidates: &[Candidate],
        goal: &Goal,
        constraints: &ConstraintSet,
    ) -> EngineResult<RunResult> {
        self.run_in(candidates, goal, constraints, &RunContext::new(Utc::now()))
    }

    /// 执行一次完整运行
    ///
    /// # 参数
    /// - candidates: 候选快照（运行期内只读）
    /// - goal: 采购目标
    /// - constraints: 硬约束
    /// - ctx: 运行标识 / 参考时间 / 取消标记
    ///
    /// # 返回
    /// - Ok(RunResult): 包括目标未达成（shortfall）的情况
    /// - Err(EngineError): 结构性输入错误或被取消
    #[instrument(skip_all, fields(
        run_id = ?ctx.run_id,
        goal = %goal.kind(),
        candidates = candidates.len()
    ))]
    pub fn run_in(
        &self,
        candidates: &[Candidate],
        goal: &Goal,
        constraints: &ConstraintSet,
        ctx: &RunContext,
    ) -> EngineResult<RunResult> {
        self.validate(candidates, goal, constraints)?;

        info!(
            candidates = candidates.len(),
            goal = %goal.kind(),
            spend_ceiling = %goal.spend_ceiling(),
            "开始执行采购建议运行"
        );

        // ==========================================
        // 步骤1: 过滤
        // ==========================================
        checkpoint(&ctx.control, "filter")?;
        let filter = FilterEngine::new(constraints, goal.kind());
        let verdicts = filter.evaluate_batch(candidates);

        let mut survivors: Vec<&Candidate> = Vec::new();
        let mut filtered_out: Vec<ExcludedCandidate> = Vec::new();
        for (candidate, verdict) in candidates.iter().zip(verdicts) {
            if verdict.passed {
                survivors.push(candidate);
            } else {
                filtered_out.push(ExcludedCandidate {
                    product_id: candidate.product_id.clone(),
                    title: candidate.title.clone(),
                    messages: verdict.failures.iter().map(|r| r.describe().to_string()).collect(),
                    reasons: verdict.failures,
                });
            }
        }

        info!(
            survivors = survivors.len(),
            filtered_out = filtered_out.len(),
            "过滤完成"
        );

        // ==========================================
        // 步骤2: 评分 + 排序
        // ==========================================
        checkpoint(&ctx.control, "score")?;
        let penalize_volatility = filter.volatility_is_penalized();
        let scoring = ScoringEngine::new(&self.config.scoring, constraints, penalize_volatility);
        let ranked = self.sorter.sort(scoring.score_batch(&survivors));

        info!(scored = ranked.len(), "评分排序完成");

        // ==========================================
        // 步骤3: 选品
        // ==========================================
        checkpoint(&ctx.control, "optimize")?;
        let outcome = Optimizer::new(&self.config).optimize(goal, &ranked);

        // ==========================================
        // 步骤4: 解释 + 汇总
        // ==========================================
        checkpoint(&ctx.control, "explain")?;
        let explainer = ExplanationGenerator::new(&self.config, constraints, penalize_volatility);
        let (selections, unselected) = self.assemble(&ranked, &outcome, &explainer);

        let mut warnings = Vec::new();
        if ranked.is_empty() {
            warnings.push("No candidates passed the filters".to_string());
        }
        warnings.extend(outcome.warnings.iter().cloned());

        let totals = compute_totals(&selections);
        let counts = RunCounts {
            total: candidates.len(),
            filtered_out: filtered_out.len(),
            scored: ranked.len(),
            selected: selections.len(),
            unselected: unselected.len(),
        };

        if let Some(shortfall) = &outcome.shortfall {
            warn!(gap = %shortfall.gap, "目标未达成: {}", shortfall.message);
        }
        info!(
            selected = counts.selected,
            unselected = counts.unselected,
            filtered_out = counts.filtered_out,
            total_cost = %totals.total_cost,
            total_projected_profit = %totals.total_projected_profit,
            blended_roi_pct = %totals.blended_roi_pct,
            "采购建议运行完成"
        );

        Ok(RunResult {
            run_id: ctx.run_id,
            reference_time: ctx.reference_time,
            goal: goal.clone(),
            constraints: constraints.clone(),
            counts,
            filtered_out,
            unselected,
            selections,
            totals,
            shortfall: outcome.shortfall,
            overshoot: outcome.overshoot,
            warnings,
        })
    }

    /// 结构校验（任何一项失败都不产生部分结果）
    fn validate(&self, candidates: &[Candidate], goal: &Goal, constraints: &ConstraintSet) -> EngineResult<()> {
        if candidates.is_empty() {
            return Err(EngineError::StructuralInput("candidate set is empty".to_string()));
        }
        goal.validate().map_err(EngineError::StructuralInput)?;
        constraints.validate().map_err(EngineError::StructuralInput)?;
        self.config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(())
    }

    /// 按入选顺序组装 Selection，其余评分候选组装为 UnselectedCandidate（按排名）
    fn assemble(
        &self,
        ranked: &[ScoredCandidate<'_>],
        outcome: &OptimizationOutcome,
        explainer: &ExplanationGenerator,
    ) -> (Vec<Selection>, Vec<UnselectedCandidate>) {
        let mut picked: Vec<Option<&Pick>> = vec![None; ranked.len()];
        for pick in &outcome.picks {
            picked[pick.rank] = Some(pick);
        }

        let selections = outcome
            .picks
            .iter()
            .map(|pick| {
                let scored = &ranked[pick.rank];
                let explanation = explainer.explain(scored, pick.rank, Some(pick));
                Selection {
                    product_id: scored.candidate.product_id.clone(),
                    title: scored.candidate.title.clone(),
                    quantity: pick.quantity,
                    pack_size: scored.pack_size(),
                    unit_cost: scored.unit_cost,
                    cost: pick.cost,
                    projected_profit: pick.projected_profit,
                    score: scored.score.total,
                    days_to_sell: scored.candidate.days_to_sell(pick.quantity),
                    velocity_tier: pick.velocity_tier,
                    urgency_band: pick.urgency_band,
                    why_recommended: explanation.why_recommended,
                    warnings: explanation.warnings,
                }
            })
            .collect();

        let unselected = ranked
            .iter()
            .enumerate()
            .filter(|(rank, _)| picked[*rank].is_none())
            .map(|(rank, scored)| {
                let explanation = explainer.explain(scored, rank, None);
                let reason = outcome.skip_reason(rank).unwrap_or(DEFAULT_UNSELECTED_REASON);
                debug!(product_id = %scored.candidate.product_id, reason, "未入选");
                UnselectedCandidate {
                    product_id: scored.candidate.product_id.clone(),
                    title: scored.candidate.title.clone(),
                    score: scored.score,
                    reason: reason.to_string(),
                    why_recommended: explanation.why_recommended,
                    warnings: explanation.warnings,
                }
            })
            .collect();

        (selections, unselected)
    }
}

/// 阶段边界的取消检查
fn checkpoint(control: &RunControl, stage: &'static str) -> EngineResult<()> {
    if control.is_cancelled() {
        warn!(stage, "运行已取消");
        return Err(EngineError::Cancelled { stage });
    }
    Ok(())
}

/// 汇总: 总成本 / 总利润 / 综合 ROI / 按成本加权的平均售完天数
fn compute_totals(selections: &[Selection]) -> RunTotals {
    let total_cost: Decimal = selections.iter().map(|s| s.cost).sum();
    let total_projected_profit: Decimal = selections.iter().map(|s| s.projected_profit).sum();

    let blended_roi_pct = if total_cost > Decimal::ZERO {
        (total_projected_profit / total_cost * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let (weighted_days, weight) = selections
        .iter()
        .filter(|s| s.days_to_sell.is_finite())
        .fold((0.0, 0.0), |(days, weight), s| {
            let cost = s.cost.to_f64().unwrap_or(0.0);
            (days + cost * s.days_to_sell, weight + cost)
        });
    let avg_days_to_sell = if weight > 0.0 { weighted_days / weight } else { 0.0 };

    RunTotals { total_cost, total_projected_profit, blended_roi_pct, avg_days_to_sell }
}
