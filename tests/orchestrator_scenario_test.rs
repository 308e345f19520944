// ==========================================
// RunOrchestrator 端到端场景测试
// ==========================================
// 测试目标: 过滤 → 评分 → 选品 → 解释 → 汇总 的完整流程
// 覆盖范围: 三种目标的典型场景、划分完整性、包装取整、确定性、单调性
// ==========================================

mod helpers;

use helpers::test_data_builder::{fixed_context, mixed_pool, CandidateBuilder};
use purchase_advisor::config::EngineConfig;
use purchase_advisor::domain::types::{FilterReason, UrgencyBand};
use purchase_advisor::domain::{ConstraintSet, Goal, RunResult, TierMix};
use purchase_advisor::engine::{EngineError, RunOrchestrator};
use purchase_advisor::logging;
use purchase_advisor::Candidate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;

// ==========================================
// 测试辅助函数
// ==========================================

fn run(candidates: &[Candidate], goal: Goal, constraints: ConstraintSet) -> RunResult {
    logging::init_test();
    RunOrchestrator::new(EngineConfig::default())
        .run_in(candidates, &goal, &constraints, &fixed_context())
        .expect("run should succeed")
}

fn assert_partition(candidates: &[Candidate], result: &RunResult) {
    let mut seen = HashSet::new();
    for id in result
        .filtered_out
        .iter()
        .map(|e| &e.product_id)
        .chain(result.unselected.iter().map(|u| &u.product_id))
        .chain(result.selections.iter().map(|s| &s.product_id))
    {
        assert!(seen.insert(id.clone()), "{} appears in more than one bucket", id);
    }
    assert_eq!(seen.len(), candidates.len());
    assert_eq!(
        result.counts.filtered_out + result.counts.unselected + result.counts.selected,
        result.counts.total
    );
}

/// 补货池: 包装单位均大于 1，覆盖天数分属 critical / urgent / low
fn restock_pool() -> Vec<Candidate> {
    vec![
        // 日销 2，缺 40 天 → 80 件 → 14 包 × 6 = 84 件，$840
        CandidateBuilder::new("R-CRIT").pack_size(6).days_of_cover(5.0).build(),
        // 日销 3，缺 35 天 → 105 件 → 27 包 × 4，需 $1080
        CandidateBuilder::new("R-URG").velocity(90.0).pack_size(4).days_of_cover(10.0).build(),
        // 日销 10，缺 25 天 → 250 件 → 21 包 × 12，需 $756
        CandidateBuilder::new("R-LOW")
            .unit_cost(dec!(3))
            .roi(dec!(50))
            .velocity(300.0)
            .pack_size(12)
            .days_of_cover(20.0)
            .build(),
    ]
}

// ==========================================
// 场景 A: MeetBudget，硬约束排除 + 向下取整导致 shortfall
// ==========================================
#[test]
fn test_scenario_a_meet_budget_with_exclusions() {
    let candidates = vec![
        // $30/件，速度充足 → floor(100 / 30) = 3 件，$90
        CandidateBuilder::new("A").unit_cost(dec!(30)).roi(dec!(150)).competitors(5).build(),
        CandidateBuilder::new("B").roi(dec!(20)).build(),
        CandidateBuilder::new("C").roi(dec!(300)).hazmat().build(),
    ];
    let constraints = ConstraintSet {
        min_roi_pct: Some(dec!(25)),
        avoid_hazmat: true,
        ..ConstraintSet::default()
    };

    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(100) }, constraints);

    assert_eq!(result.selections.len(), 1);
    let a = result.selection("A").unwrap();
    assert_eq!(a.quantity, 3);
    assert_eq!(a.cost, dec!(90));
    assert!(result.totals.total_cost <= dec!(100));
    assert!(result.overshoot.is_none());
    assert_eq!(result.excluded("B").unwrap().reasons, vec![FilterReason::RoiTooLow]);
    assert_eq!(result.excluded("C").unwrap().reasons, vec![FilterReason::Hazmat]);

    let shortfall = result.shortfall.as_ref().expect("A's affordable quantity costs under $100");
    assert_eq!(shortfall.achieved, dec!(90));
    assert_eq!(shortfall.gap, dec!(10));
    assert!(result.warnings.iter().any(|w| w.contains("short of the $100")));
    assert_partition(&candidates, &result);
}

#[test]
fn test_scenario_a_velocity_cap_limits_spend() {
    let candidates = vec![
        // 月销 3 件 → 60 天最多 6 件 → 最多花 $60
        CandidateBuilder::new("A").roi(dec!(150)).competitors(5).velocity(3.0).build(),
        CandidateBuilder::new("B").roi(dec!(20)).build(),
        CandidateBuilder::new("C").roi(dec!(300)).hazmat().build(),
    ];
    let constraints = ConstraintSet {
        min_roi_pct: Some(dec!(25)),
        avoid_hazmat: true,
        ..ConstraintSet::default()
    };

    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(100) }, constraints);

    assert_eq!(result.selections.len(), 1);
    assert_eq!(result.selections[0].product_id, "A");
    assert!(result.selections[0].warnings.iter().any(|w| w.contains("capped by sales velocity")));
    assert_eq!(result.excluded("B").unwrap().reasons, vec![FilterReason::RoiTooLow]);
    assert_eq!(result.excluded("C").unwrap().reasons, vec![FilterReason::Hazmat]);

    let shortfall = result.shortfall.as_ref().expect("A alone cannot absorb $100");
    assert_eq!(shortfall.achieved, dec!(60));
    assert_eq!(shortfall.gap, dec!(40));
    assert!(result.warnings.iter().any(|w| w.contains("short of the $100")));
    assert_partition(&candidates, &result);
}

#[test]
fn test_expensive_top_candidate_does_not_block_cheaper_ones() {
    let candidates = vec![
        CandidateBuilder::new("BIG").unit_cost(dec!(1000)).roi(dec!(150)).competitors(1).build(),
        CandidateBuilder::new("SMALL").roi(dec!(30)).competitors(8).build(),
    ];

    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(100) }, ConstraintSet::default());

    assert_eq!(result.selections.len(), 1);
    assert_eq!(result.selections[0].product_id, "SMALL");
    assert_eq!(result.selections[0].quantity, 10);
    assert_eq!(result.totals.total_cost, dec!(100));
    assert_eq!(
        result.unselected("BIG").unwrap().reason,
        "Pack cost exceeds the remaining budget"
    );
    assert!(result.shortfall.is_none());
    assert!(result.overshoot.is_none());
}

#[test]
fn test_final_pack_completion_is_opt_in() {
    let candidates = vec![CandidateBuilder::new("A").unit_cost(dec!(30)).roi(dec!(150)).build()];
    let mut config = EngineConfig::default();
    config.sizing.complete_final_pack = true;

    let goal = Goal::MeetBudget { target_spend: dec!(100) };
    let result = RunOrchestrator::new(config)
        .run_in(&candidates, &goal, &ConstraintSet::default(), &fixed_context())
        .unwrap();

    assert_eq!(result.selection("A").unwrap().quantity, 4);
    assert_eq!(result.totals.total_cost, dec!(120));
    let overshoot = result.overshoot.as_ref().unwrap();
    assert_eq!(overshoot.product_id, "A");
    assert_eq!(overshoot.amount, dec!(20));
    assert!(result.shortfall.is_none());
    assert!(result.warnings.iter().any(|w| w.contains("Spend exceeds target by $20.00")));
}

// ==========================================
// 场景 B: Restock，同分候选按紧急度排序
// ==========================================
#[test]
fn test_scenario_b_restock_critical_first() {
    // 两者评分完全一致；低紧急度的标识字典序更靠前，排名在前
    let candidates = vec![
        CandidateBuilder::new("A-LOW").days_of_cover(25.0).build(),
        CandidateBuilder::new("Z-CRIT").days_of_cover(5.0).build(),
    ];

    let result = run(&candidates, Goal::Restock { max_spend: dec!(2000) }, ConstraintSet::default());

    assert_eq!(result.selections.len(), 2);
    assert_eq!(result.selections[0].product_id, "Z-CRIT");
    assert_eq!(result.selections[0].urgency_band, Some(UrgencyBand::Critical));
    assert_eq!(result.selections[1].urgency_band, Some(UrgencyBand::Low));
    assert!(result.selections[1].warnings.contains(&"Near reorder threshold".to_string()));
    // 日销 2 件，补到 45 天
    assert_eq!(result.selections[0].quantity, 80);
    assert_eq!(result.selections[1].quantity, 40);
}

#[test]
fn test_restock_budget_goes_to_critical_first() {
    let candidates = vec![
        CandidateBuilder::new("A-LOW").days_of_cover(25.0).build(),
        CandidateBuilder::new("Z-CRIT").days_of_cover(5.0).build(),
        CandidateBuilder::new("HEALTHY").days_of_cover(50.0).build(),
    ];

    let result = run(&candidates, Goal::Restock { max_spend: dec!(800) }, ConstraintSet::default());

    assert_eq!(result.selections.len(), 1);
    assert_eq!(result.selections[0].product_id, "Z-CRIT");
    assert_eq!(result.unselected("A-LOW").unwrap().reason, "Budget exhausted before this reorder");
    assert_eq!(result.unselected("HEALTHY").unwrap().reason, "Not below reorder threshold");
    assert!(result.has_shortfall());
    assert_partition(&candidates, &result);
}

#[test]
fn test_partial_restock_with_multi_unit_packs() {
    let candidates = restock_pool();

    let result = run(&candidates, Goal::Restock { max_spend: dec!(1200) }, ConstraintSet::default());

    // critical 全额 $840，urgent 只剩 $360 → 9 包
    assert_eq!(result.selection("R-CRIT").unwrap().quantity, 84);
    let urgent = result.selection("R-URG").unwrap();
    assert_eq!(urgent.quantity, 36);
    assert!(urgent.warnings.iter().any(|w| w.contains("Partial restock: 9 of 27 packs")));
    assert_eq!(result.unselected("R-LOW").unwrap().reason, "Budget exhausted before this reorder");
    assert_eq!(result.totals.total_cost, dec!(1200));

    let shortfall = result.shortfall.as_ref().unwrap();
    assert_eq!(shortfall.target, dec!(2676));
    assert_eq!(shortfall.gap, dec!(1476));
    assert_partition(&candidates, &result);
}

// ==========================================
// 场景 C: HitProfitTarget，花费上限不足以达到利润目标
// ==========================================
#[test]
fn test_scenario_c_profit_target_unreachable() {
    let candidates = mixed_pool();
    let goal = Goal::HitProfitTarget {
        target_profit: dec!(1000),
        max_spend: dec!(150),
        tier_mix: TierMix::default(),
    };

    let result = run(&candidates, goal, ConstraintSet::default());

    assert!(!result.selections.is_empty());
    assert!(result.totals.total_cost <= dec!(150));
    assert!(result.totals.total_projected_profit < dec!(1000));
    let shortfall = result.shortfall.as_ref().unwrap();
    assert_eq!(shortfall.target, dec!(1000));
    assert_eq!(shortfall.achieved, result.totals.total_projected_profit);
    assert!(result.selections.iter().all(|s| s.velocity_tier.is_some()));
    assert_partition(&candidates, &result);
}

#[test]
fn test_profit_target_reached() {
    let candidates = mixed_pool();
    let goal = Goal::HitProfitTarget {
        target_profit: dec!(200),
        max_spend: dec!(5000),
        tier_mix: TierMix::default(),
    };

    let result = run(&candidates, goal, ConstraintSet::default());

    assert!(result.shortfall.is_none());
    assert!(result.totals.total_projected_profit >= dec!(200));
    assert!(result.totals.total_cost <= dec!(5000));
}

// ==========================================
// 通用性质
// ==========================================

#[test]
fn test_spend_never_exceeds_ceiling_plus_one_pack() {
    let candidates = mixed_pool();
    for target in (1..=60).map(|i| Decimal::from(i * 37)) {
        let result = run(&candidates, Goal::MeetBudget { target_spend: target }, ConstraintSet::default());
        let last = match result.selections.last() {
            Some(s) => s,
            None => continue,
        };
        let last_pack = last.unit_cost * Decimal::from(last.pack_size);
        assert!(
            result.totals.total_cost <= target + last_pack,
            "target {} spent {}",
            target,
            result.totals.total_cost
        );
        // 默认配置下从不超出目标
        assert!(result.totals.total_cost <= target);
        assert!(result.overshoot.is_none());
    }
}

#[test]
fn test_quantities_are_positive_pack_multiples() {
    let cases = vec![
        (mixed_pool(), Goal::MeetBudget { target_spend: dec!(750) }),
        (
            mixed_pool(),
            Goal::HitProfitTarget { target_profit: dec!(300), max_spend: dec!(2000), tier_mix: TierMix::default() },
        ),
        // 额度不足以补齐全部需求 → 部分补货
        (restock_pool(), Goal::Restock { max_spend: dec!(1000) }),
        (restock_pool(), Goal::Restock { max_spend: dec!(1900) }),
    ];
    for (candidates, goal) in cases {
        let result = run(&candidates, goal, ConstraintSet::default());
        for s in &result.selections {
            assert!(s.quantity > 0);
            assert_eq!(s.quantity % s.pack_size, 0, "{}", s.product_id);
            assert_eq!(s.cost, s.unit_cost * Decimal::from(s.quantity));
        }
        assert_partition(&candidates, &result);
    }
}

#[test]
fn test_determinism() {
    let candidates = mixed_pool();
    let goal = Goal::MeetBudget { target_spend: dec!(640) };
    let first = run(&candidates, goal.clone(), ConstraintSet::default());
    for _ in 0..5 {
        assert_eq!(run(&candidates, goal.clone(), ConstraintSet::default()), first);
    }
}

#[test]
fn test_monotonic_selection_count() {
    // 包成本一致（$10），速度封顶各不相同
    let candidates: Vec<Candidate> = [3.0, 6.0, 15.0, 30.0, 9.0, 60.0]
        .iter()
        .enumerate()
        .map(|(i, velocity)| {
            CandidateBuilder::new(&format!("M{}", i + 1))
                .roi(Decimal::from(40 + i as i64 * 10))
                .velocity(*velocity)
                .build()
        })
        .collect();
    let mut previous = 0;
    for target in (1..=80).map(|i| Decimal::from(i * 25)) {
        let result = run(&candidates, Goal::MeetBudget { target_spend: target }, ConstraintSet::default());
        assert!(
            result.selections.len() >= previous,
            "selection count dropped at target {}",
            target
        );
        previous = result.selections.len();
    }
}

#[test]
fn test_scores_within_bounds() {
    let candidates = mixed_pool();
    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(10) }, ConstraintSet::default());
    let weights = EngineConfig::default().scoring.weights;
    for u in &result.unselected {
        assert!((0.0..=100.0).contains(&u.score.total));
        assert!(u.score.profitability <= weights.profitability);
        assert!(u.score.velocity <= weights.velocity);
        assert!(u.score.competition <= weights.competition);
        assert!(u.score.risk <= weights.risk);
    }
}

#[test]
fn test_all_failed_rules_are_reported() {
    let candidates = vec![
        CandidateBuilder::new("BAD").brand_restricted().hazmat().no_spot().competitors(20).build(),
        CandidateBuilder::new("GOOD").build(),
    ];
    let constraints = ConstraintSet {
        avoid_hazmat: true,
        max_competitors: Some(10),
        min_roi_pct: Some(dec!(25)),
        ..ConstraintSet::default()
    };

    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(50) }, constraints);

    let excluded = result.excluded("BAD").unwrap();
    assert_eq!(
        excluded.reasons,
        vec![
            FilterReason::BrandRestricted,
            FilterReason::Hazmat,
            FilterReason::NoPricingData,
            FilterReason::TooMuchCompetition,
        ]
    );
    assert_eq!(excluded.messages.len(), 4);
    assert_eq!(result.selection("GOOD").unwrap().quantity, 5);
}

#[test]
fn test_everything_filtered_is_not_an_error() {
    let candidates = vec![CandidateBuilder::new("X").hazmat().build()];
    let constraints = ConstraintSet { avoid_hazmat: true, ..ConstraintSet::default() };

    let result = run(&candidates, Goal::MeetBudget { target_spend: dec!(50) }, constraints);

    assert!(result.selections.is_empty());
    assert_eq!(result.counts.filtered_out, 1);
    assert!(result.warnings.contains(&"No candidates passed the filters".to_string()));
    assert!(result.has_shortfall());
}

#[test]
fn test_structural_errors() {
    let orchestrator = RunOrchestrator::new(EngineConfig::default());
    let candidates = mixed_pool();

    let err = orchestrator
        .run(&candidates, &Goal::MeetBudget { target_spend: dec!(-10) }, &ConstraintSet::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::StructuralInput(_)));

    let err = orchestrator
        .run(&[], &Goal::Restock { max_spend: dec!(100) }, &ConstraintSet::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::StructuralInput(_)));

    let bad_constraints = ConstraintSet { max_volatility_ratio: Some(-1.0), ..ConstraintSet::default() };
    let err = orchestrator
        .run(&candidates, &Goal::MeetBudget { target_spend: dec!(10) }, &bad_constraints)
        .unwrap_err();
    assert!(matches!(err, EngineError::StructuralInput(_)));
}

#[test]
fn test_result_serialization_format() {
    let candidates = vec![
        CandidateBuilder::new("A").days_of_cover(5.0).build(),
        CandidateBuilder::new("B").roi(dec!(5)).days_of_cover(5.0).build(),
    ];
    let constraints = ConstraintSet { min_roi_pct: Some(dec!(25)), ..ConstraintSet::default() };
    let result = run(&candidates, Goal::Restock { max_spend: dec!(100) }, constraints);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["goal"]["type"], "restock_inventory");
    assert_eq!(json["filtered_out"][0]["reasons"][0], "roi_too_low");
    assert_eq!(json["selections"][0]["urgency_band"], "critical");
    assert!(json["totals"]["total_cost"].is_string());
    assert_eq!(json["reference_time"], "2026-03-02T09:30:00Z");

    let back: RunResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.goal, result.goal);
    assert_eq!(back.totals.total_cost, result.totals.total_cost);
    assert_eq!(back.filtered_out, result.filtered_out);
}
