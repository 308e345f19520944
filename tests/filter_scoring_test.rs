// ==========================================
// FilterEngine / ScoringEngine / RankingSorter 集成测试
// ==========================================
// 测试目标: 硬约束过滤、定价口径回退、评分曲线与排序
// ==========================================

mod helpers;

use helpers::test_data_builder::{mixed_pool, CandidateBuilder};
use purchase_advisor::config::ScoringConfig;
use purchase_advisor::domain::types::{FilterReason, GoalKind, PricingBasis, VolatilityPolicy};
use purchase_advisor::domain::ConstraintSet;
use purchase_advisor::engine::{FilterEngine, RankingSorter, ScoringEngine};
use rust_decimal_macros::dec;

// ==========================================
// 过滤
// ==========================================

#[test]
fn test_missing_optional_signals_never_fail_rules() {
    let candidate = CandidateBuilder::new("SPARSE")
        .no_competitor_data()
        .no_volatility_data()
        .build();
    let constraints = ConstraintSet {
        max_competitors: Some(2),
        max_volatility_ratio: Some(1.1),
        ..ConstraintSet::default()
    };

    let verdict = FilterEngine::new(&constraints, GoalKind::MeetBudget).evaluate(&candidate);
    assert!(verdict.passed);
}

#[test]
fn test_supplier_level_brand_restriction() {
    let candidate = CandidateBuilder::new("B1").supplier_brand_restricted().build();
    let verdict =
        FilterEngine::new(&ConstraintSet::default(), GoalKind::MeetBudget).evaluate(&candidate);
    assert_eq!(verdict.failures, vec![FilterReason::BrandRestricted]);
}

#[test]
fn test_restock_penalize_policy_keeps_volatile_candidates() {
    let volatile = CandidateBuilder::new("V").volatility(1.4).days_of_cover(4.0).build();
    let exclude = ConstraintSet { max_volatility_ratio: Some(1.3), ..ConstraintSet::default() };
    let penalize = ConstraintSet {
        restock_volatility_policy: VolatilityPolicy::Penalize,
        ..exclude.clone()
    };

    assert_eq!(
        FilterEngine::new(&exclude, GoalKind::Restock).evaluate(&volatile).failures,
        vec![FilterReason::PriceUnstable]
    );
    assert!(FilterEngine::new(&penalize, GoalKind::Restock).evaluate(&volatile).passed);
    // 非补货目标仍然硬过滤
    assert!(!FilterEngine::new(&penalize, GoalKind::MeetBudget).evaluate(&volatile).passed);

    // 扣分: 稳定性归零
    let config = ScoringConfig::default();
    let penalized = ScoringEngine::new(&config, &penalize, true).score(&volatile);
    let plain = ScoringEngine::new(&config, &penalize, false).score(&volatile);
    assert!(penalized.risk < plain.risk);
}

#[test]
fn test_too_slow_uses_one_pack_days() {
    // 月销 10 件 → 日销 1/3，一包 12 件 → 36 天
    let slow = CandidateBuilder::new("S").velocity(10.0).pack_size(12).build();
    let no_velocity = CandidateBuilder::new("N").no_velocity().build();
    let constraints = ConstraintSet { max_days_to_sell: Some(30.0), ..ConstraintSet::default() };
    let engine = FilterEngine::new(&constraints, GoalKind::MeetBudget);

    assert_eq!(engine.evaluate(&slow).failures, vec![FilterReason::TooSlow]);
    assert_eq!(engine.evaluate(&no_velocity).failures, vec![FilterReason::TooSlow]);
}

#[test]
fn test_batch_preserves_input_order() {
    let pool = mixed_pool();
    let constraints = ConstraintSet { min_roi_pct: Some(dec!(40)), ..ConstraintSet::default() };
    let verdicts = FilterEngine::new(&constraints, GoalKind::MeetBudget).evaluate_batch(&pool);

    let ids: Vec<&str> = verdicts.iter().map(|v| v.product_id.as_str()).collect();
    let expected: Vec<&str> = pool.iter().map(|c| c.product_id.as_str()).collect();
    assert_eq!(ids, expected);
    assert!(!verdicts[3].passed); // P04 ROI 30%
    assert!(!verdicts[6].passed); // P07 ROI 10%
}

// ==========================================
// 定价口径
// ==========================================

#[test]
fn test_trailing_basis_falls_back_to_spot() {
    let candidate = CandidateBuilder::new("F").build();
    let constraints = ConstraintSet {
        pricing_basis: PricingBasis::TrailingAverage,
        ..ConstraintSet::default()
    };

    assert!(FilterEngine::new(&constraints, GoalKind::MeetBudget).evaluate(&candidate).passed);
    let scored = ScoringEngine::new(&ScoringConfig::default(), &constraints, false)
        .score_candidate(&candidate)
        .unwrap();
    assert_eq!(scored.basis, PricingBasis::Spot);
    assert!(scored.basis_fell_back);
}

#[test]
fn test_trailing_basis_uses_trailing_economics() {
    let candidate = CandidateBuilder::new("T")
        .trailing(dec!(20), dec!(3), dec!(30))
        .build();
    let constraints = ConstraintSet {
        pricing_basis: PricingBasis::TrailingAverage,
        ..ConstraintSet::default()
    };

    let scored = ScoringEngine::new(&ScoringConfig::default(), &constraints, false)
        .score_candidate(&candidate)
        .unwrap();
    assert_eq!(scored.unit_profit, dec!(3));
    assert!(!scored.basis_fell_back);
}

// ==========================================
// 评分 + 排序
// ==========================================

#[test]
fn test_scores_are_bounded_and_ranked_deterministically() {
    let pool = mixed_pool();
    let refs: Vec<_> = pool.iter().collect();
    let engine = ScoringEngine::new(&ScoringConfig::default(), &ConstraintSet::default(), false);

    let ranked = RankingSorter::new().sort(engine.score_batch(&refs));
    assert_eq!(ranked.len(), pool.len());
    for pair in ranked.windows(2) {
        assert!(pair[0].score.total >= pair[1].score.total);
    }
    for s in &ranked {
        assert!((0.0..=100.0).contains(&s.score.total));
    }

    let again = RankingSorter::new().sort(engine.score_batch(&refs));
    let a: Vec<&str> = ranked.iter().map(|s| s.candidate.product_id.as_str()).collect();
    let b: Vec<&str> = again.iter().map(|s| s.candidate.product_id.as_str()).collect();
    assert_eq!(a, b);
}

#[test]
fn test_higher_roi_scores_higher_with_diminishing_returns() {
    let engine = ScoringEngine::new(&ScoringConfig::default(), &ConstraintSet::default(), false);
    let score = |roi| engine.score(&CandidateBuilder::new("R").roi(roi).build()).profitability;

    let (low, mid, high) = (score(dec!(30)), score(dec!(80)), score(dec!(130)));
    assert!(low < mid && mid < high);
    assert!(mid - low > high - mid);
}
