// ==========================================
// 采购建议引擎 - 解释生成器
// ==========================================
// 职责: 为每个评分候选生成 why_recommended / warnings
// 红线: 只由显式条件触发，不生成自由文本；相同输入输出相同
// ==========================================

use crate::config::{EngineConfig, ExplanationConfig, RestockConfig, ScoringWeights};
use crate::domain::constraint::ConstraintSet;
use crate::domain::result::Explanation;
use crate::domain::types::PricingBasis;
use crate::engine::optimizer::Pick;
use crate::engine::scoring::ScoredCandidate;

// ==========================================
// ExplanationGenerator - 规则驱动的解释
// ==========================================
pub struct ExplanationGenerator {
    config: ExplanationConfig,
    weights: ScoringWeights,
    restock: RestockConfig,
    /// 补货 + Penalize 策略下的波动阈值
    penalized_volatility_above: Option<f64>,
}

impl ExplanationGenerator {
    pub fn new(config: &EngineConfig, constraints: &ConstraintSet, penalize_volatility: bool) -> Self {
        Self {
            config: config.explanation.clone(),
            weights: config.scoring.weights,
            restock: config.restock.clone(),
            penalized_volatility_above: if penalize_volatility {
                constraints.max_volatility_ratio
            } else {
                None
            },
        }
    }

    /// 生成解释
    ///
    /// # 参数
    /// - `scored`: 评分后的候选（含使用的定价口径）
    /// - `rank`: 排名（0 起）
    /// - `pick`: 入选决策；未入选为 None
    pub fn explain(&self, scored: &ScoredCandidate<'_>, rank: usize, pick: Option<&Pick>) -> Explanation {
        let mut why_recommended = vec![format!(
            "Composite score {:.1}/100 (rank {})",
            scored.score.total,
            rank + 1
        )];
        why_recommended.extend(self.tags(scored));

        let mut warnings = self.warnings(scored);

        if let Some(pick) = pick {
            why_recommended.extend(pick.notes.iter().cloned());
            warnings.extend(pick.warnings.iter().cloned());
        }

        Explanation { why_recommended, warnings }
    }

    /// 子分进入顶档时的正面标签
    fn tags(&self, scored: &ScoredCandidate<'_>) -> Vec<String> {
        let s = &scored.score;
        let w = &self.weights;
        [
            (s.profitability, w.profitability, "High ROI"),
            (s.velocity, w.velocity, "Fast mover"),
            (s.competition, w.competition, "Low competition"),
            (s.risk, w.risk, "Stable price"),
        ]
        .into_iter()
        .filter(|(sub, weight, _)| self.in_top_tier(*sub, *weight))
        .map(|(_, _, tag)| tag.to_string())
        .collect()
    }

    fn in_top_tier(&self, sub_score: f64, weight: f64) -> bool {
        weight > 0.0 && sub_score >= weight * self.config.top_tier_ratio
    }

    fn warnings(&self, scored: &ScoredCandidate<'_>) -> Vec<String> {
        let candidate = scored.candidate;
        let mut warnings = Vec::new();

        if let Some(ratio) = candidate.volatility_ratio {
            if ratio >= self.config.spike_ratio {
                warnings.push(match scored.basis {
                    PricingBasis::TrailingAverage => {
                        "Price recently spiked — using trailing-average pricing".to_string()
                    }
                    PricingBasis::Spot => "Price recently spiked — spot economics may not hold".to_string(),
                });
            }
            if matches!(self.penalized_volatility_above, Some(max) if ratio > max) {
                warnings.push("Price unstable — risk-penalized instead of excluded".to_string());
            }
        }

        if scored.basis_fell_back {
            warnings.push(match scored.basis {
                PricingBasis::Spot => "Trailing-average price unavailable — using spot pricing".to_string(),
                PricingBasis::TrailingAverage => {
                    "Spot price unavailable — using trailing-average pricing".to_string()
                }
            });
        }

        if let Some(days) = candidate.days_of_cover {
            if self.near_reorder(days) {
                warnings.push("Near reorder threshold".to_string());
            }
        }

        let w = &self.weights;
        if w.competition > 0.0 && scored.score.competition <= w.competition * self.config.bottom_tier_ratio {
            warnings.push("Heavy competition".to_string());
        }

        if candidate.has_sparse_signals() {
            warnings.push("Sparse data — neutral scoring applied".to_string());
        }

        if candidate.hazmat {
            warnings.push("Hazmat item — special handling required".to_string());
        }

        warnings
    }

    /// low 档内，或刚好高于补货阈值的裕量内
    fn near_reorder(&self, days: f64) -> bool {
        let r = &self.restock;
        let in_low_band = days >= r.urgent_days && days < r.reorder_threshold_days;
        let just_above = days >= r.reorder_threshold_days
            && days < r.reorder_threshold_days + self.config.near_reorder_margin_days;
        in_low_band || just_above
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::candidate::Candidate;
    use crate::domain::result::Score;
    use rust_decimal_macros::dec;

    fn create_test_candidate() -> Candidate {
        Candidate {
            product_id: "P1".to_string(),
            title: "Widget".to_string(),
            unit_cost: Some(dec!(10)),
            spot: None,
            trailing_average: None,
            monthly_velocity: Some(60.0),
            competitor_count: Some(1),
            volatility_ratio: Some(1.0),
            quality_signal: Some(0.9),
            hazmat: false,
            brand_restricted: false,
            supplier_brand_restricted: false,
            pack_size: 1,
            days_of_cover: None,
        }
    }

    fn scored(candidate: &Candidate, score: Score, basis: PricingBasis, fell_back: bool) -> ScoredCandidate<'_> {
        ScoredCandidate {
            candidate,
            score,
            unit_cost: dec!(10),
            unit_profit: dec!(4),
            basis,
            basis_fell_back: fell_back,
        }
    }

    fn strong_score() -> Score {
        Score { total: 90.0, profitability: 35.0, velocity: 25.0, competition: 14.0, risk: 14.0 }
    }

    fn generator() -> ExplanationGenerator {
        ExplanationGenerator::new(&EngineConfig::default(), &ConstraintSet::default(), false)
    }

    #[test]
    fn test_top_tier_tags() {
        let c = create_test_candidate();
        let explanation = generator().explain(&scored(&c, strong_score(), PricingBasis::Spot, false), 0, None);

        assert_eq!(explanation.why_recommended[0], "Composite score 90.0/100 (rank 1)");
        for tag in ["High ROI", "Fast mover", "Low competition", "Stable price"] {
            assert!(explanation.why_recommended.iter().any(|r| r == tag), "missing {}", tag);
        }
        assert!(explanation.warnings.is_empty());
    }

    #[test]
    fn test_spike_warning_depends_on_basis() {
        let mut c = create_test_candidate();
        c.volatility_ratio = Some(1.3);
        let g = generator();

        let trailing = g.explain(&scored(&c, strong_score(), PricingBasis::TrailingAverage, false), 0, None);
        assert!(trailing
            .warnings
            .contains(&"Price recently spiked — using trailing-average pricing".to_string()));

        let spot = g.explain(&scored(&c, strong_score(), PricingBasis::Spot, false), 0, None);
        assert!(spot
            .warnings
            .contains(&"Price recently spiked — spot economics may not hold".to_string()));
    }

    #[test]
    fn test_fallback_sparse_and_hazmat_warnings() {
        let mut c = create_test_candidate();
        c.competitor_count = None;
        c.hazmat = true;
        let score = Score { total: 30.0, profitability: 10.0, velocity: 10.0, competition: 2.0, risk: 8.0 };
        let explanation = generator().explain(&scored(&c, score, PricingBasis::Spot, true), 4, None);

        assert_eq!(
            explanation.warnings,
            vec![
                "Trailing-average price unavailable — using spot pricing".to_string(),
                "Heavy competition".to_string(),
                "Sparse data — neutral scoring applied".to_string(),
                "Hazmat item — special handling required".to_string(),
            ]
        );
    }

    #[test]
    fn test_near_reorder_threshold() {
        let g = generator();
        let mut c = create_test_candidate();

        for (days, expected) in [(3.0, false), (20.0, true), (33.0, true), (40.0, false)] {
            c.days_of_cover = Some(days);
            let explanation = g.explain(&scored(&c, strong_score(), PricingBasis::Spot, false), 0, None);
            assert_eq!(
                explanation.warnings.contains(&"Near reorder threshold".to_string()),
                expected,
                "days_of_cover = {}",
                days
            );
        }
    }

    #[test]
    fn test_pick_notes_are_appended() {
        let c = create_test_candidate();
        let s = scored(&c, strong_score(), PricingBasis::Spot, false);
        let mut pick = Pick::new(0, &s, 2);
        pick.notes.push("Fills $20.00 of the $20.00 budget".to_string());
        pick.warnings.push("Quantity capped by sales velocity (60 days of stock)".to_string());

        let explanation = generator().explain(&s, 0, Some(&pick));
        assert_eq!(explanation.why_recommended.last().unwrap(), "Fills $20.00 of the $20.00 budget");
        assert_eq!(explanation.warnings.len(), 1);
    }

    #[test]
    fn test_penalized_volatility_warning() {
        let mut c = create_test_candidate();
        c.volatility_ratio = Some(1.6);
        let constraints = ConstraintSet { max_volatility_ratio: Some(1.5), ..ConstraintSet::default() };
        let g = ExplanationGenerator::new(&EngineConfig::default(), &constraints, true);

        let explanation = g.explain(&scored(&c, strong_score(), PricingBasis::Spot, false), 0, None);
        assert!(explanation
            .warnings
            .contains(&"Price unstable — risk-penalized instead of excluded".to_string()));
    }
}
