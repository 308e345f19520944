// ==========================================
// 采购建议引擎 - 排序器
// ==========================================
// 职责: 按综合分降序排列评分后的候选，平局规则确定
// ==========================================

use crate::engine::scoring::ScoredCandidate;
use std::cmp::Ordering;

// ==========================================
// RankingSorter - 排序器
// ==========================================
pub struct RankingSorter {
    // 无状态
}

impl RankingSorter {
    pub fn new() -> Self {
        Self {}
    }

    /// 排序候选列表
    ///
    /// 排序键:
    /// 1) 综合分降序
    /// 2) 单位预计利润降序
    /// 3) 售出一包天数升序
    /// 4) 商品标识字典序
    pub fn sort<'a>(&self, mut scored: Vec<ScoredCandidate<'a>>) -> Vec<ScoredCandidate<'a>> {
        scored.sort_by(|a, b| self.compare(a, b));
        scored
    }

    /// 比较两个候选的先后
    ///
    /// # 返回
    /// Ordering::Less 表示 a 排在 b 前面
    pub fn compare(&self, a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
        b.score
            .total
            .total_cmp(&a.score.total)
            .then_with(|| b.unit_profit.cmp(&a.unit_profit))
            .then_with(|| a.days_to_sell_one_pack().total_cmp(&b.days_to_sell_one_pack()))
            .then_with(|| a.candidate.product_id.cmp(&b.candidate.product_id))
    }
}

impl Default for RankingSorter {
    fn default() -> Self {
        Self::new()
    }
}
