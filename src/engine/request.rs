// ==========================================
// 采购建议引擎 - 运行请求
// ==========================================
// 职责: 一次运行的外部输入（目标 + 约束 + 可选运行标识）
// 红线: 未知目标类型必须作为结构性错误返回，而不是回退到默认目标
// ==========================================

use crate::domain::constraint::ConstraintSet;
use crate::domain::goal::Goal;
use crate::domain::types::GoalKind;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// 运行标识；缺省时由调用方分配
    #[serde(default)]
    pub run_id: Option<Uuid>,
    /// 参考时间；缺省时使用当前时间
    #[serde(default)]
    pub reference_time: Option<DateTime<Utc>>,
    /// 供应商标识（快照提供方使用）
    #[serde(default)]
    pub supplier_id: String,
    pub goal: Goal,
    #[serde(default)]
    pub constraints: ConstraintSet,
}

impl RunRequest {
    /// 从 JSON 解析请求
    ///
    /// # 返回
    /// - Err(UnknownGoal): goal.type 不是三种目标之一
    /// - Err(StructuralInput): 其他结构错误
    pub fn from_json_str(json: &str) -> EngineResult<Self> {
        let raw: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| EngineError::StructuralInput(format!("request is not valid JSON: {}", e)))?;

        let tag = raw
            .get("goal")
            .and_then(|goal| goal.get("type"))
            .and_then(|tag| tag.as_str())
            .ok_or_else(|| EngineError::StructuralInput("request is missing goal.type".to_string()))?;
        let kind: GoalKind = tag.parse().map_err(|_| EngineError::UnknownGoal(tag.to_string()))?;

        let request: RunRequest = serde_json::from_value(normalize_goal_tag(raw, kind))
            .map_err(|e| EngineError::StructuralInput(format!("malformed request: {}", e)))?;

        request.goal.validate().map_err(EngineError::StructuralInput)?;
        request.constraints.validate().map_err(EngineError::StructuralInput)?;
        Ok(request)
    }
}

/// 目标标签的别名（如 "restock"）统一为规范写法
fn normalize_goal_tag(mut raw: serde_json::Value, kind: GoalKind) -> serde_json::Value {
    if let Some(goal) = raw.get_mut("goal").and_then(|g| g.as_object_mut()) {
        goal.insert("type".to_string(), serde_json::Value::String(kind.as_str().to_string()));
    }
    raw
}
