// ==========================================
// 采购建议引擎 - 引擎层错误类型
// ==========================================
// 红线: 只有结构性输入错误会中断运行；
//       单品数据缺失折叠为过滤失败，目标不可达折叠为 shortfall
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 结构性输入错误（空候选集、非正预算、非法约束等）
    #[error("structural input error: {0}")]
    StructuralInput(String),

    /// 未知目标类型
    #[error("unknown goal type: {0}")]
    UnknownGoal(String),

    /// 配置不合法
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// 调度方在阶段之间取消了本次运行
    #[error("run cancelled before stage: {stage}")]
    Cancelled { stage: &'static str },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
