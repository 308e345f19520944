// ==========================================
// 采购建议引擎 - 配置层
// ==========================================
// 职责: 单次运行配置（评分权重/分层阈值/补货参数），JSON 加载 + 校验
// ==========================================

pub mod engine_config;
pub mod error;

// 重导出核心配置
pub use engine_config::{
    EngineConfig, ExplanationConfig, RestockConfig, ScoringConfig, ScoringWeights, SizingConfig,
    TierConfig,
};
pub use error::{ConfigError, ConfigResult};
