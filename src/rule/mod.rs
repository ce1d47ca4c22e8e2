//! 规则模块：负责规则的加载、缓存、数据模型定义
pub mod cache;
pub mod loader;
pub mod model;

// 导出核心接口
pub use self::cache::RuleCacheManager;
pub use self::loader::RuleLoader;
pub use self::model::{
    DetectReport, DeviceKind, HeaderCondition, HeaderHeuristicSpec, HeaderIndicator, RuleEntry,
    RuleLibrary, TabletDisambiguator,
};
