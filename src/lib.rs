//! rsmobiledetect - 基于 User-Agent 规则表与快速请求头的移动设备检测库

// 日志宏必须最先声明，供后续模块使用
#[macro_use]
mod macros;

// 导出全局错误类型
pub use self::error::{MdResult, MobileDetectError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出规则模块核心接口
pub use self::rule::{
    DetectReport, DeviceKind, HeaderCondition, HeaderHeuristicSpec, HeaderIndicator,
    RuleCacheManager, RuleEntry, RuleLibrary, RuleLoader, TabletDisambiguator,
};

// 导出工具模块核心接口
pub use self::utils::{HeaderConverter, VersionExtractor, VersionResult};

// 导出编译模块核心接口
pub use self::compiler::{
    CompiledDisambiguator, CompiledRule, CompiledRuleLibrary, RuleCategory, RuleCompiler,
};

// 导出检测模块核心接口
pub use self::detector::{
    init_mobiledetect, init_mobiledetect_with_config, shared_rules, HeaderAnalyzer,
    MobileDetect, UserAgentAnalyzer,
};

// 声明所有子模块
pub mod compiler;
pub mod config;
pub mod detector;
pub mod error;
pub mod rule;
pub mod utils;
