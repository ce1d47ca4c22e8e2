//! 检测模块：移动设备检测核心逻辑
pub mod analyzer;
pub mod detector;
pub mod global;

// 导出核心接口
pub use self::analyzer::{HeaderAnalyzer, UserAgentAnalyzer};
pub use self::detector::MobileDetect;
pub use self::global::{init_mobiledetect, init_mobiledetect_with_config, shared_rules};
