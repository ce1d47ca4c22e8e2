//! 全局配置管理，存储规则来源与缓存位置

use std::path::PathBuf;

/// 全局配置
#[derive(Debug, Clone, Default)]
pub struct GlobalConfig {
    // 自定义规则库（JSON）路径，设置后优先于缓存和内嵌规则
    pub rule_source: Option<PathBuf>,
    // 规则缓存路径（MessagePack），为空则不读写缓存
    pub rule_cache_path: Option<PathBuf>,
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GlobalConfig::default(),
        }
    }

    pub fn rule_source(mut self, path: PathBuf) -> Self {
        self.config.rule_source = Some(path);
        self
    }

    pub fn rule_cache_path(mut self, path: PathBuf) -> Self {
        self.config.rule_cache_path = Some(path);
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_sources() {
        let config = ConfigManager::get_default();
        assert!(config.rule_source.is_none());
        assert!(config.rule_cache_path.is_none());
    }

    #[test]
    fn test_builder_sets_paths() {
        let config = ConfigManager::custom()
            .rule_source(PathBuf::from("rules.json"))
            .rule_cache_path(PathBuf::from("rules.mp"))
            .build();
        assert_eq!(config.rule_source, Some(PathBuf::from("rules.json")));
        assert_eq!(config.rule_cache_path, Some(PathBuf::from("rules.mp")));
    }
}
