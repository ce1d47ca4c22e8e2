//! 规则加载管理器
//! 负责从自定义规则文件、本地缓存或内嵌规则库加载规则

use std::path::Path;

use super::cache::RuleCacheManager;
use super::model::RuleLibrary;
use crate::config::GlobalConfig;
use crate::error::{MdResult, MobileDetectError};

/// 内嵌默认规则库（JSON）
#[cfg(feature = "embedded-rules")]
pub const EMBEDDED_RULES_JSON: &str = include_str!("../../data/mobiledetect_rules.json");

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载规则库
    /// 优先级：自定义规则文件 > 本地缓存 > 内嵌规则库
    pub async fn load(config: &GlobalConfig) -> MdResult<RuleLibrary> {
        // 1. 自定义规则文件，读取失败直接报错
        if let Some(source) = &config.rule_source {
            let rule_lib = Self::load_from_path(source).await?;
            log_debug!("从自定义规则文件加载规则库成功：{}", source.display());
            Self::store_cache(config, &rule_lib).await;
            return Ok(rule_lib);
        }

        // 2. 本地缓存
        if let Some(cache_path) = &config.rule_cache_path {
            match RuleCacheManager::load_from_cache(cache_path).await {
                Ok(rule_lib) if Self::cache_is_current(&rule_lib) => {
                    log_debug!("从本地缓存加载规则库成功");
                    return Ok(rule_lib);
                }
                Ok(rule_lib) => {
                    log_warn!("本地缓存规则库版本 {} 已过期，将重新加载", rule_lib.version);
                }
                Err(e) => {
                    log_warn!("本地缓存不存在或损坏：{}", e);
                }
            }
        }

        // 3. 内嵌规则库
        let rule_lib = Self::fallback()?;
        Self::store_cache(config, &rule_lib).await;
        Ok(rule_lib)
    }

    /// 从 JSON 文件加载规则库
    pub async fn load_from_path(path: &Path) -> MdResult<RuleLibrary> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            MobileDetectError::RuleLoadError(format!("read {} failed: {}", path.display(), e))
        })?;
        Self::from_json_slice(&bytes)
    }

    pub fn from_json_str(json: &str) -> MdResult<RuleLibrary> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> MdResult<RuleLibrary> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_msgpack_slice(bytes: &[u8]) -> MdResult<RuleLibrary> {
        RuleCacheManager::decode(bytes)
    }

    /// 内嵌默认规则库
    #[cfg(feature = "embedded-rules")]
    pub fn embedded() -> MdResult<RuleLibrary> {
        Self::from_json_str(EMBEDDED_RULES_JSON)
    }

    #[cfg(feature = "embedded-rules")]
    fn fallback() -> MdResult<RuleLibrary> {
        log_debug!("使用内嵌规则库");
        Self::embedded()
    }

    #[cfg(not(feature = "embedded-rules"))]
    fn fallback() -> MdResult<RuleLibrary> {
        Err(MobileDetectError::RuleLoadError(
            "no rule source configured and embedded rules are disabled".to_string(),
        ))
    }

    /// 缓存版本与内嵌规则库一致才视为有效
    #[cfg(feature = "embedded-rules")]
    fn cache_is_current(rule_lib: &RuleLibrary) -> bool {
        match Self::embedded() {
            Ok(embedded) => embedded.version == rule_lib.version,
            Err(_) => true,
        }
    }

    #[cfg(not(feature = "embedded-rules"))]
    fn cache_is_current(_rule_lib: &RuleLibrary) -> bool {
        true
    }

    /// 写缓存失败只记录日志
    async fn store_cache(config: &GlobalConfig, rule_lib: &RuleLibrary) {
        let Some(cache_path) = &config.rule_cache_path else {
            return;
        };
        if let Err(e) = RuleCacheManager::save_to_cache(cache_path, rule_lib).await {
            log_warn!("规则库缓存到本地失败：{}", e);
        } else {
            log_debug!("规则库已缓存到本地：{}", cache_path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use std::path::PathBuf;

    fn temp_path(tag: &str, ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "rsmobiledetect_loader_{}_{}.{}",
            tag,
            std::process::id(),
            ext
        ))
    }

    #[test]
    fn test_from_json_str_rejects_malformed_json() {
        let err = RuleLoader::from_json_str("{\"phones\": [").unwrap_err();
        assert!(matches!(err, MobileDetectError::RuleParseError(_)));
    }

    #[cfg(feature = "embedded-rules")]
    #[test]
    fn test_embedded_library_is_populated() {
        let lib = RuleLoader::embedded().unwrap();
        assert!(!lib.version.is_empty());
        assert!(lib.phones.iter().any(|r| r.name == "iPhone"));
        assert!(lib.tablets.iter().any(|r| r.name == "iPad"));
        assert!(lib.operating_systems.iter().any(|r| r.name == "iOS"));
        assert!(lib.browsers.iter().any(|r| r.name == "Webkit" && r.property));
        assert_eq!(lib.user_agent_headers[0], "HTTP_USER_AGENT");
        assert!(!lib.header_heuristics.accept.is_empty());
        assert!(!lib.header_heuristics.reject.is_empty());
    }

    #[tokio::test]
    async fn test_load_prefers_rule_source_and_writes_cache() {
        let source = temp_path("source", "json");
        let cache = temp_path("source_cache", "mp");
        tokio::fs::write(
            &source,
            r#"{"version": "custom", "phones": [{"name": "Foo", "pattern": "FooPhone"}]}"#,
        )
        .await
        .unwrap();

        let config = ConfigManager::custom()
            .rule_source(source.clone())
            .rule_cache_path(cache.clone())
            .build();
        let lib = RuleLoader::load(&config).await.unwrap();
        assert_eq!(lib.version, "custom");
        assert_eq!(lib.phones.len(), 1);

        let cached = RuleCacheManager::load_from_cache(&cache).await.unwrap();
        assert_eq!(cached, lib);

        let _ = tokio::fs::remove_file(&source).await;
        let _ = tokio::fs::remove_file(&cache).await;
    }

    #[tokio::test]
    async fn test_load_missing_rule_source_fails() {
        let config = ConfigManager::custom()
            .rule_source(temp_path("missing", "json"))
            .build();
        let err = RuleLoader::load(&config).await.unwrap_err();
        assert!(matches!(err, MobileDetectError::RuleLoadError(_)));
    }

    #[cfg(feature = "embedded-rules")]
    #[tokio::test]
    async fn test_load_replaces_stale_cache_with_embedded() {
        let cache = temp_path("stale_cache", "mp");
        let stale = RuleLibrary {
            version: "0.0.0-stale".to_string(),
            ..Default::default()
        };
        RuleCacheManager::save_to_cache(&cache, &stale).await.unwrap();

        let config = ConfigManager::custom().rule_cache_path(cache.clone()).build();
        let lib = RuleLoader::load(&config).await.unwrap();
        assert_eq!(lib, RuleLoader::embedded().unwrap());

        // 过期缓存已被内嵌规则库覆盖
        let cached = RuleCacheManager::load_from_cache(&cache).await.unwrap();
        assert_eq!(cached.version, lib.version);

        let _ = tokio::fs::remove_file(&cache).await;
    }
}
