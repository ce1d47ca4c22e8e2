//! 全局共享规则库管理
//! 编译后的规则库只读，进程内所有检测器通过 Arc 共享同一份
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::compiler::{CompiledRuleLibrary, RuleCompiler};
use crate::config::{ConfigManager, GlobalConfig};
use crate::error::MdResult;
use crate::rule::RuleLoader;

/// 通过 init_mobiledetect* 安装的全局规则库
static GLOBAL_RULES: Lazy<Arc<OnceCell<Arc<CompiledRuleLibrary>>>> =
    Lazy::new(|| Arc::new(OnceCell::new()));

/// 未初始化时使用的内嵌规则库（首次使用时编译）
#[cfg(feature = "embedded-rules")]
static EMBEDDED_RULES: once_cell::sync::OnceCell<Arc<CompiledRuleLibrary>> =
    once_cell::sync::OnceCell::new();

/// 初始化全局规则库（默认配置）
pub async fn init_mobiledetect() -> MdResult<()> {
    init_mobiledetect_with_config(ConfigManager::get_default()).await
}

/// 带自定义配置初始化全局规则库，重复调用不会重新加载
pub async fn init_mobiledetect_with_config(config: GlobalConfig) -> MdResult<()> {
    if GLOBAL_RULES.get().is_some() {
        log_debug!("全局规则库已初始化，跳过");
        return Ok(());
    }

    GLOBAL_RULES
        .get_or_try_init(|| async {
            // 1. 加载原始规则库
            let rule_lib = RuleLoader::load(&config).await?;
            // 2. 编译规则库
            let compiled = RuleCompiler::compile(&rule_lib)?;
            log_debug!("全局规则库初始化完成，版本：{}", compiled.version());
            Ok::<_, crate::error::MobileDetectError>(Arc::new(compiled))
        })
        .await?;

    Ok(())
}

/// 获取共享规则库：优先返回已安装的全局规则库，否则使用内嵌规则库
pub fn shared_rules() -> MdResult<Arc<CompiledRuleLibrary>> {
    if let Some(rules) = GLOBAL_RULES.get() {
        return Ok(Arc::clone(rules));
    }
    embedded_rules()
}

#[cfg(feature = "embedded-rules")]
fn embedded_rules() -> MdResult<Arc<CompiledRuleLibrary>> {
    EMBEDDED_RULES
        .get_or_try_init(|| {
            let rule_lib = RuleLoader::embedded()?;
            Ok(Arc::new(RuleCompiler::compile(&rule_lib)?))
        })
        .map(Arc::clone)
}

#[cfg(not(feature = "embedded-rules"))]
fn embedded_rules() -> MdResult<Arc<CompiledRuleLibrary>> {
    Err(crate::error::MobileDetectError::DetectorInitError(
        "rule library not initialized, call init_mobiledetect first".to_string(),
    ))
}

#[cfg(all(test, feature = "embedded-rules"))]
mod tests {
    use super::*;

    #[test]
    fn test_shared_rules_available_without_init() {
        let rules = shared_rules().unwrap();
        assert!(rules.rule_count() > 0);
        assert!(!rules.user_agent_headers().is_empty());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        init_mobiledetect().await.unwrap();
        let first = shared_rules().unwrap();
        init_mobiledetect().await.unwrap();
        let second = shared_rules().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
