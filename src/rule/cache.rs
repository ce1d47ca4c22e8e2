//! 规则缓存管理
//! 仅处理规则库的本地序列化（MessagePack）和反序列化

use std::path::Path;

use rmp_serde::{from_slice, Serializer};
use serde::Serialize;

use super::model::RuleLibrary;
use crate::error::{MdResult, MobileDetectError};

/// 规则缓存管理器
pub struct RuleCacheManager;

impl RuleCacheManager {
    /// 从本地缓存加载规则库
    pub async fn load_from_cache(cache_path: &Path) -> MdResult<RuleLibrary> {
        let cache_data = tokio::fs::read(cache_path).await?;
        let rule_lib = Self::decode(&cache_data)?;

        log_debug!(
            "缓存文件反序列化成功，数据集版本：{}，手机规则{}条、平板规则{}条",
            rule_lib.version,
            rule_lib.phones.len(),
            rule_lib.tablets.len()
        );

        Ok(rule_lib)
    }

    /// 将规则库缓存到本地
    pub async fn save_to_cache(cache_path: &Path, rule_lib: &RuleLibrary) -> MdResult<()> {
        let cache_data = Self::encode(rule_lib)?;
        log_debug!("规则库序列化成功，序列化后数据大小：{} 字节", cache_data.len());

        tokio::fs::write(cache_path, cache_data).await?;
        Ok(())
    }

    /// 清除本地缓存
    pub async fn clear_cache(cache_path: &Path) -> MdResult<()> {
        if tokio::fs::try_exists(cache_path).await? {
            tokio::fs::remove_file(cache_path).await?;
        }
        Ok(())
    }

    /// MessagePack 序列化
    pub fn encode(rule_lib: &RuleLibrary) -> MdResult<Vec<u8>> {
        let mut cache_data = Vec::new();
        rule_lib
            .serialize(&mut Serializer::new(&mut cache_data))
            .map_err(|e| MobileDetectError::MsgPackError(format!("serialize failed: {}", e)))?;
        Ok(cache_data)
    }

    /// MessagePack 反序列化
    pub fn decode(bytes: &[u8]) -> MdResult<RuleLibrary> {
        from_slice(bytes)
            .map_err(|e| MobileDetectError::MsgPackError(format!("deserialize failed: {}", e)))
    }
}
