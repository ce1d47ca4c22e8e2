//! 版本提取工具模块
//! 将正则捕获到的原始版本文本归一化为点分字符串和可比较的浮点数
//!
//! 浮点规则：第一段为整数部分，其余各段按原始数字文本（保留前导零）直接拼接为小数部分。
//! 例如 `6.0.0.448` -> `6.00448`。该规则并非语义化版本比较，`1.10` 与 `1.1.0` 会得到相同结果。

use serde::{Deserialize, Serialize};

/// 版本归一化结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionResult {
    /// 正则捕获到的原始文本
    pub raw: String,
    /// 仅由数字段和 `.` 组成的规范版本
    pub canonical: String,
    /// 拼接规则得到的浮点值
    pub value: f64,
}

/// 版本提取工具类
pub struct VersionExtractor;

impl VersionExtractor {
    /// 按非数字字符切分，丢弃空段
    pub fn components(raw: &str) -> Vec<&str> {
        raw.split(|c: char| !c.is_ascii_digit())
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// 归一化原始版本文本，不含任何数字时返回 None
    pub fn normalize(raw: &str) -> Option<VersionResult> {
        let components = Self::components(raw);
        if components.is_empty() {
            return None;
        }

        Some(VersionResult {
            raw: raw.to_string(),
            canonical: components.join("."),
            value: Self::to_float(&components),
        })
    }

    /// 规范版本字符串，无数字时为空串
    pub fn canonical(raw: &str) -> String {
        Self::components(raw).join(".")
    }

    /// 浮点版本，无数字时为 0.0
    pub fn float(raw: &str) -> f64 {
        Self::to_float(&Self::components(raw))
    }

    fn to_float(components: &[&str]) -> f64 {
        let Some((integer, rest)) = components.split_first() else {
            return 0.0;
        };
        let text = if rest.is_empty() {
            integer.to_string()
        } else {
            format!("{}.{}", integer, rest.concat())
        };
        // 纯 ASCII 数字拼接，解析不会失败
        text.parse().unwrap_or(0.0)
    }
}
