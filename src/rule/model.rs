//! 规则数据模型定义
//! 规则部分仅存储数据，无任何业务逻辑，支持序列化/反序列化

use std::fmt;

use serde::{Deserialize, Serialize};

/// 单条规则：标识符 + 正则（最多一个捕获组，用于提取版本）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleEntry {
    pub name: String,
    pub pattern: String,
    /// 版本属性（如 Webkit、Build），参与 is/version，但不作为浏览器身份上报
    #[serde(default)]
    pub property: bool,
}

impl RuleEntry {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            property: false,
        }
    }

    pub fn property(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            property: true,
            ..Self::new(name, pattern)
        }
    }
}

/// 平板消歧规则：pattern 命中且 exclude 不命中时判定为平板
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TabletDisambiguator {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub exclude: Option<String>,
}

impl TabletDisambiguator {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            exclude: None,
        }
    }

    pub fn excluding(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }
}

/// 请求头判定条件，值比较均忽略 ASCII 大小写
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderCondition {
    /// 请求头存在即命中（不关心值）
    Present,
    /// 值包含任一子串
    Contains(Vec<String>),
    /// 值等于任一取值
    Equals(Vec<String>),
}

impl HeaderCondition {
    /// 判断请求头取值是否满足条件
    pub fn matches(&self, value: &str) -> bool {
        match self {
            HeaderCondition::Present => true,
            HeaderCondition::Contains(needles) => {
                let haystack = value.to_ascii_lowercase();
                needles
                    .iter()
                    .any(|needle| haystack.contains(&needle.to_ascii_lowercase()))
            }
            HeaderCondition::Equals(values) => values
                .iter()
                .any(|expected| value.trim().eq_ignore_ascii_case(expected)),
        }
    }
}

/// 请求头指示器：header 名 + 判定条件
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderIndicator {
    pub header: String,
    pub condition: HeaderCondition,
}

impl HeaderIndicator {
    pub fn new(header: impl Into<String>, condition: HeaderCondition) -> Self {
        Self {
            header: header.into(),
            condition,
        }
    }
}

/// 快速请求头判定表
/// reject 优先于 accept，两者都不命中时判定为非移动端
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderHeuristicSpec {
    #[serde(default)]
    pub accept: Vec<HeaderIndicator>,
    #[serde(default)]
    pub reject: Vec<HeaderIndicator>,
}

/// 完整规则库
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RuleLibrary {
    /// 数据集版本
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub phones: Vec<RuleEntry>,
    #[serde(default)]
    pub tablets: Vec<RuleEntry>,
    #[serde(default)]
    pub operating_systems: Vec<RuleEntry>,
    #[serde(default)]
    pub browsers: Vec<RuleEntry>,
    /// 通用移动端特征（不绑定具体设备），只参与 is_mobile
    #[serde(default)]
    pub mobile_signals: Vec<RuleEntry>,
    /// 平板消歧规则，先于平板表判定；命中即同时视为移动端
    #[serde(default)]
    pub tablet_disambiguators: Vec<TabletDisambiguator>,
    /// 组成 User-Agent 的请求头（按顺序拼接）
    #[serde(default = "default_user_agent_headers")]
    pub user_agent_headers: Vec<String>,
    #[serde(default)]
    pub header_heuristics: HeaderHeuristicSpec,
}

fn default_user_agent_headers() -> Vec<String> {
    vec!["HTTP_USER_AGENT".to_string()]
}

/// 设备类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Phone,
    Tablet,
    Desktop,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Phone => "phone",
            DeviceKind::Tablet => "tablet",
            DeviceKind::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次请求的检测报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectReport {
    pub device: DeviceKind,
    pub mobile_headers: bool,
    pub user_agent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tablet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,
}

// ======== 为 DetectReport 实现 Display trait（用于 CLI 输出） ========
impl fmt::Display for DetectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.device)?;
        if let Some(model) = self.tablet.as_ref().or(self.phone.as_ref()) {
            write!(f, " ({})", model)?;
        }
        if let Some(os) = &self.os {
            write!(f, ", {}", os)?;
            if let Some(v) = &self.os_version {
                write!(f, " {}", v)?;
            }
        }
        if let Some(browser) = &self.browser {
            write!(f, ", {}", browser)?;
            if let Some(v) = &self.browser_version {
                write!(f, " {}", v)?;
            }
        }
        Ok(())
    }
}
