//! 编译后模式模型
//! 正则编译后的结构：按分类存放的规则数组 + 标识符索引

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::rule::model::HeaderHeuristicSpec;

/// 规则分类，声明顺序即 is/version 的查找顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    Phone,
    Tablet,
    OperatingSystem,
    Browser,
}

impl RuleCategory {
    /// 标识符查找顺序
    pub const SEARCH_ORDER: [RuleCategory; 4] = [
        RuleCategory::Phone,
        RuleCategory::Tablet,
        RuleCategory::OperatingSystem,
        RuleCategory::Browser,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            RuleCategory::Phone => 0,
            RuleCategory::Tablet => 1,
            RuleCategory::OperatingSystem => 2,
            RuleCategory::Browser => 3,
        }
    }

    /// 与规则库 JSON 字段同名
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Phone => "phones",
            RuleCategory::Tablet => "tablets",
            RuleCategory::OperatingSystem => "operating_systems",
            RuleCategory::Browser => "browsers",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 编译后的单条规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub(crate) name: String,
    pub(crate) regex: Regex,
    pub(crate) property: bool,
}

impl CompiledRule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_property(&self) -> bool {
        self.property
    }

    /// 规则是否带版本捕获组
    pub fn has_version_group(&self) -> bool {
        self.regex.captures_len() > 1
    }

    /// 简单匹配判断（忽略大小写，编译时已设置）
    #[inline]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }

    /// 匹配并取出版本捕获
    /// - `None`：未匹配
    /// - `Some(None)`：匹配但无捕获组或捕获为空
    /// - `Some(Some(v))`：捕获到的原始版本文本
    pub fn match_version<'a>(&self, input: &'a str) -> Option<Option<&'a str>> {
        if !self.has_version_group() {
            return self.is_match(input).then_some(None);
        }
        let captures = self.regex.captures(input)?;
        Some(
            captures
                .get(1)
                .map(|m| m.as_str())
                .filter(|v| !v.is_empty()),
        )
    }
}

/// 编译后的平板消歧规则
#[derive(Debug, Clone)]
pub struct CompiledDisambiguator {
    pub(crate) name: String,
    pub(crate) regex: Regex,
    pub(crate) exclude: Option<Regex>,
}

impl CompiledDisambiguator {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn is_match(&self, input: &str) -> bool {
        self.regex.is_match(input)
            && !self.exclude.as_ref().is_some_and(|exclude| exclude.is_match(input))
    }
}

/// 规则在规则库中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleRef {
    pub category: RuleCategory,
    pub position: usize,
}

/// 编译后的规则库，构建后不可变，可通过 Arc 在多个检测器间共享
#[derive(Debug, Clone)]
pub struct CompiledRuleLibrary {
    pub(crate) version: String,
    pub(crate) tables: [Vec<CompiledRule>; 4],
    // 小写标识符 -> 各分类中的位置（按查找顺序）
    pub(crate) name_index: HashMap<String, Vec<RuleRef>>,
    pub(crate) mobile_signals: Vec<CompiledRule>,
    pub(crate) tablet_disambiguators: Vec<CompiledDisambiguator>,
    pub(crate) user_agent_headers: Vec<String>,
    pub(crate) header_heuristics: HeaderHeuristicSpec,
}

impl CompiledRuleLibrary {
    pub fn version(&self) -> &str {
        &self.version
    }

    /// 按规则库顺序返回某一分类的规则
    pub fn table(&self, category: RuleCategory) -> &[CompiledRule] {
        &self.tables[category.index()]
    }

    pub fn get(&self, rule_ref: RuleRef) -> Option<&CompiledRule> {
        self.tables[rule_ref.category.index()].get(rule_ref.position)
    }

    /// 按查找顺序返回同名规则（忽略 ASCII 大小写），未知标识符返回空迭代
    pub fn lookup<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (RuleCategory, &'a CompiledRule)> + use<'a> {
        self.name_index
            .get(&name.to_ascii_lowercase())
            .into_iter()
            .flatten()
            .filter_map(move |rule_ref| self.get(*rule_ref).map(|rule| (rule_ref.category, rule)))
    }

    pub fn mobile_signals(&self) -> &[CompiledRule] {
        &self.mobile_signals
    }

    pub fn tablet_disambiguators(&self) -> &[CompiledDisambiguator] {
        &self.tablet_disambiguators
    }

    pub fn user_agent_headers(&self) -> &[String] {
        &self.user_agent_headers
    }

    pub fn header_heuristics(&self) -> &HeaderHeuristicSpec {
        &self.header_heuristics
    }

    /// 替换快速请求头判定表（如测试中使用精简表）
    pub fn with_header_heuristics(mut self, spec: HeaderHeuristicSpec) -> Self {
        self.header_heuristics = spec;
        self
    }

    /// 规则总数（不含通用移动特征）
    pub fn rule_count(&self) -> usize {
        self.tables.iter().map(Vec::len).sum()
    }
}
