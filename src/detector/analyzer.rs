//! 检测分析器：快速请求头判定与 User-Agent 规则匹配
//! 两个分析器都是无状态的纯函数，输入为编译后的规则库与当前请求数据
use std::collections::HashMap;

use crate::compiler::{CompiledRule, CompiledRuleLibrary, RuleCategory};
use crate::rule::{HeaderHeuristicSpec, HeaderIndicator};

/// 快速请求头分析器
pub struct HeaderAnalyzer;

impl HeaderAnalyzer {
    /// 判定请求头是否直接表明移动端
    /// reject 先于 accept 判定并短路；缺失的 Header 视为不命中
    pub fn check_headers_for_mobile(
        spec: &HeaderHeuristicSpec,
        headers: &HashMap<String, String>,
    ) -> bool {
        if let Some(indicator) = Self::first_hit(&spec.reject, headers) {
            log_trace!("非移动端请求头命中：{}", indicator.header);
            return false;
        }

        if let Some(indicator) = Self::first_hit(&spec.accept, headers) {
            log_trace!("移动端请求头命中：{}", indicator.header);
            return true;
        }

        false
    }

    fn first_hit<'a>(
        indicators: &'a [HeaderIndicator],
        headers: &HashMap<String, String>,
    ) -> Option<&'a HeaderIndicator> {
        indicators.iter().find(|indicator| {
            headers
                .get(&indicator.header)
                .is_some_and(|value| indicator.condition.matches(value))
        })
    }
}

/// User-Agent 规则分析器
pub struct UserAgentAnalyzer;

impl UserAgentAnalyzer {
    /// 手机表、通用移动特征或平板判定任一命中即为移动端（不含请求头判定）
    /// 平板判定包含消歧规则，保证平板一定是移动端
    pub fn is_mobile(lib: &CompiledRuleLibrary, user_agent: &str) -> bool {
        if user_agent.is_empty() {
            return false;
        }

        let hit = Self::first_match(lib, RuleCategory::Phone, user_agent, false)
            .or_else(|| Self::first_in(lib.mobile_signals(), user_agent, false));
        if let Some(rule) = hit {
            log_trace!("User-Agent 移动端命中：{}", rule.name());
            return true;
        }

        Self::is_tablet(lib, user_agent)
    }

    /// 平板判定：先查消歧规则（如无 Mobile 标记的 Android），再查平板表
    pub fn is_tablet(lib: &CompiledRuleLibrary, user_agent: &str) -> bool {
        if user_agent.is_empty() {
            return false;
        }

        if let Some(rule) = lib
            .tablet_disambiguators()
            .iter()
            .find(|rule| rule.is_match(user_agent))
        {
            log_trace!("平板消歧规则命中：{}", rule.name());
            return true;
        }

        match Self::first_match(lib, RuleCategory::Tablet, user_agent, false) {
            Some(rule) => {
                log_trace!("User-Agent 平板命中：{}", rule.name());
                true
            }
            None => false,
        }
    }

    /// 按 手机 -> 平板 -> 系统 -> 浏览器/属性 顺序查找同名规则，首个命中即为 true
    /// 未知标识符与未命中都返回 false
    pub fn is(lib: &CompiledRuleLibrary, user_agent: &str, name: &str) -> bool {
        if user_agent.is_empty() {
            return false;
        }
        lib.lookup(name).any(|(_, rule)| rule.is_match(user_agent))
    }

    /// 取同名规则中首个命中规则的版本捕获
    /// 首个命中的规则没有捕获到版本时直接返回 None，不再继续查找
    pub fn version_raw<'a>(
        lib: &CompiledRuleLibrary,
        user_agent: &'a str,
        name: &str,
    ) -> Option<&'a str> {
        if user_agent.is_empty() {
            return None;
        }
        lib.lookup(name)
            .find_map(|(_, rule)| rule.match_version(user_agent))
            .flatten()
    }

    /// 某一分类中按表顺序首个命中的规则
    pub fn first_match<'l>(
        lib: &'l CompiledRuleLibrary,
        category: RuleCategory,
        user_agent: &str,
        skip_properties: bool,
    ) -> Option<&'l CompiledRule> {
        if user_agent.is_empty() {
            return None;
        }
        Self::first_in(lib.table(category), user_agent, skip_properties)
    }

    fn first_in<'l>(
        rules: &'l [CompiledRule],
        user_agent: &str,
        skip_properties: bool,
    ) -> Option<&'l CompiledRule> {
        rules
            .iter()
            .filter(|rule| !(skip_properties && rule.is_property()))
            .find(|rule| rule.is_match(user_agent))
    }
}
