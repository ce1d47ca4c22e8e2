//! 规则编译器核心
//! 仅负责将原始规则编译为可执行的正则模式，任何非法规则都会中止编译

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use regex::{Regex, RegexBuilder};

use super::pattern::{CompiledDisambiguator, CompiledRule, CompiledRuleLibrary, RuleCategory, RuleRef};
use crate::error::{MdResult, MobileDetectError};
use crate::rule::{RuleEntry, RuleLibrary, TabletDisambiguator};

const MOBILE_SIGNALS_TABLE: &str = "mobile_signals";
const TABLET_DISAMBIGUATORS_TABLE: &str = "tablet_disambiguators";

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则库
    pub fn compile(rule_lib: &RuleLibrary) -> MdResult<CompiledRuleLibrary> {
        let start = Instant::now();

        // 1. 按分类编译，保持规则库顺序
        let phones = Self::compile_table(RuleCategory::Phone.as_str(), &rule_lib.phones)?;
        let tablets = Self::compile_table(RuleCategory::Tablet.as_str(), &rule_lib.tablets)?;
        let operating_systems = Self::compile_table(
            RuleCategory::OperatingSystem.as_str(),
            &rule_lib.operating_systems,
        )?;
        let browsers = Self::compile_table(RuleCategory::Browser.as_str(), &rule_lib.browsers)?;
        let mobile_signals = Self::compile_table(MOBILE_SIGNALS_TABLE, &rule_lib.mobile_signals)?;
        let tablet_disambiguators = Self::compile_disambiguators(&rule_lib.tablet_disambiguators)?;
        let tables = [phones, tablets, operating_systems, browsers];

        // 2. 构建标识符索引（按查找顺序）
        let name_index = Self::build_name_index(&tables);

        log_debug!(
            "✅ 规则编译完成，数据集版本{}，总耗时{:?}",
            rule_lib.version,
            start.elapsed()
        );
        log_debug!(
            "📊 编译统计：手机{}条、平板{}条、系统{}条、浏览器/属性{}条、通用移动特征{}条、平板消歧{}条",
            tables[0].len(),
            tables[1].len(),
            tables[2].len(),
            tables[3].len(),
            mobile_signals.len(),
            tablet_disambiguators.len()
        );

        Ok(CompiledRuleLibrary {
            version: rule_lib.version.clone(),
            tables,
            name_index,
            mobile_signals,
            tablet_disambiguators,
            user_agent_headers: rule_lib.user_agent_headers.clone(),
            header_heuristics: rule_lib.header_heuristics.clone(),
        })
    }

    /// 编译单个分类，校验标识符非空且分类内唯一
    fn compile_table(table: &'static str, entries: &[RuleEntry]) -> MdResult<Vec<CompiledRule>> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut compiled = Vec::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(MobileDetectError::EmptyRuleName { table, position });
            }
            if !seen.insert(entry.name.to_ascii_lowercase()) {
                return Err(MobileDetectError::DuplicateRule {
                    table,
                    name: entry.name.clone(),
                });
            }
            compiled.push(Self::compile_single_pattern(table, entry)?);
        }

        Ok(compiled)
    }

    /// 编译平板消歧规则，校验方式与普通规则表一致
    fn compile_disambiguators(
        entries: &[TabletDisambiguator],
    ) -> MdResult<Vec<CompiledDisambiguator>> {
        let table = TABLET_DISAMBIGUATORS_TABLE;
        let mut seen = HashSet::with_capacity(entries.len());
        let mut compiled = Vec::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(MobileDetectError::EmptyRuleName { table, position });
            }
            if !seen.insert(entry.name.to_ascii_lowercase()) {
                return Err(MobileDetectError::DuplicateRule {
                    table,
                    name: entry.name.clone(),
                });
            }
            let exclude = entry
                .exclude
                .as_deref()
                .map(|pattern| Self::build_regex(table, &entry.name, pattern))
                .transpose()?;
            compiled.push(CompiledDisambiguator {
                name: entry.name.clone(),
                regex: Self::build_regex(table, &entry.name, &entry.pattern)?,
                exclude,
            });
        }

        Ok(compiled)
    }

    fn build_regex(table: &'static str, name: &str, pattern: &str) -> MdResult<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| MobileDetectError::RegexCompileError {
                table,
                name: name.to_string(),
                source,
            })
    }

    /// 编译单条规则（忽略大小写，最多一个捕获组）
    fn compile_single_pattern(table: &'static str, entry: &RuleEntry) -> MdResult<CompiledRule> {
        let regex = Self::build_regex(table, &entry.name, &entry.pattern)?;

        // captures_len 包含整体匹配（第 0 组）
        let groups = regex.captures_len() - 1;
        if groups > 1 {
            return Err(MobileDetectError::TooManyCaptureGroups {
                table,
                name: entry.name.clone(),
                groups,
            });
        }

        Ok(CompiledRule {
            name: entry.name.clone(),
            regex,
            property: entry.property,
        })
    }

    fn build_name_index(tables: &[Vec<CompiledRule>; 4]) -> HashMap<String, Vec<RuleRef>> {
        let mut name_index: HashMap<String, Vec<RuleRef>> = HashMap::new();
        for category in RuleCategory::SEARCH_ORDER {
            for (position, rule) in tables[category.index()].iter().enumerate() {
                name_index
                    .entry(rule.name.to_ascii_lowercase())
                    .or_default()
                    .push(RuleRef { category, position });
            }
        }
        name_index
    }
}
