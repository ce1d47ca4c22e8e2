//! 编译模块：将原始规则编译为可执行的正则模式
pub mod compiler;
pub mod pattern;

pub use self::compiler::RuleCompiler;
pub use self::pattern::{CompiledDisambiguator, CompiledRule, CompiledRuleLibrary, RuleCategory, RuleRef};
