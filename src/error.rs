//! 全局错误类型定义
//! 仅规则加载与编译阶段会产生错误，检测查询本身是全函数，不返回错误

use std::io::Error as IoError;

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MobileDetectError {
    // 规则相关错误
    #[error("Rule load failed: {0}")]
    RuleLoadError(String),
    #[error("Rule parse failed: {0}")]
    RuleParseError(#[from] SerdeJsonError),
    #[error("MessagePack encode/decode failed: {0}")]
    MsgPackError(String),

    // 编译相关错误
    #[error("Invalid pattern for {table}/{name}: {source}")]
    RegexCompileError {
        table: &'static str,
        name: String,
        #[source]
        source: RegexError,
    },
    #[error("Pattern for {table}/{name} has {groups} capturing groups, at most one is allowed")]
    TooManyCaptureGroups {
        table: &'static str,
        name: String,
        groups: usize,
    },
    #[error("Duplicate rule identifier {name} in {table}")]
    DuplicateRule { table: &'static str, name: String },
    #[error("Empty rule identifier at {table}[{position}]")]
    EmptyRuleName { table: &'static str, position: usize },

    // 检测相关错误
    #[error("Detector initialization failed: {0}")]
    DetectorInitError(String),

    // 基础错误
    #[error("IO operation failed: {0}")]
    IoError(#[from] IoError),
}

// 全局Result类型
pub type MdResult<T> = Result<T, MobileDetectError>;
