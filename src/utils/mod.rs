//! 工具模块：版本归一化、请求头格式转换
pub mod header_converter;
pub mod version_extractor;

pub use self::header_converter::HeaderConverter;
pub use self::version_extractor::{VersionExtractor, VersionResult};
