//! Header格式转换工具
//! 将 http::HeaderMap 转换为服务器变量风格（`HTTP_USER_AGENT`）的单值映射

use std::collections::HashMap;

use http::header::HeaderMap;

/// 单个请求允许转换的最大 Header 数
const MAX_HEADERS: usize = 1000;

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 转换为服务器变量名：加 `HTTP_` 前缀、转大写、`-` 替换为 `_`
    /// `Content-Type` / `Content-Length` 按 CGI 约定不加前缀
    pub fn server_variable_name(name: &str) -> String {
        let upper = name.trim().to_ascii_uppercase().replace('-', "_");
        match upper.as_str() {
            "CONTENT_TYPE" | "CONTENT_LENGTH" => upper,
            _ => format!("HTTP_{}", upper),
        }
    }

    /// 将HeaderMap转换为HashMap<String, String>
    /// 同名 Header 以 `, ` 合并，非 UTF-8 值按有损方式转换
    pub fn to_server_variables(header_map: &HeaderMap) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = HashMap::new();

        for (index, (key, value)) in header_map.iter().enumerate() {
            if index >= MAX_HEADERS {
                log_warn!("Header数量超过{}条，忽略剩余Header", MAX_HEADERS);
                break;
            }

            let value_str = String::from_utf8_lossy(value.as_bytes());
            map.entry(Self::server_variable_name(key.as_str()))
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value_str);
                })
                .or_insert_with(|| value_str.into_owned());
        }

        log_trace!("Header转换完成，生成{}条记录", map.len());
        map
    }
}
