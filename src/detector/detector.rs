//! 检测器核心：持有单次请求的 Header 与 User-Agent，整合各分析器输出检测结果
use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderMap, Request};

use super::analyzer::{HeaderAnalyzer, UserAgentAnalyzer};
use crate::compiler::{CompiledRule, CompiledRuleLibrary, RuleCategory};
use crate::error::MdResult;
use crate::rule::model::{DetectReport, DeviceKind};
use crate::utils::{HeaderConverter, VersionExtractor, VersionResult};

/// 移动设备检测器
/// 每个请求创建一个实例，不在请求间共享；规则库通过 Arc 只读共享
#[derive(Debug, Clone)]
pub struct MobileDetect {
    rules: Arc<CompiledRuleLibrary>,
    http_headers: HashMap<String, String>,
    user_agent: String,
}

impl MobileDetect {
    /// 使用共享规则库创建检测器
    pub fn new() -> MdResult<Self> {
        Ok(Self::with_rules(super::global::shared_rules()?))
    }

    /// 使用指定规则库创建检测器
    pub fn with_rules(rules: Arc<CompiledRuleLibrary>) -> Self {
        Self {
            rules,
            http_headers: HashMap::new(),
            user_agent: String::new(),
        }
    }

    /// 从 http::Request 创建检测器（Header 转为 HTTP_ 前缀形式，并写入 REQUEST_METHOD）
    pub fn from_request<B>(request: &Request<B>) -> MdResult<Self> {
        let mut detect = Self::new()?;
        let mut headers = HeaderConverter::to_server_variables(request.headers());
        headers.insert("REQUEST_METHOD".to_string(), request.method().as_str().to_string());
        detect.set_http_headers(headers);
        Ok(detect)
    }

    pub fn rules(&self) -> &Arc<CompiledRuleLibrary> {
        &self.rules
    }

    /// 整体替换 Header，并按规则库的 UA 头列表重新推导 User-Agent
    pub fn set_http_headers(&mut self, headers: HashMap<String, String>) {
        self.http_headers = headers;
        self.user_agent = self.derive_user_agent();
        log_trace!("设置 Header {} 个，User-Agent：{}", self.http_headers.len(), self.user_agent);
    }

    /// 以 http::HeaderMap 设置 Header
    pub fn set_header_map(&mut self, header_map: &HeaderMap) {
        self.set_http_headers(HeaderConverter::to_server_variables(header_map));
    }

    pub fn http_headers(&self) -> &HashMap<String, String> {
        &self.http_headers
    }

    /// 显式设置 User-Agent，覆盖由 Header 推导的值
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.user_agent = user_agent.into();
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 仅按快速请求头判定是否移动端
    pub fn check_http_headers_for_mobile(&self) -> bool {
        HeaderAnalyzer::check_headers_for_mobile(self.rules.header_heuristics(), &self.http_headers)
    }

    pub fn is_mobile(&self) -> bool {
        self.check_http_headers_for_mobile()
            || UserAgentAnalyzer::is_mobile(&self.rules, &self.user_agent)
    }

    pub fn is_tablet(&self) -> bool {
        UserAgentAnalyzer::is_tablet(&self.rules, &self.user_agent)
    }

    /// 标识符是否命中（忽略大小写；未知标识符返回 false）
    pub fn is(&self, name: &str) -> bool {
        UserAgentAnalyzer::is(&self.rules, &self.user_agent, name)
    }

    /// 规范化版本字符串，无版本时为空串
    pub fn version(&self, name: &str) -> String {
        self.version_info(name)
            .map(|v| v.canonical)
            .unwrap_or_default()
    }

    /// 版本浮点值，无版本时为 0.0
    pub fn version_float(&self, name: &str) -> f64 {
        self.version_info(name).map_or(0.0, |v| v.value)
    }

    /// 完整版本信息（原始文本、规范化字符串、浮点值）
    pub fn version_info(&self, name: &str) -> Option<VersionResult> {
        let raw = UserAgentAnalyzer::version_raw(&self.rules, &self.user_agent, name)?;
        VersionExtractor::normalize(raw)
    }

    /// 设备类型：平板优先，其次手机，否则桌面
    pub fn device_kind(&self) -> DeviceKind {
        if self.is_tablet() {
            DeviceKind::Tablet
        } else if self.is_mobile() {
            DeviceKind::Phone
        } else {
            DeviceKind::Desktop
        }
    }

    /// 生成检测报告
    pub fn report(&self) -> DetectReport {
        let ua = self.user_agent.as_str();
        let first = |category| UserAgentAnalyzer::first_match(&self.rules, category, ua, true);

        // 1. 设备型号
        let phone = first(RuleCategory::Phone).map(|r| r.name().to_string());
        let tablet = first(RuleCategory::Tablet).map(|r| r.name().to_string());

        // 2. 操作系统与浏览器（浏览器表中的属性项不参与）
        let os = first(RuleCategory::OperatingSystem);
        let browser = first(RuleCategory::Browser);

        DetectReport {
            device: self.device_kind(),
            mobile_headers: self.check_http_headers_for_mobile(),
            user_agent: self.user_agent.clone(),
            phone,
            tablet,
            os: os.map(|r| r.name().to_string()),
            os_version: os.and_then(|r| rule_version(r, ua)),
            browser: browser.map(|r| r.name().to_string()),
            browser_version: browser.and_then(|r| rule_version(r, ua)),
        }
    }

    fn derive_user_agent(&self) -> String {
        self.rules
            .user_agent_headers()
            .iter()
            .filter_map(|name| self.http_headers.get(name))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn rule_version(rule: &CompiledRule, user_agent: &str) -> Option<String> {
    let raw = rule.match_version(user_agent).flatten()?;
    VersionExtractor::normalize(raw).map(|v| v.canonical)
}

#[cfg(all(test, feature = "embedded-rules"))]
mod tests {
    use super::*;
    use crate::compiler::RuleCompiler;
    use crate::rule::{
        HeaderCondition, HeaderHeuristicSpec, HeaderIndicator, RuleLibrary, TabletDisambiguator,
    };

    const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 6_0 like Mac OS X) AppleWebKit/536.26 (KHTML, like Gecko) Version/6.0 Mobile/10A5376e Safari/8536.25";
    const IPAD_UA: &str = "Mozilla/5.0 (iPad; CPU OS 5_1_1 like Mac OS X) AppleWebKit/534.46 (KHTML, like Gecko) Version/5.1 Mobile/9B206 Safari/7534.48.3";
    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    fn detect_with(pairs: &[(&str, &str)]) -> MobileDetect {
        let mut detect = MobileDetect::new().unwrap();
        detect.set_http_headers(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        detect
    }

    #[test]
    fn test_user_agent_derived_from_headers() {
        let detect = detect_with(&[
            ("HTTP_USER_AGENT", " Opera/9.80 (J2ME/MIDP; Opera Mini/5.0) "),
            ("HTTP_X_OPERAMINI_PHONE_UA", "SonyEricssonK750i"),
            ("HTTP_X_DEVICE_USER_AGENT", ""),
        ]);
        assert_eq!(
            detect.user_agent(),
            "Opera/9.80 (J2ME/MIDP; Opera Mini/5.0) SonyEricssonK750i"
        );
    }

    #[test]
    fn test_set_user_agent_overrides_and_headers_replace() {
        let mut detect = detect_with(&[("HTTP_USER_AGENT", DESKTOP_UA)]);
        detect.set_user_agent(IPHONE_UA);
        assert!(detect.is("iphone"));

        detect.set_http_headers(HashMap::new());
        assert_eq!(detect.user_agent(), "");
        assert!(detect.http_headers().is_empty());
        assert!(!detect.is_mobile());
    }

    #[test]
    fn test_iphone_identity() {
        let detect = detect_with(&[("HTTP_USER_AGENT", IPHONE_UA)]);
        assert!(detect.is_mobile());
        assert!(!detect.is_tablet());
        assert!(detect.is("iphone"));
        assert!(detect.is("ios"));
        assert!(!detect.is("whatever"));
        assert_eq!(detect.version("iOS"), "6.0");
        assert_eq!(detect.version_float("iOS"), 6.0);
        assert_eq!(detect.device_kind(), DeviceKind::Phone);
    }

    #[test]
    fn test_ipad_is_mobile_and_tablet() {
        let detect = detect_with(&[("HTTP_USER_AGENT", IPAD_UA)]);
        assert!(detect.is_mobile());
        assert!(detect.is_tablet());
        assert_eq!(detect.version("iPad"), "5.1.1");
        assert_eq!(detect.version_float("iPad"), 5.11);

        let report = detect.report();
        assert_eq!(report.device, DeviceKind::Tablet);
        assert_eq!(report.tablet.as_deref(), Some("iPad"));
        assert_eq!(report.os.as_deref(), Some("iOS"));
        assert_eq!(report.os_version.as_deref(), Some("5.1.1"));
    }

    #[test]
    fn test_desktop_report() {
        let detect = detect_with(&[("HTTP_USER_AGENT", DESKTOP_UA)]);
        assert!(!detect.is_mobile());
        assert!(!detect.is_tablet());

        let report = detect.report();
        assert_eq!(report.device, DeviceKind::Desktop);
        assert_eq!(report.phone, None);
        assert_eq!(report.browser.as_deref(), Some("Chrome"));
        assert_eq!(report.browser_version.as_deref(), Some("120.0.0.0"));
    }

    #[test]
    fn test_empty_user_agent_without_quick_headers() {
        let detect = detect_with(&[("HTTP_USER_AGENT", "")]);
        assert!(!detect.is_mobile());
        assert!(!detect.is_tablet());
        for name in ["iPhone", "AndroidOS", "Chrome", "Mobile", "whatever"] {
            assert!(!detect.is(name));
            assert_eq!(detect.version(name), "");
            assert_eq!(detect.version_float(name), 0.0);
        }
    }

    #[test]
    fn test_quick_headers_imply_mobile() {
        let detect = detect_with(&[
            ("HTTP_USER_AGENT", DESKTOP_UA),
            ("HTTP_X_WAP_PROFILE", "http://wap.samsungmobile.com/uaprof/SGH-I777.xml"),
        ]);
        assert!(detect.check_http_headers_for_mobile());
        assert!(detect.is_mobile());
    }

    #[test]
    fn test_reduced_heuristic_table() {
        let rules = shared_rules_with(HeaderHeuristicSpec {
            accept: vec![HeaderIndicator::new("HTTP_X_CUSTOM_MOBILE", HeaderCondition::Present)],
            reject: vec![],
        });
        let mut detect = MobileDetect::with_rules(rules);

        detect.set_http_headers(HashMap::from([(
            "HTTP_X_WAP_PROFILE".to_string(),
            "profile".to_string(),
        )]));
        assert!(!detect.check_http_headers_for_mobile());

        detect.set_http_headers(HashMap::from([(
            "HTTP_X_CUSTOM_MOBILE".to_string(),
            String::new(),
        )]));
        assert!(detect.check_http_headers_for_mobile());
    }

    #[test]
    fn test_tablet_implies_mobile_with_custom_rules() {
        let lib = RuleLibrary {
            version: "custom".to_string(),
            tablet_disambiguators: vec![
                TabletDisambiguator::new("AndroidWithoutMobile", r"\bAndroid\b").excluding(r"\bMobile\b"),
            ],
            ..Default::default()
        };
        let mut detect = MobileDetect::with_rules(Arc::new(RuleCompiler::compile(&lib).unwrap()));
        detect.set_user_agent(
            "Mozilla/5.0 (Linux; Android 4.0.4; ARCHOS 80G9 Build/IMM76D) Safari/535.19",
        );

        assert!(detect.is_tablet());
        assert!(detect.is_mobile());
        assert_eq!(detect.device_kind(), DeviceKind::Tablet);
    }

    #[test]
    fn test_queries_are_idempotent() {
        let detect = detect_with(&[("HTTP_USER_AGENT", IPAD_UA)]);
        assert_eq!(detect.is_mobile(), detect.is_mobile());
        assert_eq!(detect.version("Webkit"), detect.version("Webkit"));
        assert_eq!(detect.report(), detect.report());
    }

    #[test]
    fn test_from_request() {
        let request = Request::builder()
            .method("DELETE")
            .header("User-Agent", IPHONE_UA)
            .header("X-Wap-Profile", "profile")
            .body(())
            .unwrap();
        let detect = MobileDetect::from_request(&request).unwrap();

        assert_eq!(detect.user_agent(), IPHONE_UA);
        assert_eq!(detect.http_headers().get("REQUEST_METHOD").map(String::as_str), Some("DELETE"));
        // DELETE 命中 reject，但 UA 仍判定为移动端
        assert!(!detect.check_http_headers_for_mobile());
        assert!(detect.is_mobile());
    }

    fn shared_rules_with(spec: HeaderHeuristicSpec) -> Arc<CompiledRuleLibrary> {
        let rules = crate::detector::shared_rules().unwrap();
        Arc::new((*rules).clone().with_header_heuristics(spec))
    }
}
