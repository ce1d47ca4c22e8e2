use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use http::{HeaderMap, HeaderName, HeaderValue};
use rsmobiledetect::{init_mobiledetect_with_config, ConfigManager, DetectReport, MobileDetect};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rsmobiledetect")]
#[command(about = "Classify a request as phone, tablet or desktop", long_about = None)]
#[command(version)]
struct Cli {
    /// User-Agent to classify (overrides any User-Agent header)
    #[arg(short = 'u', long = "user-agent")]
    user_agent: Option<String>,

    /// Request header as "Name: value", repeatable
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Custom rule dataset (JSON)
    #[arg(long = "rules")]
    rules: Option<PathBuf>,

    /// MessagePack rule cache path
    #[arg(long = "cache")]
    cache: Option<PathBuf>,

    /// Identifier to test with is(), repeatable
    #[arg(long = "is")]
    is: Vec<String>,

    /// Identifier to extract a version for, repeatable
    #[arg(long = "version-of")]
    version_of: Vec<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct VersionOutput {
    version: String,
    float: f64,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    report: DetectReport,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    is: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    versions: BTreeMap<String, VersionOutput>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // 1. 加载规则库
    let mut builder = ConfigManager::custom();
    if let Some(rules) = cli.rules.clone() {
        builder = builder.rule_source(rules);
    }
    if let Some(cache) = cli.cache.clone() {
        builder = builder.rule_cache_path(cache);
    }
    init_mobiledetect_with_config(builder.build())
        .await
        .context("failed to load rule library")?;

    // 2. 设置请求数据
    let mut detect = MobileDetect::new()?;
    detect.set_header_map(&parse_headers(&cli.headers)?);
    if let Some(ua) = cli.user_agent {
        detect.set_user_agent(ua);
    }

    // 3. 输出结果
    let output = Output {
        report: detect.report(),
        is: cli
            .is
            .iter()
            .map(|name| (name.clone(), detect.is(name)))
            .collect(),
        versions: cli
            .version_of
            .iter()
            .map(|name| {
                let v = VersionOutput {
                    version: detect.version(name),
                    float: detect.version_float(name),
                };
                (name.clone(), v)
            })
            .collect(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&output);
    }
    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for line in raw {
        let (name, value) = line
            .split_once(':')
            .with_context(|| format!("invalid header {line:?}, expected \"Name: value\""))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("invalid header name in {line:?}"))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("invalid header value in {line:?}"))?;
        headers.append(name, value);
    }
    Ok(headers)
}

fn print_text(output: &Output) {
    println!("{}", output.report);
    println!("mobile headers: {}", output.report.mobile_headers);
    for (name, hit) in &output.is {
        println!("is {name}: {hit}");
    }
    for (name, v) in &output.versions {
        println!("version {name}: {:?} ({})", v.version, v.float);
    }
}
