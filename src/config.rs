//! 配置管理模块
//!
//! 提供CLI参数解析、TOML配置文件读取，并合并成一次性构建、不可变的 [`RunConfig`]。
//! 优先级：命令行参数 > 配置文件 > 默认值。

// 标准库导入
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

// 第三方crate导入
use clap::Parser;
use serde::Deserialize;
use tracing::info;

// 本地模块导入
use crate::api_constants::{api_config, batch_config, is_valid_api_base, DEFAULT_CONFIG_LOCATIONS};
use crate::client::ChatCompletionConfig;
use crate::driver::DriverSettings;
use crate::error::{Result, TranslationError};
use crate::invalid_argument;
use crate::retry::RetryPolicy;
use crate::types::LanguageTarget;

/// CLI参数结构
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "逐行语料批量多语言翻译工具 - 按语言和分块输出CSV", long_about = None)]
pub struct Cli {
    /// 输入语料文件（每行一句）
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// 输出目录（不存在时自动创建）
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// 目标语言，可重复指定 (如: -l Spanish -l "Mandarin Chinese")
    #[arg(short, long = "language", value_name = "NAME")]
    pub languages: Vec<String>,

    /// 每个分块的行数
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// 每行最大尝试次数
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// 失败后重试间隔（秒）
    #[arg(long)]
    pub retry_backoff_secs: Option<u64>,

    /// 块内最大并发请求数 (1 为严格串行)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// API根地址
    #[arg(long)]
    pub api_base: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// API密钥
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// 单次请求超时（秒）
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// 原文语言名称（用于提示词）
    #[arg(long)]
    pub source_language: Option<String>,

    /// 输出表格中的原文列名
    #[arg(long)]
    pub source_column: Option<String>,

    /// 不写入UTF-8 BOM
    #[arg(long)]
    pub no_bom: bool,

    /// TOML配置文件路径
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 详细输出模式
    #[arg(short, long)]
    pub verbose: bool,

    /// 静默模式 (仅输出错误)
    #[arg(short, long)]
    pub quiet: bool,

    /// 显示运行统计
    #[arg(long)]
    pub stats: bool,
}

/// TOML配置文件结构，所有字段可选
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub languages: Option<Vec<String>>,
    pub chunk_size: Option<usize>,
    pub max_attempts: Option<u32>,
    pub retry_backoff_secs: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub source_language: Option<String>,
    pub source_column: Option<String>,
    pub write_bom: Option<bool>,
}

impl FileConfig {
    /// 从TOML文件加载
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| TranslationError::io(path, "读取", e))?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| TranslationError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// 显式路径优先；否则在默认位置查找，找不到时使用空配置
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for candidate in DEFAULT_CONFIG_LOCATIONS {
            let path = Path::new(candidate);
            if path.is_file() {
                info!("📋 加载配置文件: {}", path.display());
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }
}

/// 一次运行的完整配置，启动时构建一次，之后只读
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub languages: Vec<LanguageTarget>,
    pub chunk_size: usize,
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub max_in_flight: usize,
    pub api_base: String,
    pub model: String,
    pub api_key: String,
    pub request_timeout: Duration,
    pub source_language: String,
    pub source_column: String,
    pub write_bom: bool,
}

impl RunConfig {
    /// 合并命令行与配置文件，并校验
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let input = cli
            .input
            .clone()
            .or(file.input)
            .ok_or_else(|| invalid_argument!("input", "必须指定输入文件 (--input 或配置文件 input)"))?;

        let languages: Vec<String> = if !cli.languages.is_empty() {
            cli.languages.clone()
        } else if let Some(languages) = file.languages {
            languages
        } else {
            batch_config::DEFAULT_LANGUAGES
                .iter()
                .map(|name| name.to_string())
                .collect()
        };

        let config = Self {
            input,
            output_dir: cli
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(batch_config::DEFAULT_OUTPUT_DIR)),
            languages: languages.iter().map(|name| LanguageTarget::new(name.as_str())).collect(),
            chunk_size: cli
                .chunk_size
                .or(file.chunk_size)
                .unwrap_or(batch_config::DEFAULT_CHUNK_SIZE),
            max_attempts: cli
                .max_attempts
                .or(file.max_attempts)
                .unwrap_or(batch_config::DEFAULT_MAX_ATTEMPTS),
            retry_backoff: Duration::from_secs(
                cli.retry_backoff_secs
                    .or(file.retry_backoff_secs)
                    .unwrap_or(batch_config::DEFAULT_RETRY_BACKOFF_SECONDS),
            ),
            max_in_flight: cli
                .max_in_flight
                .or(file.max_in_flight)
                .unwrap_or(batch_config::DEFAULT_MAX_IN_FLIGHT),
            api_base: cli
                .api_base
                .clone()
                .or(file.api_base)
                .unwrap_or_else(|| api_config::DEFAULT_API_BASE.to_string()),
            model: cli
                .model
                .clone()
                .or(file.model)
                .unwrap_or_else(|| api_config::DEFAULT_MODEL.to_string()),
            api_key: cli.api_key.clone().unwrap_or_default(),
            request_timeout: Duration::from_secs(
                cli.request_timeout_secs
                    .or(file.request_timeout_secs)
                    .unwrap_or(api_config::REQUEST_TIMEOUT_SECONDS),
            ),
            source_language: cli
                .source_language
                .clone()
                .or(file.source_language)
                .unwrap_or_else(|| batch_config::DEFAULT_SOURCE_LANGUAGE.to_string()),
            source_column: cli
                .source_column
                .clone()
                .or(file.source_column)
                .unwrap_or_else(|| batch_config::DEFAULT_SOURCE_COLUMN.to_string()),
            write_bom: !cli.no_bom && file.write_bom.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }

    /// 校验所有参数，任何远程请求之前执行
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(invalid_argument!("chunk_size", "分块大小必须大于0"));
        }
        if self.max_attempts == 0 {
            return Err(invalid_argument!("max_attempts", "最大尝试次数必须大于0"));
        }
        if self.max_in_flight == 0 {
            return Err(invalid_argument!("max_in_flight", "并发上限必须大于0"));
        }
        if self.languages.is_empty() {
            return Err(invalid_argument!("languages", "至少需要一个目标语言"));
        }

        // 输出文件名由语言决定，文件名相同的两个语言会互相覆盖
        let mut stems = HashSet::new();
        for language in &self.languages {
            if language.name().is_empty() {
                return Err(invalid_argument!("languages", "语言名称不能为空"));
            }
            if !stems.insert(language.file_stem()) {
                return Err(invalid_argument!(
                    "languages",
                    "语言重复或输出文件名冲突: {}",
                    language
                ));
            }
        }

        if !is_valid_api_base(&self.api_base) {
            return Err(invalid_argument!("api_base", "无效的API地址: {}", self.api_base));
        }
        if self.api_key.trim().is_empty() {
            return Err(invalid_argument!(
                "api_key",
                "缺少API密钥，请设置 {} 或使用 --api-key",
                api_config::API_KEY_ENV
            ));
        }
        if self.source_column.is_empty() {
            return Err(invalid_argument!("source_column", "原文列名不能为空"));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_backoff)
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            chunk_size: self.chunk_size,
            max_in_flight: self.max_in_flight,
        }
    }

    pub fn client_config(&self) -> ChatCompletionConfig {
        ChatCompletionConfig {
            api_base: self.api_base.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            source_language: self.source_language.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_key() -> Cli {
        Cli {
            input: Some(PathBuf::from("en.txt")),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::resolve(&cli_with_key(), FileConfig::default()).unwrap();

        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_backoff, Duration::from_secs(2));
        assert_eq!(config.max_in_flight, 1);
        assert_eq!(config.output_dir, PathBuf::from("translated_chunks"));
        assert_eq!(config.languages.len(), 10);
        assert_eq!(config.languages[0].name(), "Mandarin Chinese");
        assert_eq!(config.source_column, "source");
        assert!(config.write_bom);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig::parse(
            Path::new("test.toml"),
            r#"
                input = "corpus.txt"
                languages = ["German", "Italian"]
                chunk_size = 50
                max_attempts = 5
                write_bom = false
            "#,
        )
        .unwrap();

        let cli = Cli {
            chunk_size: Some(20),
            languages: vec!["Spanish".to_string()],
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };

        let config = RunConfig::resolve(&cli, file).unwrap();
        assert_eq!(config.input, PathBuf::from("corpus.txt"));
        assert_eq!(config.chunk_size, 20);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.languages, vec![LanguageTarget::new("Spanish")]);
        assert!(!config.write_bom);
    }

    #[test]
    fn test_example_config_parses() {
        let file = FileConfig::parse(
            Path::new("config.example.toml"),
            include_str!("../config.example.toml"),
        )
        .unwrap();

        assert_eq!(file.chunk_size, Some(1000));
        assert_eq!(file.languages.as_ref().map(Vec::len), Some(10));
        assert_eq!(file.write_bom, Some(true));
    }

    #[test]
    fn test_file_config_rejects_unknown_keys() {
        let result = FileConfig::parse(Path::new("bad.toml"), "chunk_sise = 10");
        assert!(matches!(result, Err(TranslationError::Config { .. })));
    }

    #[test]
    fn test_invalid_arguments() {
        let mut cli = cli_with_key();
        cli.chunk_size = Some(0);
        assert!(RunConfig::resolve(&cli, FileConfig::default())
            .unwrap_err()
            .is_configuration());

        let mut cli = cli_with_key();
        cli.max_attempts = Some(0);
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());

        let mut cli = cli_with_key();
        cli.api_key = None;
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());

        let mut cli = cli_with_key();
        cli.input = None;
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());

        let mut cli = cli_with_key();
        cli.api_base = Some("not a url".to_string());
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_colliding_languages_are_rejected() {
        let mut cli = cli_with_key();
        cli.languages = vec!["Spanish".to_string(), "Spanish".to_string()];
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());

        cli.languages = vec!["Mandarin Chinese".to_string(), "Mandarin_Chinese".to_string()];
        let err = RunConfig::resolve(&cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Mandarin_Chinese"));

        cli.languages = vec!["  ".to_string()];
        assert!(RunConfig::resolve(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "corpus-translate",
            "-i",
            "en.txt",
            "-l",
            "Spanish",
            "-l",
            "Mandarin Chinese",
            "--chunk-size",
            "2",
            "--max-in-flight",
            "4",
            "--no-bom",
            "--api-key",
            "sk-cli",
        ])
        .unwrap();

        assert_eq!(cli.languages, vec!["Spanish", "Mandarin Chinese"]);
        assert_eq!(cli.chunk_size, Some(2));
        assert_eq!(cli.max_in_flight, Some(4));
        assert!(cli.no_bom);

        let config = RunConfig::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(config.driver_settings().chunk_size, 2);
        assert_eq!(config.retry_policy().max_attempts(), 3);
        assert_eq!(config.client_config().api_key, "sk-cli");
        assert!(!config.write_bom);
    }
}
