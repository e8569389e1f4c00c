/// 翻译API与运行参数常量
///
/// 该文件集中定义所有默认值，CLI和配置文件未指定时使用

/// 默认翻译API配置
pub mod api_config {
    /// 默认API根地址（OpenRouter，OpenAI兼容）
    pub const DEFAULT_API_BASE: &str = "https://openrouter.ai/api/v1";

    /// 默认模型
    pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

    /// API密钥环境变量名
    pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

    /// 请求超时时间（秒）
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 60;
}

/// 批处理配置
pub mod batch_config {
    /// 默认分块大小（行）
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;

    /// 每行默认最大尝试次数
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// 默认重试间隔（秒），固定间隔不递增
    pub const DEFAULT_RETRY_BACKOFF_SECONDS: u64 = 2;

    /// 默认块内并发请求数，1 即严格串行
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;

    /// 默认输出目录
    pub const DEFAULT_OUTPUT_DIR: &str = "translated_chunks";

    /// 默认原文语言（写入提示词）
    pub const DEFAULT_SOURCE_LANGUAGE: &str = "English";

    /// 默认原文列名
    pub const DEFAULT_SOURCE_COLUMN: &str = "source";

    /// 默认目标语言列表
    pub const DEFAULT_LANGUAGES: &[&str] = &[
        "Mandarin Chinese",
        "Spanish",
        "French",
        "German",
        "Italian",
        "Japanese",
        "Hindi",
        "Urdu",
        "Portuguese",
        "Arabic",
    ];
}

/// 默认配置文件查找位置
pub const DEFAULT_CONFIG_LOCATIONS: &[&str] = &["corpus-translate.toml", ".corpus-translate.toml"];

/// 验证API地址是否有效
pub fn is_valid_api_base(api_base: &str) -> bool {
    match url::Url::parse(api_base) {
        Ok(url) => (url.scheme() == "http" || url.scheme() == "https") && url.host().is_some(),
        Err(_) => false,
    }
}
