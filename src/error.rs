//! 统一错误处理模块
//!
//! 两类错误严格分开：
//! - [`TranslationError`]：运行级致命错误（文件读写、配置错误），会终止整个批处理
//! - [`RemoteError`]：单次远程翻译调用失败，只在重试层内部消化，不会向上传播

// 标准库导入
use std::path::{Path, PathBuf};

// 第三方crate导入
use thiserror::Error;

/// 运行级错误类型
#[derive(Debug, Error)]
pub enum TranslationError {
    /// 文件读写失败（输入不可读、输出目录不可写）
    #[error("文件{operation}失败 [{}]: {source}", .path.display())]
    Io {
        /// 文件路径
        path: PathBuf,
        /// 操作类型（读取、写入、创建目录等）
        operation: &'static str,
        /// 底层IO错误
        #[source]
        source: std::io::Error,
    },

    /// 参数非法，在发出任何远程请求之前检出
    #[error("参数非法 [{field}]: {reason}")]
    InvalidArgument {
        /// 参数名称
        field: String,
        /// 错误原因
        reason: String,
    },

    /// 配置文件无法解析
    #[error("配置文件解析失败 [{}]: {message}", .path.display())]
    Config {
        /// 配置文件路径
        path: PathBuf,
        /// 解析器给出的错误信息
        message: String,
    },

    /// CSV序列化失败
    #[error("CSV写入失败 [{}]: {source}", .path.display())]
    Csv {
        /// 目标文件路径
        path: PathBuf,
        /// 底层CSV错误
        #[source]
        source: csv::Error,
    },
}

impl TranslationError {
    /// 包装IO错误并附带路径
    pub fn io(path: impl AsRef<Path>, operation: &'static str, source: std::io::Error) -> Self {
        TranslationError::Io {
            path: path.as_ref().to_path_buf(),
            operation,
            source,
        }
    }

    /// 是否属于配置类错误（参数非法或配置文件错误）
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TranslationError::InvalidArgument { .. } | TranslationError::Config { .. }
        )
    }
}

/// 运行级结果类型别名
pub type Result<T> = std::result::Result<T, TranslationError>;

/// 便捷的参数错误创建宏
#[macro_export]
macro_rules! invalid_argument {
    ($field:expr, $reason:expr) => {
        $crate::error::TranslationError::InvalidArgument {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
    ($field:expr, $fmt:expr, $($arg:tt)+) => {
        $crate::error::TranslationError::InvalidArgument {
            field: $field.to_string(),
            reason: format!($fmt, $($arg)+),
        }
    };
}

/// 单次远程翻译调用的失败分类
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// 网络层失败（连接、DNS、TLS等）
    #[error("网络请求失败: {0}")]
    Network(String),

    /// 请求超时
    #[error("请求超时: {0}")]
    Timeout(String),

    /// 非成功状态码
    #[error("翻译API返回错误状态 [{status}]: {body}")]
    Status {
        /// HTTP状态码
        status: u16,
        /// 响应体（可能为空）
        body: String,
    },

    /// 响应体为空或格式不符
    #[error("响应为空或格式错误: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// 是否为调用方自身问题（认证失败、请求格式错误等），重试通常无济于事
    ///
    /// 默认重试策略并不使用该判断，见 [`crate::retry::RetryPolicy::retry_if`]。
    pub fn is_client_fault(&self) -> bool {
        match self {
            RemoteError::Status { status, .. } => {
                (400..500).contains(status) && *status != 408 && *status != 429
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout(error.to_string())
        } else if let Some(status) = error.status() {
            RemoteError::Status {
                status: status.as_u16(),
                body: error.to_string(),
            }
        } else if error.is_decode() {
            RemoteError::MalformedResponse(error.to_string())
        } else {
            RemoteError::Network(error.to_string())
        }
    }
}
