//! 带重试的翻译模块
//!
//! 把不可靠的单次远程调用包装成"永不失败"的翻译操作：
//! 失败后按固定间隔重试，最多 `max_attempts` 次；全部失败时返回
//! [`TranslationOutcome::Unavailable`]，由上层继续处理下一行。

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::client::TranslationClient;
use crate::error::RemoteError;
use crate::types::{LanguageTarget, TranslationOutcome};

/// 重试间隔的等待实现，测试中可替换为不真正等待的版本
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 基于 tokio 定时器的等待
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 判断某个错误是否值得重试
pub type RetryPredicate = fn(&RemoteError) -> bool;

/// 重试策略：最大尝试次数 + 固定退避间隔 + 可重试判断
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
    retry_if: RetryPredicate,
}

impl RetryPolicy {
    /// 创建策略；默认所有远程错误都会重试（包括认证失败）
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
            retry_if: |_| true,
        }
    }

    /// 替换可重试判断，例如 `|e| !e.is_client_fault()`
    pub fn retry_if(mut self, predicate: RetryPredicate) -> Self {
        self.retry_if = predicate;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// 第 `attempt` 次（从1开始）失败后是否继续
    pub fn should_retry(&self, attempt: u32, error: &RemoteError) -> bool {
        attempt < self.max_attempts && (self.retry_if)(error)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// 带重试与失败降级的翻译器
pub struct RetryingTranslator<C: ?Sized, S = TokioSleeper> {
    client: Arc<C>,
    sleeper: S,
    policy: RetryPolicy,
}

impl<C: TranslationClient + ?Sized> RetryingTranslator<C, TokioSleeper> {
    pub fn new(client: Arc<C>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(client, policy, TokioSleeper)
    }
}

impl<C, S> RetryingTranslator<C, S>
where
    C: TranslationClient + ?Sized,
    S: Sleeper,
{
    pub fn with_sleeper(client: Arc<C>, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            client,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 翻译一行文本，不会返回错误
    ///
    /// 首次成功立即返回；每次失败记录日志并等待固定间隔；
    /// 尝试次数耗尽后返回 `Unavailable`。
    pub async fn translate(&self, text: &str, language: &LanguageTarget) -> TranslationOutcome {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.client.translate_once(text, language).await {
                Ok(translated) => return TranslationOutcome::Translated(translated),
                Err(e) => e,
            };

            warn!(
                "❌ 翻译失败 ({}) 第 {}/{} 次尝试: {}",
                language, attempt, self.policy.max_attempts, error
            );

            if !self.policy.should_retry(attempt, &error) {
                return TranslationOutcome::Unavailable {
                    attempts: attempt,
                    last_error: error.to_string(),
                };
            }

            self.sleeper.sleep(self.policy.backoff).await;
        }
    }
}
