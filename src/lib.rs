//! Corpus Translate - 逐行语料批量多语言翻译库
//!
//! 这个库提供语料读取、分块、带重试的远程翻译、批量调度和CSV分块写出等核心功能。

pub mod api_constants;
pub mod chunker;
pub mod client;
pub mod config;
pub mod driver;
pub mod error;
pub mod line_source;
pub mod retry;
pub mod stats;
pub mod types;
pub mod utils;
pub mod writer;

pub use client::{ChatCompletionClient, ChatCompletionConfig, TranslationClient};
pub use config::{Cli, FileConfig, RunConfig};
pub use driver::{BatchDriver, DriverSettings, Progress, RunReport, WrittenUnit};
pub use error::{RemoteError, Result, TranslationError};
pub use line_source::SourceLine;
pub use retry::{RetryPolicy, RetryingTranslator, Sleeper, TokioSleeper};
pub use types::{LanguageTarget, OutputUnit, TranslationOutcome, TranslationRow};
pub use writer::ChunkWriter;
