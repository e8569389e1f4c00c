//! 批量翻译调度模块
//!
//! 按 语言 → 分块 → 行 的顺序驱动翻译：
//! - 语言按配置顺序，分块按序号升序，块内按行号升序
//! - 单行失败降级为 `Unavailable`，不会中断分块或整个运行
//! - 一个分块的所有行都有结果后才写出该分块
//!
//! 块内允许最多 `max_in_flight` 行同时请求，结果按行号归位，
//! 行顺序与串行执行完全一致；`max_in_flight = 1` 即严格串行。

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::chunker::{self, Chunk};
use crate::client::TranslationClient;
use crate::error::Result;
use crate::invalid_argument;
use crate::line_source::SourceLine;
use crate::retry::{RetryingTranslator, Sleeper, TokioSleeper};
use crate::types::{LanguageTarget, OutputUnit, TranslationRow};
use crate::writer::ChunkWriter;

/// 调度参数
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    pub chunk_size: usize,
    /// 块内同时进行的最大请求数
    pub max_in_flight: usize,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            max_in_flight: 1,
        }
    }
}

/// 运行进度计数，仅用于汇报
#[derive(Debug, Default)]
pub struct Progress {
    completed_lines: AtomicUsize,
    unavailable_lines: AtomicUsize,
    written_units: AtomicUsize,
}

impl Progress {
    pub fn completed_lines(&self) -> usize {
        self.completed_lines.load(Ordering::Relaxed)
    }

    pub fn unavailable_lines(&self) -> usize {
        self.unavailable_lines.load(Ordering::Relaxed)
    }

    pub fn written_units(&self) -> usize {
        self.written_units.load(Ordering::Relaxed)
    }
}

/// 已写出的输出单元
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenUnit {
    pub language: LanguageTarget,
    pub chunk_index: usize,
    pub path: PathBuf,
    pub rows: usize,
    pub unavailable_rows: usize,
}

/// 一次运行的汇总
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub units: Vec<WrittenUnit>,
    pub lines_translated: usize,
    pub lines_unavailable: usize,
}

impl RunReport {
    /// 含有未翻译行、需要重跑的输出单元
    pub fn units_needing_rerun(&self) -> impl Iterator<Item = &WrittenUnit> {
        self.units.iter().filter(|unit| unit.unavailable_rows > 0)
    }
}

/// 批量翻译调度器
pub struct BatchDriver<S = TokioSleeper> {
    translator: RetryingTranslator<dyn TranslationClient, S>,
    writer: ChunkWriter,
    settings: DriverSettings,
    progress: Arc<Progress>,
}

impl<S: Sleeper> BatchDriver<S> {
    pub fn new(
        translator: RetryingTranslator<dyn TranslationClient, S>,
        writer: ChunkWriter,
        settings: DriverSettings,
    ) -> Self {
        Self {
            translator,
            writer,
            settings,
            progress: Arc::new(Progress::default()),
        }
    }

    /// 共享的进度计数
    pub fn progress(&self) -> Arc<Progress> {
        Arc::clone(&self.progress)
    }

    /// 翻译全部(语言, 分块)并写出
    ///
    /// 只有参数错误和文件写出错误会返回 `Err`；单行翻译失败只体现在结果里。
    pub async fn run(
        &self,
        lines: &[SourceLine],
        languages: &[LanguageTarget],
    ) -> Result<RunReport> {
        if self.settings.max_in_flight == 0 {
            return Err(invalid_argument!("max_in_flight", "并发上限必须大于0"));
        }
        if self.translator.policy().max_attempts() == 0 {
            return Err(invalid_argument!("max_attempts", "最大尝试次数必须大于0"));
        }

        // 先分块，参数错误在任何远程请求之前暴露
        let chunks = chunker::partition(lines, self.settings.chunk_size)?;
        self.writer.prepare()?;

        info!(
            "📄 共 {} 行，分为 {} 块（每块 {} 行），目标语言 {} 个",
            lines.len(),
            chunks.len(),
            self.settings.chunk_size,
            languages.len()
        );

        let mut report = RunReport::default();

        for language in languages {
            for chunk in &chunks {
                let unit = self.translate_chunk(language, chunk).await;
                let unavailable_rows = unit.unavailable_count();
                let path = self.writer.write(&unit)?;

                self.progress.written_units.fetch_add(1, Ordering::Relaxed);
                info!("✅ 已保存: {}", path.display());

                report.lines_translated += unit.rows.len() - unavailable_rows;
                report.lines_unavailable += unavailable_rows;
                report.units.push(WrittenUnit {
                    language: language.clone(),
                    chunk_index: chunk.index,
                    path,
                    rows: unit.rows.len(),
                    unavailable_rows,
                });
            }
        }

        Ok(report)
    }

    /// 翻译一个分块，结果顺序与块内行顺序一致
    async fn translate_chunk(&self, language: &LanguageTarget, chunk: &Chunk<'_>) -> OutputUnit {
        info!(
            "⏳ {} - 第 {} 块: 翻译 {} 行...",
            language,
            chunk.index,
            chunk.len()
        );
        let started = Instant::now();

        // buffered 按输入顺序产出结果，行顺序不受完成先后影响
        let rows: Vec<TranslationRow> = stream::iter(chunk.lines)
            .map(|line| async move {
                let outcome = self.translator.translate(&line.text, language).await;

                self.progress.completed_lines.fetch_add(1, Ordering::Relaxed);
                if outcome.is_unavailable() {
                    self.progress
                        .unavailable_lines
                        .fetch_add(1, Ordering::Relaxed);
                }
                debug!("第 {} 行完成 ({})", line.position, language);

                TranslationRow {
                    source: line.text.clone(),
                    outcome,
                }
            })
            .buffered(self.settings.max_in_flight)
            .collect()
            .await;

        debug!(
            "{} - 第 {} 块耗时 {:.3}秒",
            language,
            chunk.index,
            started.elapsed().as_secs_f64()
        );

        OutputUnit {
            language: language.clone(),
            chunk_index: chunk.index,
            rows,
        }
    }
}
