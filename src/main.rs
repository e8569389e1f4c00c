use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};

use corpus_translate::config::{Cli, FileConfig, RunConfig};
use corpus_translate::stats::{format_duration, print_run_stats, RunStats};
use corpus_translate::utils::{init_logging, validate_input_file};
use corpus_translate::{
    line_source, BatchDriver, ChatCompletionClient, ChunkWriter, RetryingTranslator,
    TranslationClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 中的 OPENROUTER_API_KEY 需要在解析参数之前载入
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    // 初始化日志系统
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = &dotenv {
        if !e.not_found() {
            warn!("⚠️  .env 文件读取失败: {}", e);
        }
    }

    if let Err(e) = run(&cli).await {
        error!("❌ 翻译失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    let started_at = Local::now();
    let total_start = Instant::now();

    let file_config = FileConfig::discover(cli.config.as_deref()).context("读取配置文件失败")?;
    let config = RunConfig::resolve(cli, file_config)?;

    validate_input_file(&config.input)?;

    info!("🚀 启动批量翻译");
    info!("📂 输入文件: {}", config.input.display());
    info!("📁 输出目录: {}", config.output_dir.display());
    info!(
        "🌐 目标语言: {}",
        config
            .languages
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // 读取语料
    let load_start = Instant::now();
    let lines = line_source::load(&config.input)?;
    let load_duration = load_start.elapsed();
    info!(
        "📄 读取 {} 行，分块大小 {}",
        lines.len(),
        config.chunk_size
    );

    // 组装翻译链路
    let client: Arc<dyn TranslationClient> = Arc::new(
        ChatCompletionClient::new(config.client_config()).context("创建翻译客户端失败")?,
    );
    let translator = RetryingTranslator::new(client, config.retry_policy());
    let writer = ChunkWriter::new(&config.output_dir)
        .with_source_column(&config.source_column)
        .with_bom(config.write_bom);
    let driver = BatchDriver::new(translator, writer, config.driver_settings());

    // 执行翻译
    let translate_start = Instant::now();
    let report = driver.run(&lines, &config.languages).await?;
    let translate_duration = translate_start.elapsed();
    let total_duration = total_start.elapsed();

    info!(
        "✅ 翻译完成！写出 {} 个文件，总耗时: {}",
        report.units.len(),
        format_duration(total_duration)
    );
    if report.lines_unavailable > 0 {
        warn!(
            "⚠️  {} 行重试耗尽未能翻译，对应单元格为空",
            report.lines_unavailable
        );
    }

    // 显示运行统计
    if cli.stats || cli.verbose {
        let stats = RunStats::from_report(
            started_at,
            load_duration,
            translate_duration,
            lines.len(),
            config.languages.len(),
            &report,
        );
        print_run_stats(&stats, &report, total_duration);
    }

    Ok(())
}
