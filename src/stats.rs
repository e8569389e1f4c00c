use std::time::Duration;

use chrono::{DateTime, Local};

use crate::driver::RunReport;

/// 运行统计
#[derive(Debug)]
pub struct RunStats {
    pub started_at: DateTime<Local>,
    pub load_time: Duration,
    pub translation_time: Duration,
    pub lines_loaded: usize,
    pub languages: usize,
    pub units_written: usize,
    pub lines_translated: usize,
    pub lines_unavailable: usize,
}

impl RunStats {
    pub fn from_report(
        started_at: DateTime<Local>,
        load_time: Duration,
        translation_time: Duration,
        lines_loaded: usize,
        languages: usize,
        report: &RunReport,
    ) -> Self {
        Self {
            started_at,
            load_time,
            translation_time,
            lines_loaded,
            languages,
            units_written: report.units.len(),
            lines_translated: report.lines_translated,
            lines_unavailable: report.lines_unavailable,
        }
    }

    /// 成功翻译的行占比（百分比）
    pub fn success_rate(&self) -> f64 {
        let total = self.lines_translated + self.lines_unavailable;
        if total == 0 {
            100.0
        } else {
            self.lines_translated as f64 / total as f64 * 100.0
        }
    }
}

/// 打印运行统计
pub fn print_run_stats(stats: &RunStats, report: &RunReport, total_duration: Duration) {
    println!("\n📊 运行统计报告:");
    println!("═══════════════════════════════════════");
    println!("   开始时间: {}", stats.started_at.format("%Y-%m-%d %H:%M:%S"));

    // 时间分解
    println!("⏱️  时间分解:");
    println!("   语料读取: {}", format_duration(stats.load_time));
    println!("   翻译执行: {}", format_duration(stats.translation_time));
    println!("   总耗时: {}", format_duration(total_duration));

    // 翻译统计
    println!("\n🔤 翻译统计:");
    println!("   语料行数: {} 行", stats.lines_loaded);
    println!("   目标语言: {} 个", stats.languages);
    println!("   输出文件: {} 个", stats.units_written);
    println!("   成功翻译: {} 行", stats.lines_translated);
    println!("   未能翻译: {} 行", stats.lines_unavailable);
    println!("   成功率: {:.1}%", stats.success_rate());

    let rerun: Vec<_> = report.units_needing_rerun().collect();
    if !rerun.is_empty() {
        println!("\n⚠️  以下文件含有空译文，可重新运行:");
        for unit in rerun {
            println!(
                "   {} ({}/{} 行未翻译)",
                unit.path.display(),
                unit.unavailable_rows,
                unit.rows
            );
        }
    }

    if total_duration.as_secs_f64() > 0.0 {
        println!("\n🚀 处理速度:");
        println!(
            "   {:.2} 行/秒",
            (stats.lines_translated + stats.lines_unavailable) as f64
                / total_duration.as_secs_f64()
        );
    }
}

/// 格式化持续时间
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.3}s", duration.as_secs_f64())
    }
}
