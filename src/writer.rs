//! 分块结果写出模块
//!
//! 每个(语言, 分块)写成一个CSV文件：`{语言}_chunk_{序号:03}.csv`，
//! 表头为 `[source, <语言名>]`。同一配置重复运行会覆盖同一路径。

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TranslationError};
use crate::types::{LanguageTarget, OutputUnit};

/// UTF-8 BOM，便于表格软件正确识别编码
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV分块写出器
#[derive(Debug, Clone)]
pub struct ChunkWriter {
    output_dir: PathBuf,
    source_column: String,
    write_bom: bool,
}

impl ChunkWriter {
    /// 创建写出器，默认原文列名为 `source` 并写入BOM
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            source_column: "source".to_string(),
            write_bom: true,
        }
    }

    /// 设置原文列名
    pub fn with_source_column(mut self, name: &str) -> Self {
        self.source_column = name.to_string();
        self
    }

    /// 设置是否写入UTF-8 BOM
    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 创建输出目录（已存在时无操作）
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| TranslationError::io(&self.output_dir, "创建目录", e))
    }

    /// 输出单元对应的文件路径，只由(语言, 分块序号)决定
    pub fn unit_path(&self, language: &LanguageTarget, chunk_index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_chunk_{:03}.csv", language.file_stem(), chunk_index))
    }

    /// 写出一个完整的输出单元，返回最终路径
    ///
    /// 先写入 `.partial` 临时文件再重命名，最终路径上不会出现写了一半的文件。
    pub fn write(&self, unit: &OutputUnit) -> Result<PathBuf> {
        self.prepare()?;

        let final_path = self.unit_path(&unit.language, unit.chunk_index);
        let partial_path = final_path.with_extension("csv.partial");

        let written = self.write_csv(&partial_path, unit).and_then(|()| {
            fs::rename(&partial_path, &final_path)
                .map_err(|e| TranslationError::io(&final_path, "重命名", e))
        });
        if let Err(e) = written {
            // 失败时不留下半成品
            let _ = fs::remove_file(&partial_path);
            return Err(e);
        }

        debug!("写出 {} ({} 行)", final_path.display(), unit.rows.len());
        Ok(final_path)
    }

    fn write_csv(&self, path: &Path, unit: &OutputUnit) -> Result<()> {
        let file = File::create(path).map_err(|e| TranslationError::io(path, "创建", e))?;
        let mut buffered = BufWriter::new(file);

        if self.write_bom {
            buffered
                .write_all(UTF8_BOM)
                .map_err(|e| TranslationError::io(path, "写入", e))?;
        }

        let csv_error = |source| TranslationError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::Writer::from_writer(buffered);
        writer
            .write_record([self.source_column.as_str(), unit.language.name()])
            .map_err(csv_error)?;

        for row in &unit.rows {
            writer
                .write_record([row.source.as_str(), row.outcome.as_cell()])
                .map_err(csv_error)?;
        }

        writer
            .flush()
            .map_err(|e| TranslationError::io(path, "写入", e))
    }
}
