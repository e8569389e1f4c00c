//! 类型定义模块
//!
//! 定义目标语言、单行翻译结果以及按(语言, 分块)输出的数据单元。

use std::fmt;

/// 目标语言（显示名称，如 "Mandarin Chinese"）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTarget(String);

impl LanguageTarget {
    /// 创建目标语言，名称前后空白会被去除
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// 显示名称，用作输出表格的列名
    pub fn name(&self) -> &str {
        &self.0
    }

    /// 文件名安全的名称：非字母数字、`-`、`_` 的字符一律替换为 `_`
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

impl fmt::Display for LanguageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageTarget {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 单行翻译的最终结果
///
/// `Translated("")` 表示远端确实返回了空译文；`Unavailable` 表示重试耗尽仍未拿到译文。
/// 两者只在写出CSV时才会折叠成同一个空单元格。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// 远端返回的译文（已去除首尾空白）
    Translated(String),
    /// 重试耗尽
    Unavailable {
        /// 实际发起的尝试次数
        attempts: u32,
        /// 最后一次失败的原因
        last_error: String,
    },
}

impl TranslationOutcome {
    /// CSV单元格内容，`Unavailable` 写为空字符串
    pub fn as_cell(&self) -> &str {
        match self {
            TranslationOutcome::Translated(text) => text,
            TranslationOutcome::Unavailable { .. } => "",
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, TranslationOutcome::Unavailable { .. })
    }
}

/// 输出表格中的一行：原文 + 翻译结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub source: String,
    pub outcome: TranslationOutcome,
}

/// 一个(语言, 分块)对应的完整输出单元，所有行都已有结果
#[derive(Debug, Clone)]
pub struct OutputUnit {
    pub language: LanguageTarget,
    pub chunk_index: usize,
    pub rows: Vec<TranslationRow>,
}

impl OutputUnit {
    /// 未能翻译的行数
    pub fn unavailable_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.outcome.is_unavailable())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_file_stem() {
        assert_eq!(LanguageTarget::new("Mandarin Chinese").file_stem(), "Mandarin_Chinese");
        assert_eq!(LanguageTarget::new("  Spanish ").name(), "Spanish");
        assert_eq!(LanguageTarget::new("pt/BR").file_stem(), "pt_BR");
        assert_eq!(LanguageTarget::new("Português").file_stem(), "Português");
    }

    #[test]
    fn test_outcome_cells() {
        let translated = TranslationOutcome::Translated("Hola".to_string());
        let empty = TranslationOutcome::Translated(String::new());
        let failed = TranslationOutcome::Unavailable {
            attempts: 3,
            last_error: "timeout".to_string(),
        };

        assert_eq!(translated.as_cell(), "Hola");
        assert_eq!(empty.as_cell(), "");
        assert_eq!(failed.as_cell(), "");
        assert!(!empty.is_unavailable());
        assert!(failed.is_unavailable());
    }

    #[test]
    fn test_unavailable_count() {
        let unit = OutputUnit {
            language: LanguageTarget::new("French"),
            chunk_index: 0,
            rows: vec![
                TranslationRow {
                    source: "Hello.".to_string(),
                    outcome: TranslationOutcome::Translated("Bonjour.".to_string()),
                },
                TranslationRow {
                    source: "Bye.".to_string(),
                    outcome: TranslationOutcome::Unavailable {
                        attempts: 3,
                        last_error: "502".to_string(),
                    },
                },
            ],
        };

        assert_eq!(unit.unavailable_count(), 1);
    }
}
