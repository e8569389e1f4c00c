//! 语料读取模块
//!
//! 读取"每行一句"的UTF-8文本，去除首尾空白并丢弃空行。

use std::path::Path;

use tracing::debug;

use crate::error::{Result, TranslationError};

/// 语料中的一行（已去除首尾空白，非空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 丢弃空行后的连续位置编号（从0开始）
    pub position: usize,
    pub text: String,
}

/// 从文件加载语料
pub fn load(path: impl AsRef<Path>) -> Result<Vec<SourceLine>> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| TranslationError::io(path, "读取", e))?;

    let lines = parse_lines(&content);
    debug!("从 {} 读取到 {} 行有效语料", path.display(), lines.len());

    Ok(lines)
}

/// 将文本拆分为有效行
///
/// `\n`、`\r\n` 和单独的 `\r` 都视为行结束。
pub fn parse_lines(content: &str) -> Vec<SourceLine> {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(position, text)| SourceLine {
            position,
            text: text.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_blank_lines_are_dropped_without_gaps() {
        let lines = parse_lines("Hello.\n\n   \nGood morning.\r\n\t\n  See you soon.  \n");

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello.", "Good morning.", "See you soon."]);

        let positions: Vec<usize> = lines.iter().map(|l| l.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        // 单独的 \r 也是行结束
        let lines = parse_lines("One.\rTwo.\r\rThree.\r");
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["One.", "Two.", "Three."]);
        assert_eq!(lines[2].position, 2);
    }

    #[test]
    fn test_bom_is_stripped() {
        let lines = parse_lines("\u{feff}Hello.\nBye.");
        assert_eq!(lines[0].text, "Hello.");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_lines("").is_empty());
        assert!(parse_lines("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  second  ").unwrap();

        let lines = load(file.path()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "second");
        assert_eq!(lines[1].position, 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(dir.path().join("does-not-exist.txt"));

        assert!(matches!(result, Err(TranslationError::Io { .. })));
    }
}
