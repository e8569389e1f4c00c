//! 语料分块模块
//!
//! 按固定大小把有序的行序列切成互不重叠的连续窗口，只有最后一块可能更短。

use crate::error::Result;
use crate::invalid_argument;
use crate::line_source::SourceLine;

/// 一个分块：连续的若干行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub index: usize,
    pub lines: &'a [SourceLine],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 本块第一行在语料中的位置
    pub fn start_position(&self) -> usize {
        self.lines.first().map(|line| line.position).unwrap_or(0)
    }
}

/// 分块数量：`ceil(total / chunk_size)`
pub fn chunk_count(total: usize, chunk_size: usize) -> Result<usize> {
    if chunk_size == 0 {
        return Err(invalid_argument!("chunk_size", "分块大小必须大于0"));
    }
    Ok(total.div_ceil(chunk_size))
}

/// 按 `chunk_size` 切分行序列
///
/// 第 `i` 块覆盖 `[i*chunk_size, min((i+1)*chunk_size, len))`。
pub fn partition(lines: &[SourceLine], chunk_size: usize) -> Result<Vec<Chunk<'_>>> {
    if chunk_size == 0 {
        return Err(invalid_argument!("chunk_size", "分块大小必须大于0"));
    }

    Ok(lines
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, lines)| Chunk { index, lines })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranslationError;
    use crate::line_source::parse_lines;

    fn corpus(n: usize) -> Vec<SourceLine> {
        let text: Vec<String> = (0..n).map(|i| format!("line {}", i)).collect();
        parse_lines(&text.join("\n"))
    }

    #[test]
    fn test_partition_sizes() {
        for n in [0usize, 1, 2, 7, 10, 11, 1000, 1001] {
            for size in [1usize, 2, 3, 10, 1000] {
                let lines = corpus(n);
                let chunks = partition(&lines, size).unwrap();

                assert_eq!(chunks.len(), chunk_count(n, size).unwrap());
                assert_eq!(chunks.iter().map(Chunk::len).sum::<usize>(), n);

                for (i, chunk) in chunks.iter().enumerate() {
                    assert_eq!(chunk.index, i);
                    assert!(chunk.len() <= size);
                    assert!(!chunk.is_empty());
                    if i + 1 < chunks.len() {
                        assert_eq!(chunk.len(), size, "only the last chunk may be short");
                    }
                }
            }
        }
    }

    #[test]
    fn test_concatenation_reconstructs_corpus() {
        let lines = corpus(23);
        let chunks = partition(&lines, 5).unwrap();

        let rebuilt: Vec<SourceLine> = chunks
            .iter()
            .flat_map(|chunk| chunk.lines.iter().cloned())
            .collect();
        assert_eq!(rebuilt, lines);
        assert_eq!(chunks[2].start_position(), 10);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let lines = corpus(3);
        assert!(matches!(
            partition(&lines, 0),
            Err(TranslationError::InvalidArgument { .. })
        ));
        assert!(chunk_count(3, 0).is_err());
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 1000).unwrap(), 0);
        assert_eq!(chunk_count(3, 2).unwrap(), 2);
        assert_eq!(chunk_count(2500, 1000).unwrap(), 3);
    }
}
