//! Server-Sent Events 的最小解码：只关心 `data:` 行。

/// # Summary
/// 按行切分字节流的缓冲区。
///
/// # Invariants
/// - 只在遇到 `\n` 时才产出一行，跨块截断的多字节字符不会被拆开解码。
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个数据块，返回其中已完整的行（去掉行尾 `\r`）
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1]);
            lines.push(line.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// 流结束时取出未以换行结尾的残余
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = String::from_utf8_lossy(&self.pending).trim_end().to_string();
        self.pending.clear();
        (!rest.is_empty()).then_some(rest)
    }
}

/// `data:` 行的负载；注释行、事件名与空行返回 `None`
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:")
        .map(str::trim_start)
        .filter(|p| !p.is_empty() && *p != "[DONE]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: {\"a\"").is_empty());
        let lines = buf.push(b":1}\r\n\r\ndata: x\n");
        assert_eq!(lines, vec!["data: {\"a\":1}", "", "data: x"]);
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn test_multibyte_char_split() {
        let text = "data: 命理\n".as_bytes();
        let mut buf = LineBuffer::new();
        // 在"命"的 UTF-8 编码中间截断
        assert!(buf.push(&text[..7]).is_empty());
        assert_eq!(buf.push(&text[7..]), vec!["data: 命理"]);
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: tail").is_empty());
        assert_eq!(buf.finish().as_deref(), Some("data: tail"));
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: {}"), Some("{}"));
        assert_eq!(data_payload("data:{}"), Some("{}"));
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload("event: message"), None);
        assert_eq!(data_payload("data: [DONE]"), None);
        assert_eq!(data_payload(""), None);
    }
}
