//! 日志/控制台预览格式化
use std::fmt::{self, Write};

/// 空白字符折叠 + 截断，零堆分配
/// 超过 `max_len` 个字符时以 `…` 结尾
#[inline]
pub fn preview_compact(s: &str, max_len: usize) -> impl fmt::Display + '_ {
    struct CompactView<'a> {
        source: &'a str,
        max_length: usize,
    }

    impl fmt::Display for CompactView<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut char_count = 0;
            let mut last_was_whitespace = false;

            for ch in self.source.chars() {
                if ch.is_whitespace() && last_was_whitespace {
                    continue;
                }
                if char_count >= self.max_length {
                    f.write_char('…')?;
                    break;
                }
                if ch.is_whitespace() {
                    f.write_char(' ')?;
                    last_was_whitespace = true;
                } else {
                    f.write_char(ch)?;
                    last_was_whitespace = false;
                }
                char_count += 1;
            }
            Ok(())
        }
    }

    CompactView {
        source: s,
        max_length: max_len,
    }
}

/// 预览文本的显示宽度（字符数）
pub fn preview_width(s: &str, max_len: usize) -> usize {
    preview_compact(s, max_len).to_string().chars().count()
}
