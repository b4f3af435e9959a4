/// 从 `start` 起比较 `query[start..]` 与 `text[position + start..]`，
/// 返回首个失配处的下标（即已匹配前缀长度）；整串匹配时返回 `query.len()`。
///
/// 遇到失配、查询结束或参考序列结束（`position + i == text.len()`）即停止，
/// 不会越界访问。调用方保证 `start <= query.len()`。
#[inline]
pub fn measure(text: &[u8], position: usize, query: &[u8], start: usize) -> usize {
    debug_assert!(start <= query.len());
    let n = text.len();
    let mut i = start;
    while i < query.len() && position + i < n {
        if query[i] != text[position + i] {
            return i;
        }
        i += 1;
    }
    i
}

/// `measure` 实际检查过的字符数（含导致停止的失配字符）。
#[inline]
pub(crate) fn examined(text_len: usize, position: usize, query_len: usize, start: usize, matched: usize) -> usize {
    let mismatch = matched < query_len && position + matched < text_len;
    matched - start + usize::from(mismatch)
}
