/// Kasai 算法构建 LCP 数组，O(n)。
/// `lcp[r]` 为秩 r-1 与秩 r 两个后缀的最长公共前缀长度，`lcp[0] = 0`。
pub fn build_lcp(text: &[u8], sa: &[u32], rank: &[u32]) -> Vec<u32> {
    let n = text.len();
    let mut lcp = vec![0u32; n];
    let mut h = 0usize;
    for i in 0..n {
        let r = rank[i] as usize;
        if r == 0 {
            h = 0;
            continue;
        }
        let j = sa[r - 1] as usize;
        while i + h < n && j + h < n && text[i + h] == text[j + h] {
            h += 1;
        }
        lcp[r] = h as u32;
        h = h.saturating_sub(1);
    }
    lcp
}

/// 直接比较两个位置起始后缀的公共前缀长度。
pub fn common_prefix(text: &[u8], a: usize, b: usize) -> usize {
    text[a..]
        .iter()
        .zip(&text[b..])
        .take_while(|(x, y)| x == y)
        .count()
}
