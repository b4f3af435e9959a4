use crate::index::SuffixIndex;

use super::meter::{examined, measure};

/// 一次 locate 调用树的开销统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// 探测（measure 调用）次数
    pub probes: usize,
    /// 实际比较的字符数
    pub comparisons: usize,
}

/// 递归二分查找查询串在后缀数组中的秩边界。
///
/// 已知：
/// - 真实边界位于开区间 (lo, hi) 内；
/// - 秩 lo 的后缀与查询的 LCP 为 `lo_lcp`，秩 hi 的为 `hi_lcp`。
///
/// 由于 (lo, hi) 之间的后缀按字典序夹在两端之间，它们与查询的 LCP
/// 至少为 `min(lo_lcp, hi_lcp)`，比较可以直接从该偏移处继续。
///
/// 命中完整匹配时立即返回该秩；否则返回下界插入位置。
/// 结果不保证是精确匹配，调用方需自行校验。
///
/// # Panics
///
/// 要求 `lo <= hi < index.len()`，否则 panic。
pub fn locate(index: &SuffixIndex, query: &[u8], lo: usize, hi: usize, lo_lcp: usize, hi_lcp: usize) -> usize {
    let mut stats = SearchStats::default();
    locate_with_stats(index, query, lo, hi, lo_lcp, hi_lcp, &mut stats)
}

/// 同 [`locate`]，并把探测与比较次数累加到 `stats`。
///
/// # Panics
///
/// 与 [`locate`] 相同：`lo <= hi < index.len()`。
pub fn locate_with_stats(
    index: &SuffixIndex,
    query: &[u8],
    lo: usize,
    hi: usize,
    lo_lcp: usize,
    hi_lcp: usize,
    stats: &mut SearchStats,
) -> usize {
    assert!(
        lo <= hi && hi < index.len(),
        "rank interval [{}, {}] outside index of length {}",
        lo,
        hi,
        index.len()
    );
    // hi == lo + 2 时唯一候选为 lo + 1；更窄的区间只会出现在退化的窗口上
    if hi - lo <= 2 {
        return (lo + 1).min(hi);
    }

    let text = index.text();
    let mid = lo + (hi - lo) / 2;
    let position = index.offset_of(mid);
    let start = lo_lcp.min(hi_lcp);
    let n_lcp = measure(text, position, query, start);
    stats.probes += 1;
    stats.comparisons += examined(text.len(), position, query.len(), start, n_lcp);

    if n_lcp == query.len() {
        return mid;
    }
    if position + n_lcp == text.len() || query[n_lcp] > text[position + n_lcp] {
        // 后缀过小，搜索右半
        locate_with_stats(index, query, mid, hi, n_lcp, hi_lcp, stats)
    } else {
        // 后缀过大，搜索左半
        locate_with_stats(index, query, lo, mid, lo_lcp, n_lcp, stats)
    }
}
