//! 查询入口：两端秩特判 + LCP 边界复用的二分查找。
//!
//! 查找本身没有"未找到"信号：`find` 总是返回某个偏移（最近的字典序边界）。
//! 是否精确命中由调用方校验，或使用 [`QueryService::lookup`]。

pub mod locate;
pub mod meter;

use rayon::prelude::*;

use crate::index::SuffixIndex;
pub use locate::{locate, locate_with_stats, SearchStats};
pub use meter::measure;

/// 二分查找的上界秩。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankWindow {
    /// 全部后缀：[0, n-1]
    #[default]
    Full,
    /// 仅 [0, n-k]：假定 k-mer 查询，忽略秩最大的 k-1 个后缀
    Kmer,
}

/// 查找结果：区分"已确认的精确匹配"与"仅定位到的边界"。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Located {
    Exact { rank: usize, offset: usize },
    Boundary { rank: usize, offset: usize },
}

impl Located {
    pub fn rank(&self) -> usize {
        match *self {
            Located::Exact { rank, .. } | Located::Boundary { rank, .. } => rank,
        }
    }

    pub fn offset(&self) -> usize {
        match *self {
            Located::Exact { offset, .. } | Located::Boundary { offset, .. } => offset,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Located::Exact { .. })
    }
}

/// 调用方校验：`text[offset..offset + query.len()] == query`。
#[inline]
pub fn is_exact_at(text: &[u8], offset: usize, query: &[u8]) -> bool {
    text.get(offset..).is_some_and(|s| s.starts_with(query))
}

#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    index: &'a SuffixIndex,
    window: RankWindow,
}

impl<'a> QueryService<'a> {
    pub fn new(index: &'a SuffixIndex) -> Self {
        Self::with_window(index, RankWindow::Full)
    }

    pub fn with_window(index: &'a SuffixIndex, window: RankWindow) -> Self {
        Self { index, window }
    }

    pub fn index(&self) -> &'a SuffixIndex {
        self.index
    }

    pub fn window(&self) -> RankWindow {
        self.window
    }

    /// 二分查找的上界秩。
    pub fn upper_rank(&self) -> usize {
        let n = self.index.len();
        match self.window {
            RankWindow::Full => n - 1,
            // 构建时已保证 k <= n
            RankWindow::Kmer => n - self.index.k(),
        }
    }

    /// 查询串对应的秩：两端命中则直接返回，否则递归二分。
    pub fn find_rank(&self, query: &[u8]) -> usize {
        self.find_rank_with_stats(query, &mut SearchStats::default())
    }

    /// 同 [`find_rank`](Self::find_rank)，统计两端探测在内的全部开销。
    pub fn find_rank_with_stats(&self, query: &[u8], stats: &mut SearchStats) -> usize {
        let idx = self.index;
        let text = idx.text();
        let m = query.len();

        let lo = 0usize;
        let lo_pos = idx.offset_of(lo);
        let lo_lcp = measure(text, lo_pos, query, 0);
        stats.probes += 1;
        stats.comparisons += meter::examined(text.len(), lo_pos, m, 0, lo_lcp);
        if lo_lcp == m {
            return lo;
        }

        let hi = self.upper_rank();
        let hi_pos = idx.offset_of(hi);
        let hi_lcp = measure(text, hi_pos, query, 0);
        stats.probes += 1;
        stats.comparisons += meter::examined(text.len(), hi_pos, m, 0, hi_lcp);
        if hi_lcp == m {
            return hi;
        }

        locate_with_stats(idx, query, lo, hi, lo_lcp, hi_lcp, stats)
    }

    /// 查询串在参考序列中的偏移。不保证精确匹配。
    pub fn find(&self, query: &[u8]) -> usize {
        self.index.offset_of(self.find_rank(query))
    }

    /// 带校验的查找。
    pub fn lookup(&self, query: &[u8]) -> Located {
        let rank = self.find_rank(query);
        let offset = self.index.offset_of(rank);
        if is_exact_at(self.index.text(), offset, query) {
            Located::Exact { rank, offset }
        } else {
            Located::Boundary { rank, offset }
        }
    }

    /// 全部出现位置（升序）。借助 LCP 从命中秩向两侧扩展；未命中返回空。
    pub fn occurrences(&self, query: &[u8]) -> Vec<usize> {
        let Located::Exact { rank, .. } = self.lookup(query) else {
            return Vec::new();
        };
        let lcp = self.index.lcp();
        let m = query.len() as u32;
        let mut first = rank;
        while first > 0 && lcp[first] >= m {
            first -= 1;
        }
        let mut last = rank;
        while last + 1 < lcp.len() && lcp[last + 1] >= m {
            last += 1;
        }
        let mut offsets: Vec<usize> = self.index.sa()[first..=last].iter().map(|&p| p as usize).collect();
        offsets.sort_unstable();
        offsets
    }

    /// 并行批量查找（索引只读，无需加锁）。
    pub fn find_batch<Q>(&self, queries: &[Q]) -> Vec<usize>
    where
        Q: AsRef<[u8]> + Sync,
    {
        queries.par_iter().map(|q| self.find(q.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexOpt;

    const REF: &[u8] = b"ACGTACGTACGT";

    fn index_k4() -> SuffixIndex {
        SuffixIndex::build(REF.to_vec(), &IndexOpt { k: 4, build_rmq: false }).unwrap()
    }

    #[test]
    fn scenario_acgt() {
        let idx = index_k4();
        for window in [RankWindow::Full, RankWindow::Kmer] {
            let svc = QueryService::with_window(&idx, window);
            let p = svc.find(b"ACGT");
            assert!([0, 4, 8].contains(&p));
            assert_eq!(&REF[p..p + 4], b"ACGT");

            let p = svc.find(b"GTAC");
            assert!([2, 6].contains(&p), "window={:?} p={}", window, p);
            assert_eq!(&REF[p..p + 4], b"GTAC");
        }
    }

    #[test]
    fn absent_query_returns_unverified_offset() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        let p = svc.find(b"TTTT");
        assert!(p < REF.len());
        assert!(!is_exact_at(REF, p, b"TTTT"));
        let located = svc.lookup(b"TTTT");
        assert!(!located.is_exact());
        assert_eq!(located.offset(), p);
    }

    #[test]
    fn find_is_deterministic() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        let first = svc.find(b"CGTA");
        for _ in 0..10 {
            assert_eq!(svc.find(b"CGTA"), first);
        }
    }

    #[test]
    fn kmer_window_misses_top_ranked_suffixes() {
        // TACG 只出现在秩 10、11（超出 n-k = 8）
        let idx = index_k4();
        assert!(QueryService::new(&idx).lookup(b"TACG").is_exact());
        assert!(!QueryService::with_window(&idx, RankWindow::Kmer).lookup(b"TACG").is_exact());
    }

    #[test]
    fn boundary_ranks_short_circuit() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        let mut stats = SearchStats::default();
        // 秩 0 为 "ACGT"
        assert_eq!(svc.find_rank_with_stats(b"ACGT", &mut stats), 0);
        assert_eq!(stats.probes, 1);
        // 秩 11 为 "TACGTACGT"
        let mut stats = SearchStats::default();
        assert_eq!(svc.find_rank_with_stats(b"TACGTA", &mut stats), 11);
        assert_eq!(stats.probes, 2);
    }

    #[test]
    fn occurrences_expand_over_lcp() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        assert_eq!(svc.occurrences(b"ACGT"), vec![0, 4, 8]);
        assert_eq!(svc.occurrences(b"GTAC"), vec![2, 6]);
        assert_eq!(svc.occurrences(b"T"), vec![3, 7, 11]);
        assert!(svc.occurrences(b"TTTT").is_empty());
    }

    #[test]
    fn empty_query_matches_smallest_suffix() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        assert_eq!(svc.lookup(b""), Located::Exact { rank: 0, offset: 8 });
        assert_eq!(svc.occurrences(b"").len(), REF.len());
    }

    #[test]
    fn query_longer_than_reference() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        assert!(!svc.lookup(b"ACGTACGTACGTA").is_exact());
        assert!(svc.lookup(b"ACGTACGTACGT").is_exact());
    }

    #[test]
    fn batch_matches_sequential() {
        let idx = index_k4();
        let svc = QueryService::new(&idx);
        let queries: Vec<Vec<u8>> = ["ACGT", "GTAC", "TTTT", "CGTA", "T"]
            .iter()
            .map(|s| s.as_bytes().to_vec())
            .collect();
        let expected: Vec<usize> = queries.iter().map(|q| svc.find(q)).collect();
        assert_eq!(svc.find_batch(&queries), expected);
    }

    #[test]
    fn single_symbol_reference() {
        let idx = SuffixIndex::build(b"G".to_vec(), &IndexOpt { k: 1, build_rmq: false }).unwrap();
        for window in [RankWindow::Full, RankWindow::Kmer] {
            let svc = QueryService::with_window(&idx, window);
            assert_eq!(svc.lookup(b"G"), Located::Exact { rank: 0, offset: 0 });
            assert_eq!(svc.lookup(b"A"), Located::Boundary { rank: 0, offset: 0 });
        }
    }
}
