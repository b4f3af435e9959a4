/// LCP 数组上的稀疏表 RMQ，O(n log n) 预处理、O(1) 查询。
///
/// 窗口 `k` 为支持的最长查询长度：LCP 值一律截断到 `k`，
/// 任何不短于 `k` 的公共前缀对长度为 `k` 的查询而言是等价的。
/// 该结构随索引一同构建，但二分查找路径不依赖它。
#[derive(Debug, Clone)]
pub struct LcpRmq {
    k: u32,
    /// levels[j][i] = min(lcp[i .. i + 2^j])
    levels: Vec<Vec<u32>>,
}

impl LcpRmq {
    pub fn build(lcp: &[u32], k: usize) -> Self {
        let k = k.min(u32::MAX as usize) as u32;
        let base: Vec<u32> = lcp.iter().map(|&v| v.min(k)).collect();
        let n = base.len();
        let mut levels = vec![base];
        let mut width = 1usize;
        while width * 2 <= n {
            let prev = &levels[levels.len() - 1];
            let next: Vec<u32> = (0..=n - width * 2)
                .map(|i| prev[i].min(prev[i + width]))
                .collect();
            levels.push(next);
            width *= 2;
        }
        Self { k, levels }
    }

    pub fn k(&self) -> usize {
        self.k as usize
    }

    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// 闭区间 [l, r] 上的最小值；越界或 l > r 时返回 None。
    pub fn min(&self, l: usize, r: usize) -> Option<u32> {
        if l > r || r >= self.len() {
            return None;
        }
        let span = r - l + 1;
        let j = (usize::BITS - 1 - span.leading_zeros()) as usize;
        let row = &self.levels[j];
        Some(row[l].min(row[r + 1 - (1 << j)]))
    }

    /// 秩 i 与秩 j 两个后缀的公共前缀长度（截断到 k）。
    pub fn lcp_of_ranks(&self, i: usize, j: usize) -> Option<u32> {
        if i == j {
            return (i < self.len()).then_some(self.k);
        }
        let (lo, hi) = if i < j { (i, j) } else { (j, i) };
        self.min(lo + 1, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::dna;

    #[test]
    fn rmq_matches_linear_scan() {
        let mut rng = dna::Lcg::new(5);
        let lcp: Vec<u32> = (0..97).map(|_| rng.below(12) as u32).collect();
        let rmq = LcpRmq::build(&lcp, 8);
        for l in 0..lcp.len() {
            for r in l..lcp.len() {
                let expected = lcp[l..=r].iter().map(|&v| v.min(8)).min();
                assert_eq!(rmq.min(l, r), expected, "l={} r={}", l, r);
            }
        }
    }

    #[test]
    fn rmq_rejects_bad_ranges() {
        let rmq = LcpRmq::build(&[0, 3, 1], 4);
        assert_eq!(rmq.min(2, 1), None);
        assert_eq!(rmq.min(0, 3), None);
        assert_eq!(rmq.lcp_of_ranks(5, 5), None);
    }

    #[test]
    fn lcp_of_ranks_is_clamped() {
        // ACGTACGTACGT 的 LCP
        let lcp = [0, 4, 8, 0, 3, 7, 0, 2, 6, 0, 1, 5];
        let rmq = LcpRmq::build(&lcp, 4);
        assert_eq!(rmq.k(), 4);
        assert_eq!(rmq.lcp_of_ranks(0, 2), Some(4));
        assert_eq!(rmq.lcp_of_ranks(2, 0), Some(4));
        assert_eq!(rmq.lcp_of_ranks(1, 4), Some(0));
        assert_eq!(rmq.lcp_of_ranks(3, 3), Some(4));
    }

    #[test]
    fn empty_lcp() {
        let rmq = LcpRmq::build(&[], 3);
        assert!(rmq.is_empty());
        assert_eq!(rmq.min(0, 0), None);
    }
}
