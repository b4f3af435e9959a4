use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::index::SuffixIndex;
use crate::search::{is_exact_at, QueryService, RankWindow};
use crate::util::dna::Lcg;

/// 基准测试参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchOpt {
    pub queries: usize,
    pub seed: u64,
    pub threads: usize,
    pub window: RankWindow,
}

impl Default for BenchOpt {
    fn default() -> Self {
        Self { queries: 1_000_000, seed: 42, threads: 1, window: RankWindow::Full }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchReport {
    pub queries: usize,
    pub correct: usize,
    pub elapsed: Duration,
}

impl BenchReport {
    pub fn queries_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.queries as f64 / secs
    }
}

/// 在 [0, n-k) 内随机抽取起点，截取长度为 k 的查询串。
pub fn sample_queries(text: &[u8], k: usize, count: usize, seed: u64) -> Vec<&[u8]> {
    let n = text.len();
    if k > n {
        return Vec::new();
    }
    let mut rng = Lcg::new(seed);
    let span = (n - k).max(1);
    (0..count)
        .map(|_| {
            let o = rng.below(span);
            &text[o..o + k]
        })
        .collect()
}

/// 统计答案中确为精确匹配的数量。
pub fn count_correct(text: &[u8], queries: &[&[u8]], answers: &[usize]) -> usize {
    queries
        .iter()
        .zip(answers)
        .filter(|&(q, &p)| p + q.len() <= text.len() && is_exact_at(text, p, q))
        .count()
}

/// 随机 k-mer 查询 -> 计时 -> 校验。
pub fn run_benchmark(index: &SuffixIndex, opt: &BenchOpt) -> Result<BenchReport> {
    let text = index.text();
    let queries = sample_queries(text, index.k(), opt.queries, opt.seed);
    info!(count = queries.len(), k = index.k(), "constructed queries");

    let svc = QueryService::with_window(index, opt.window);
    let start = Instant::now();
    let answers: Vec<usize> = if opt.threads <= 1 {
        queries.iter().map(|q| svc.find(q)).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(opt.threads).build()?;
        pool.install(|| svc.find_batch(&queries))
    };
    let elapsed = start.elapsed();
    debug!(?elapsed, threads = opt.threads, "queries finished");

    let correct = count_correct(text, &queries, &answers);
    Ok(BenchReport { queries: queries.len(), correct, elapsed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexOpt;
    use crate::util::dna;

    #[test]
    fn samples_are_substrings_of_length_k() {
        let text = dna::random_sequence(100, 1);
        let qs = sample_queries(&text, 10, 50, 7);
        assert_eq!(qs.len(), 50);
        assert!(qs.iter().all(|q| q.len() == 10));
        assert_eq!(qs, sample_queries(&text, 10, 50, 7));
    }

    #[test]
    fn sample_when_window_equals_reference() {
        let qs = sample_queries(b"ACGT", 4, 3, 1);
        assert_eq!(qs, vec![&b"ACGT"[..]; 3]);
        assert!(sample_queries(b"ACG", 4, 3, 1).is_empty());
    }

    #[test]
    fn full_window_answers_every_query() {
        let text = dna::random_sequence(5000, 31);
        let idx = SuffixIndex::build(text, &IndexOpt { k: 15, build_rmq: false }).unwrap();
        for threads in [1, 3] {
            let opt = BenchOpt { queries: 2000, seed: 9, threads, window: RankWindow::Full };
            let report = run_benchmark(&idx, &opt).unwrap();
            assert_eq!(report.queries, 2000);
            assert_eq!(report.correct, 2000);
        }
    }

    #[test]
    fn count_correct_rejects_wrong_offsets() {
        let text = b"ACGTACGT";
        let queries: Vec<&[u8]> = vec![&b"ACGT"[..], &b"GTAC"[..], &b"TTTT"[..]];
        assert_eq!(count_correct(text, &queries, &[4, 2, 0]), 2);
        assert_eq!(count_correct(text, &queries, &[6, 7, 0]), 0);
    }
}
