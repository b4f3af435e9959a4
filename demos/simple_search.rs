//! 演示如何在 library 模式下使用 sa-locate 查找 k-mer。
//!
//! 运行方式：
//! ```bash
//! cargo run --example simple_search
//! ```

use sa_locate::index::{IndexOpt, SuffixIndex};
use sa_locate::search::{Located, QueryService, RankWindow, SearchStats};
use sa_locate::util::dna;

fn main() -> anyhow::Result<()> {
    // 1. 参考序列（规范化：大写 + 过滤非法字符）
    let raw = b"acgtacgtagctgatcgtagctagctagctgatcgtagctagctagctgat";
    let reference = dna::normalize_seq(raw);
    println!("参考长度: {} bp", reference.len());

    // 2. 构建索引
    let index = SuffixIndex::build(reference, &IndexOpt { k: 8, build_rmq: true })?;
    println!("索引构建完成：SA 长度={}, k={}", index.sa().len(), index.k());

    // 3. 查找并校验
    let svc = QueryService::new(&index);
    for q in [&b"GCTGATCG"[..], &b"TAGCTAGC"[..], &b"AAAAAAAA"[..]] {
        let name = String::from_utf8_lossy(q);
        match svc.lookup(q) {
            Located::Exact { rank, offset } => {
                println!("'{}': rank={} offset={} 全部位置={:?}", name, rank, offset, svc.occurrences(q));
            }
            Located::Boundary { rank, offset } => {
                println!("'{}': 未找到（边界 rank={} offset={}）", name, rank, offset);
            }
        }
    }

    // 4. 比较开销
    let mut stats = SearchStats::default();
    svc.find_rank_with_stats(b"GCTGATCG", &mut stats);
    println!("探测 {} 次，比较 {} 个字符", stats.probes, stats.comparisons);

    // 5. k-mer 窗口模式
    let kmer = QueryService::with_window(&index, RankWindow::Kmer);
    println!("kmer 窗口上界秩: {}", kmer.upper_rank());

    // 6. RMQ
    if let Some(rmq) = index.rmq() {
        println!("秩 0 与秩 1 的 LCP（截断到 k）: {:?}", rmq.lcp_of_ranks(0, 1));
    }
    Ok(())
}
