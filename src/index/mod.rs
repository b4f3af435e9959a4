//! 后缀索引：参考序列 + 后缀数组 + 逆置换 + LCP（+ 可选 RMQ）。
//!
//! 构建或加载后不可变，可在多个线程间只读共享。

pub mod lcp;
pub mod rmq;
pub mod sa;
pub mod store;

use tracing::debug;

use crate::error::{IndexError, Result};
use rmq::LcpRmq;

/// 索引构建参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOpt {
    /// 查询窗口长度 k（合法匹配起点位于 [0, n-k]）
    pub k: usize,
    /// 是否在 LCP 上构建 RMQ
    pub build_rmq: bool,
}

impl Default for IndexOpt {
    fn default() -> Self {
        Self { k: 21, build_rmq: false }
    }
}

#[derive(Debug, Clone)]
pub struct SuffixIndex {
    k: usize,
    text: Vec<u8>,
    /// sa[r] = 秩为 r 的后缀在参考序列中的起点
    sa: Vec<u32>,
    /// rank[p] = 起点为 p 的后缀的秩
    rank: Vec<u32>,
    /// lcp[r] = 秩 r-1 与秩 r 后缀的公共前缀长度
    lcp: Vec<u32>,
    rmq: Option<LcpRmq>,
}

fn check_shape(n: usize, k: usize) -> Result<()> {
    if n == 0 {
        return Err(IndexError::EmptyReference);
    }
    if n > u32::MAX as usize {
        return Err(IndexError::TooLarge(n));
    }
    if k == 0 || k > n {
        return Err(IndexError::InvalidWindow { k, n });
    }
    Ok(())
}

impl SuffixIndex {
    /// 从参考序列构建完整索引（SA -> rank -> LCP [-> RMQ]）。
    pub fn build(text: Vec<u8>, opt: &IndexOpt) -> Result<Self> {
        check_shape(text.len(), opt.k)?;
        debug!(len = text.len(), "sorting suffixes");
        let sa = sa::build_sa(&text);
        let rank = sa::inverse(&sa);
        debug!("computing LCP array");
        let lcp = lcp::build_lcp(&text, &sa, &rank);
        Ok(Self::assemble(text, sa, rank, lcp, opt))
    }

    /// 由持久化的逆置换与 LCP 数组恢复索引，并做结构校验。
    pub fn from_parts(text: Vec<u8>, rank: Vec<u32>, lcp: Vec<u32>, opt: &IndexOpt) -> Result<Self> {
        let n = text.len();
        check_shape(n, opt.k)?;
        if rank.len() != n {
            return Err(IndexError::Corrupt(format!(
                "rank array has {} entries, reference has {}",
                rank.len(),
                n
            )));
        }
        if lcp.len() != n {
            return Err(IndexError::Corrupt(format!(
                "LCP array has {} entries, reference has {}",
                lcp.len(),
                n
            )));
        }
        if !sa::is_permutation(&rank) {
            return Err(IndexError::Corrupt("rank array is not a permutation".into()));
        }
        if lcp[0] != 0 {
            return Err(IndexError::Corrupt(format!("LCP[0] must be 0, found {}", lcp[0])));
        }
        let sa = sa::inverse(&rank);
        for r in 1..n {
            let p = sa[r - 1].max(sa[r]) as usize;
            if lcp[r] as usize > n - p {
                return Err(IndexError::Corrupt(format!("LCP[{}] = {} overruns the reference", r, lcp[r])));
            }
        }
        Ok(Self::assemble(text, sa, rank, lcp, opt))
    }

    fn assemble(text: Vec<u8>, sa: Vec<u32>, rank: Vec<u32>, lcp: Vec<u32>, opt: &IndexOpt) -> Self {
        let rmq = opt.build_rmq.then(|| {
            debug!(k = opt.k, "building LCP RMQ");
            LcpRmq::build(&lcp, opt.k)
        });
        Self { k: opt.k, text, sa, rank, lcp, rmq }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// 构建时已拒绝空参考，恒为 false。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn sa(&self) -> &[u32] {
        &self.sa
    }

    pub fn rank(&self) -> &[u32] {
        &self.rank
    }

    pub fn lcp(&self) -> &[u32] {
        &self.lcp
    }

    pub fn rmq(&self) -> Option<&LcpRmq> {
        self.rmq.as_ref()
    }

    /// 秩 -> 参考序列偏移
    #[inline]
    pub fn offset_of(&self, rank: usize) -> usize {
        self.sa[rank] as usize
    }

    /// 参考序列偏移 -> 秩
    #[inline]
    pub fn rank_of(&self, offset: usize) -> usize {
        self.rank[offset] as usize
    }

    /// 秩为 r 的后缀。
    pub fn suffix(&self, rank: usize) -> &[u8] {
        &self.text[self.offset_of(rank)..]
    }

    /// 完整不变量检查，返回所有违规描述（空表示通过）。
    pub fn check(&self) -> Vec<String> {
        let n = self.len();
        let mut errors = Vec::new();
        if !sa::is_permutation(&self.sa) {
            errors.push("sa is not a permutation".to_string());
            return errors;
        }
        for (r, &p) in self.sa.iter().enumerate() {
            if self.rank[p as usize] as usize != r {
                errors.push(format!("rank[sa[{}]] = {} != {}", r, self.rank[p as usize], r));
            }
        }
        for r in 1..n {
            let prev = self.sa[r - 1] as usize;
            let cur = self.sa[r] as usize;
            let shared = lcp::common_prefix(&self.text, prev, cur);
            if shared != self.lcp[r] as usize {
                errors.push(format!("{} (r. {}): LCP {} should be {}", cur, r, self.lcp[r], shared));
            }
            if self.text[prev..] >= self.text[cur..] {
                errors.push(format!("suffix {} (r. {}) not greater than suffix {}", cur, r, prev));
            }
        }
        errors
    }
}
