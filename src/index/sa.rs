/// 倍增一轮的排序键：高 32 位为 `rank[i]`，低 32 位为 `rank[i + k] + 1`，
/// 越界时为 0（哨兵，排在任何真实秩之前）。
/// 秩不超过 `n - 1 <= u32::MAX - 1`，加一后仍在 32 位内。
#[inline]
fn doubling_key(rank: &[u32], i: usize, k: usize) -> u64 {
    let second = match rank.get(i + k) {
        Some(&r) => u64::from(r) + 1,
        None => 0,
    };
    (u64::from(rank[i]) << 32) | second
}

/// 构建后缀数组（基于倍增法，O(n log n) 次排序）。
/// 输入为折叠后的参考序列（无哨兵）；后缀越界部分按哨兵处理，
/// 因此公共前缀相同时较短的后缀排在前面。
/// 调用方保证 `text.len() <= u32::MAX`。
pub fn build_sa(text: &[u8]) -> Vec<u32> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sa: Vec<u32> = (0..n).map(|i| i as u32).collect();
    let mut rank: Vec<u32> = text.iter().map(|&b| u32::from(b)).collect();
    let mut tmp: Vec<u32> = vec![0; n];

    let mut k = 1usize;
    loop {
        sa.sort_unstable_by_key(|&i| doubling_key(&rank, i as usize, k));

        tmp[sa[0] as usize] = 0;
        for i in 1..n {
            let a = sa[i - 1] as usize;
            let b = sa[i] as usize;
            let bump = doubling_key(&rank, b, k) != doubling_key(&rank, a, k);
            tmp[b] = tmp[a] + u32::from(bump);
        }

        rank.copy_from_slice(&tmp);
        if rank[sa[n - 1] as usize] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }

    sa
}

/// 由后缀数组求逆置换：`rank[sa[r]] = r`。
pub fn inverse(sa: &[u32]) -> Vec<u32> {
    let mut rank = vec![0u32; sa.len()];
    for (r, &p) in sa.iter().enumerate() {
        rank[p as usize] = r as u32;
    }
    rank
}

/// 检查 `perm` 是否为 [0, n) 的置换。
pub fn is_permutation(perm: &[u32]) -> bool {
    let n = perm.len();
    let mut seen = vec![false; n];
    for &p in perm {
        let p = p as usize;
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}
