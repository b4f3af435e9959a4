/// 参考序列允许的字母表（大写）。
pub const ALPHABET: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// 大小写折叠后是否属于合法字母表。
#[inline]
pub fn is_legal(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T')
}

/// 将一行原始文本折叠为大写并过滤非法字符，追加到 `out`。
pub fn append_normalized(line: &[u8], out: &mut Vec<u8>) -> usize {
    let before = out.len();
    for &b in line {
        let up = b.to_ascii_uppercase();
        if is_legal(up) {
            out.push(up);
        }
    }
    out.len() - before
}

pub fn normalize_seq(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    append_normalized(seq, &mut out);
    out
}

/// 线性同余随机数发生器（MMIX 常数），用于可复现的查询抽样。
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// [0, bound) 内的均匀整数；bound 为 0 时返回 0。
    #[inline]
    pub fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        // 高位的统计质量优于低位
        ((self.next_u64() >> 16) % bound as u64) as usize
    }
}

/// 生成长度为 `len` 的随机 ACGT 序列。
pub fn random_sequence(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    (0..len).map(|_| ALPHABET[rng.below(ALPHABET.len())]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_drops_illegal() {
        assert_eq!(normalize_seq(b"acgTNnx-\r\nGg"), b"ACGTGG");
    }

    #[test]
    fn append_reports_added_count() {
        let mut out = b"AC".to_vec();
        let added = append_normalized(b"g t", &mut out);
        assert_eq!(added, 2);
        assert_eq!(out, b"ACGT");
    }

    #[test]
    fn lcg_is_deterministic_and_bounded() {
        let mut a = Lcg::new(7);
        let mut b = Lcg::new(7);
        for _ in 0..1000 {
            let x = a.below(13);
            assert_eq!(x, b.below(13));
            assert!(x < 13);
        }
        assert_eq!(Lcg::new(1).below(0), 0);
    }

    #[test]
    fn random_sequence_uses_alphabet() {
        let s = random_sequence(500, 3);
        assert_eq!(s.len(), 500);
        assert!(s.iter().all(|&b| is_legal(b)));
        assert_eq!(s, random_sequence(500, 3));
    }
}
