use proptest::prelude::*;
use sa_locate::index::{IndexOpt, SuffixIndex};
use sa_locate::search::{is_exact_at, measure, QueryService};

fn dna(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), min..max)
}

/// Low-entropy text: long runs make LCPs large.
fn repetitive(min: usize, max: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"AAAAAAAC".to_vec()), min..max)
}

fn build(text: &[u8], k: usize) -> SuffixIndex {
    SuffixIndex::build(text.to_vec(), &IndexOpt { k, build_rmq: true }).unwrap()
}

proptest! {
    #[test]
    fn prop_true_occurrence_is_found(
        text in dna(1, 300),
        o_frac in 0.0f64..1.0,
        len in 1usize..24,
    ) {
        let n = text.len();
        let len = len.min(n);
        let o = ((n - len) as f64 * o_frac) as usize;
        let q = &text[o..o + len];
        let idx = build(&text, len);
        let svc = QueryService::new(&idx);
        let p = svc.find(q);
        prop_assert!(is_exact_at(&text, p, q), "query {:?} answered at {}", q, p);
        prop_assert_eq!(svc.find(q), p);
    }

    #[test]
    fn prop_repetitive_occurrence_is_found(
        text in repetitive(2, 400),
        o_frac in 0.0f64..1.0,
        len in 1usize..40,
    ) {
        let n = text.len();
        let len = len.min(n);
        let o = ((n - len) as f64 * o_frac) as usize;
        let q = &text[o..o + len];
        let idx = build(&text, len);
        let located = QueryService::new(&idx).lookup(q);
        prop_assert!(located.is_exact());
    }

    #[test]
    fn prop_permutation_invariants(text in dna(1, 200)) {
        let idx = build(&text, 1);
        let errors = idx.check();
        prop_assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn prop_measure_stays_in_bounds(
        text in dna(1, 64),
        query in dna(0, 80),
        position_frac in 0.0f64..1.0,
        start_frac in 0.0f64..=1.0,
    ) {
        let position = ((text.len() - 1) as f64 * position_frac) as usize;
        let start = (query.len() as f64 * start_frac) as usize;
        let got = measure(&text, position, &query, start);
        prop_assert!(got <= query.len());
        prop_assert!(got >= start);
        prop_assert!(position + got <= text.len() || got == start);
    }

    #[test]
    fn prop_absent_queries_are_reported_as_boundary(
        text in dna(1, 200),
        query in dna(1, 12),
    ) {
        let present = text.windows(query.len()).any(|w| w == &query[..]);
        let idx = build(&text, 1);
        let located = QueryService::new(&idx).lookup(&query);
        prop_assert_eq!(located.is_exact(), present);
        prop_assert!(located.offset() < text.len());
    }

    #[test]
    fn prop_occurrences_match_naive_scan(
        text in repetitive(1, 200),
        query in repetitive(1, 6),
    ) {
        let idx = build(&text, 1);
        let expected: Vec<usize> = (0..text.len())
            .filter(|&i| text[i..].starts_with(&query))
            .collect();
        prop_assert_eq!(QueryService::new(&idx).occurrences(&query), expected);
    }
}
