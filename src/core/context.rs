//! Context assembly from relevant passages.

use super::passage::Passage;
use super::verdict::RelevanceVerdict;

/// Joins the texts of relevant passages with a newline, preserving
/// retrieval order.
///
/// Pure function: no I/O, no model calls, no reordering. Non-relevant and
/// unknown verdicts contribute nothing. Verdicts pointing past the end of
/// `passages` are ignored rather than panicking, and duplicate indices
/// contribute once.
#[must_use]
pub fn assemble(passages: &[Passage], verdicts: &[RelevanceVerdict]) -> String {
    let mut indices: Vec<usize> = verdicts
        .iter()
        .filter(|v| v.verdict.is_relevant())
        .map(|v| v.passage_index)
        .collect();
    indices.sort_unstable();
    indices.dedup();

    let texts: Vec<&str> = indices
        .iter()
        .filter_map(|&i| passages.get(i))
        .map(|p| p.text.as_str())
        .collect();
    texts.join("\n")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::core::verdict::Verdict;

    fn passages(texts: &[&str]) -> Vec<Passage> {
        texts.iter().map(|t| Passage::new(*t, 0.5)).collect()
    }

    #[test]
    fn joins_relevant_in_retrieval_order() {
        let p = passages(&["alpha", "beta", "gamma"]);
        let v = vec![
            RelevanceVerdict::new(0, Verdict::Relevant),
            RelevanceVerdict::new(1, Verdict::NotRelevant),
            RelevanceVerdict::new(2, Verdict::Relevant),
        ];
        assert_eq!(assemble(&p, &v), "alpha\ngamma");
    }

    #[test]
    fn preserves_order_regardless_of_verdict_order() {
        let p = passages(&["first", "second"]);
        let v = vec![
            RelevanceVerdict::new(1, Verdict::Relevant),
            RelevanceVerdict::new(0, Verdict::Relevant),
        ];
        assert_eq!(assemble(&p, &v), "first\nsecond");
    }

    #[test]
    fn empty_when_nothing_relevant() {
        let p = passages(&["alpha", "beta"]);
        let v = vec![
            RelevanceVerdict::new(0, Verdict::Unknown),
            RelevanceVerdict::new(1, Verdict::NotRelevant),
        ];
        assert_eq!(assemble(&p, &v), "");
    }

    #[test]
    fn empty_when_no_passages() {
        assert_eq!(assemble(&[], &[]), "");
    }

    #[test]
    fn ignores_out_of_range_indices() {
        let p = passages(&["only"]);
        let v = vec![
            RelevanceVerdict::new(0, Verdict::Relevant),
            RelevanceVerdict::new(7, Verdict::Relevant),
        ];
        assert_eq!(assemble(&p, &v), "only");
    }

    #[test]
    fn passage_internal_newlines_survive() {
        let p = passages(&["line one\nline two", "tail"]);
        let v = vec![
            RelevanceVerdict::new(0, Verdict::Relevant),
            RelevanceVerdict::new(1, Verdict::Relevant),
        ];
        assert_eq!(assemble(&p, &v), "line one\nline two\ntail");
    }

    proptest! {
        /// The result always equals the newline join of the relevant
        /// subset taken in passage order.
        #[test]
        fn matches_reference_join(flags in proptest::collection::vec(any::<bool>(), 0..12)) {
            let p: Vec<Passage> = flags
                .iter()
                .enumerate()
                .map(|(i, _)| Passage::new(format!("passage-{i}"), 0.1))
                .collect();
            let v: Vec<RelevanceVerdict> = flags
                .iter()
                .enumerate()
                .map(|(i, &relevant)| {
                    let verdict = if relevant { Verdict::Relevant } else { Verdict::NotRelevant };
                    RelevanceVerdict::new(i, verdict)
                })
                .collect();

            let expected: Vec<String> = flags
                .iter()
                .enumerate()
                .filter(|&(_, &relevant)| relevant)
                .map(|(i, _)| format!("passage-{i}"))
                .collect();

            prop_assert_eq!(assemble(&p, &v), expected.join("\n"));
        }
    }
}
