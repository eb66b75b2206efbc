use proptest::prelude::*;
use cellrule::{
    run, ColumnRange, EngineConfig, HistoryEngine, RuleDocument, Symbol, GENERATIONS,
};

fn symbol() -> impl Strategy<Value = char> {
    prop_oneof![Just('0'), Just('1'), Just('X')]
}

fn key_cell() -> impl Strategy<Value = char> {
    prop_oneof![Just('0'), Just('1'), Just('X'), Just('.')]
}

/// Tables always end with a catch-all so every window matches
fn table() -> impl Strategy<Value = Vec<(String, String)>> {
    (
        proptest::collection::vec((proptest::collection::vec(key_cell(), 3), symbol()), 0..6),
        symbol(),
    )
        .prop_map(|(entries, fallback)| {
            let mut patterns: Vec<(String, String)> = entries
                .into_iter()
                .map(|(key, out)| (key.into_iter().collect(), out.to_string()))
                .collect();
            patterns.push(("...".to_string(), fallback.to_string()));
            patterns
        })
}

/// Tape plus a document whose ranges tile columns 2.. exactly
fn complete_document() -> impl Strategy<Value = RuleDocument> {
    (
        proptest::collection::vec(symbol(), 3..24),
        proptest::collection::vec(table(), 1..4),
        proptest::collection::vec(1usize..6, 1..8),
    )
        .prop_map(|(cells, tables, widths)| {
            let initial: String = cells.into_iter().collect();
            let len = initial.len();

            let mut builder = RuleDocument::builder().initial(&initial);
            for (idx, patterns) in tables.iter().enumerate() {
                builder = builder.table(&format!("T{idx}"), patterns.clone());
            }

            let mut start = 2;
            let mut idx = 0;
            while start < len {
                let width = widths[idx % widths.len()];
                let end = (start + width - 1).min(len - 1);
                builder = builder.range(start, end, &format!("T{}", idx % tables.len()));
                start = end + 1;
                idx += 1;
            }

            builder.build().expect("generated keys are 3 characters")
        })
}

proptest! {
    #[test]
    fn history_has_fixed_shape(doc in complete_document()) {
        let history = run(&doc).expect("complete documents always run");

        prop_assert_eq!(history.len(), GENERATIONS + 1);
        prop_assert_eq!(history.initial(), doc.initial());
        for row in history.iter() {
            prop_assert_eq!(row.len(), doc.initial().len());
        }
    }

    #[test]
    fn boundary_columns_hold_zero(doc in complete_document()) {
        let history = run(&doc).expect("complete documents always run");

        for row in history.iter().skip(1) {
            prop_assert_eq!(row.get(0), Some(&Symbol::boundary()));
            prop_assert_eq!(row.get(1), Some(&Symbol::boundary()));
        }
    }

    #[test]
    fn runs_are_deterministic(doc in complete_document()) {
        prop_assert_eq!(run(&doc).unwrap(), run(&doc).unwrap());
    }

    #[test]
    fn shorter_runs_are_prefixes(doc in complete_document(), generations in 0usize..GENERATIONS) {
        let full = run(&doc).unwrap();
        let short = HistoryEngine::new(EngineConfig::default().with_generations(generations))
            .run(&doc)
            .unwrap();

        prop_assert_eq!(short.rows(), &full.rows()[..=generations]);
    }

    #[test]
    fn header_leaves_ranges_untouched(doc in complete_document()) {
        let before: Vec<ColumnRange> = doc.ranges().to_vec();
        let header = doc.header();

        prop_assert_eq!(doc.ranges(), before.as_slice());
        prop_assert_eq!(header.len(), before.len());
        let spans: Vec<usize> = header.iter().map(|c| c.span).collect();
        prop_assert_eq!(spans.iter().sum::<usize>(), doc.initial().len() - 2);
    }
}
