//! Property tests for enumeration, evaluation and the textual form

use matsynth::search::config::SearchConfig;
use matsynth::search::symbolic::synthesis::reproduces;
use matsynth::search::{EnumerativeSynthesizer, ExampleSet, Synthesizer};
use matsynth::{ConcreteMatrix, Expr, enumerate, parse_expr};
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::Duration;

/// Square matrix with small integer entries
fn arb_matrix(size: usize) -> impl Strategy<Value = ConcreteMatrix> {
    prop::collection::vec(prop::collection::vec(-5i32..=5, size), size).prop_map(|rows| {
        ConcreteMatrix::from_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(f64::from).collect())
                .collect(),
        )
        .unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Enumeration is duplicate-free and each depth extends the previous one
    #[test]
    fn enumeration_prefix_and_uniqueness(depth in 0usize..=1, vars in 1usize..=2) {
        let shallow = enumerate(depth, vars);
        let deep = enumerate(depth + 1, vars);

        prop_assert!(deep.len() > shallow.len());
        prop_assert_eq!(&deep[..shallow.len()], &shallow[..]);

        let unique: HashSet<String> = deep.iter().map(|t| t.to_string()).collect();
        prop_assert_eq!(unique.len(), deep.len());
        prop_assert!(deep.iter().all(|t| t.depth() <= depth + 1));
    }

    /// Evaluating the same tree twice gives the same value
    #[test]
    fn evaluation_is_deterministic(
        a in arb_matrix(2),
        b in arb_matrix(2),
        index in any::<prop::sample::Index>(),
    ) {
        let programs = enumerate(2, 2);
        let program = &programs[index.index(programs.len())];
        let bindings = [a, b];

        let first = program.evaluate::<ConcreteMatrix>(&bindings);
        let second = program.evaluate::<ConcreteMatrix>(&bindings);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(first), Ok(second)) = (first, second) {
            prop_assert_eq!(first, second);
        }
    }

    /// Every enumerated tree survives a trip through its textual form
    #[test]
    fn display_parse_agreement(index in any::<prop::sample::Index>()) {
        let programs = enumerate(2, 3);
        let program = &programs[index.index(programs.len())];
        let parsed: Expr = program.to_string().parse().unwrap();
        prop_assert_eq!(&parsed, program);
    }

    /// Literal constants print and parse back to the same matrix
    #[test]
    fn literal_display_parse_agreement(
        entries in prop::collection::vec(-1000.0f64..1000.0, 6),
    ) {
        let rows = vec![entries[..3].to_vec(), entries[3..].to_vec()];
        let literal = Expr::literal(ConcreteMatrix::from_rows(rows).unwrap());
        let parsed = parse_expr(&literal.to_string()).unwrap();
        prop_assert_eq!(parsed, literal);
    }

    /// Synthesis finds a program, no deeper than the one that made the examples
    #[test]
    fn synthesized_program_reproduces_examples(
        a in arb_matrix(2),
        b in arb_matrix(2),
        index in any::<prop::sample::Index>(),
    ) {
        let programs = enumerate(1, 2);
        let source = &programs[index.index(programs.len())];
        let output = source
            .evaluate::<ConcreteMatrix>(&[a.clone(), b.clone()])
            .unwrap();
        let examples = ExampleSet::from_pairs(vec![(vec![a, b], output)]).unwrap();

        let config = SearchConfig::default()
            .with_timeout(Duration::from_secs(10))
            .with_max_depth(1)
            .without_constants();
        let program = EnumerativeSynthesizer::new(config).synthesize(&examples).unwrap();

        prop_assert!(reproduces(&program, &examples));
        prop_assert!(program.depth() <= source.depth());
    }
}
