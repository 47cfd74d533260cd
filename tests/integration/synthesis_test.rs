use matsynth::error::ExampleError;
use matsynth::search::config::{ConstantConfig, SearchConfig};
use matsynth::search::symbolic::synthesis::reproduces;
use matsynth::search::{EnumerativeSynthesizer, ExampleSet, SearchPhase, Synthesizer};
use matsynth::{ConcreteMatrix, Expr, Matrix, synthesize};
use std::time::{Duration, Instant};

fn m(rows: Vec<Vec<f64>>) -> ConcreteMatrix {
    ConcreteMatrix::from_rows(rows).unwrap()
}

fn sample_a() -> ConcreteMatrix {
    m(vec![
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 10.0],
    ])
}

fn sample_b() -> ConcreteMatrix {
    m(vec![
        vec![2.0, 0.0, -1.0],
        vec![1.0, 3.0, 1.0],
        vec![0.0, 4.0, 2.0],
    ])
}

fn structural() -> SearchConfig {
    SearchConfig::default()
        .with_timeout(Duration::from_secs(10))
        .without_constants()
}

#[test]
fn test_identity_mapping() {
    let examples = ExampleSet::from_pairs(vec![
        (vec![sample_a()], sample_a()),
        (vec![sample_b()], sample_b()),
    ])
    .unwrap();

    let program = synthesize(&examples).unwrap();
    assert_eq!(program, Expr::var(0));
}

#[test]
fn test_sum_of_two_inputs() {
    let a = sample_a();
    let b = sample_b();
    let examples = ExampleSet::from_pairs(vec![
        (vec![a.clone(), b.clone()], a.add(&b).unwrap()),
        (vec![b.clone(), b.transpose()], b.add(&b.transpose()).unwrap()),
    ])
    .unwrap();

    let mut synthesizer = EnumerativeSynthesizer::new(structural());
    let program = synthesizer.synthesize(&examples).unwrap();
    assert_eq!(program.to_string(), "var0.add(var1)");

    // Generalizes beyond the examples
    let c = m(vec![vec![0.5, 1.0, 0.0], vec![0.0, 2.0, 1.0], vec![3.0, 0.0, 1.0]]);
    let d = ConcreteMatrix::identity(3).unwrap();
    assert_eq!(
        program
            .evaluate::<ConcreteMatrix>(&[c.clone(), d.clone()])
            .unwrap(),
        c.add(&d).unwrap()
    );
}

#[test]
fn test_non_square_product() {
    let a = m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    let b = m(vec![
        vec![1.0, 0.0, 2.0, 1.0],
        vec![0.0, 1.0, 1.0, 3.0],
        vec![2.0, 1.0, 0.0, 1.0],
    ]);
    let examples = ExampleSet::from_pairs(vec![(vec![a.clone(), b.clone()], a.multiply(&b).unwrap())])
        .unwrap();

    let mut synthesizer = EnumerativeSynthesizer::new(structural());
    let program = synthesizer.synthesize(&examples).unwrap();
    assert_eq!(program.to_string(), "var0.multiply(var1)");
    assert!(synthesizer.statistics().candidates_rejected > 0);
}

#[test]
fn test_triple_identity_is_consistent() {
    let id = ConcreteMatrix::identity(3).unwrap();
    let target = id.scale(&3.0);
    let examples =
        ExampleSet::from_pairs(vec![(vec![id.clone(), id.clone(), id], target)]).unwrap();

    let mut synthesizer = EnumerativeSynthesizer::new(structural());
    let program = synthesizer.synthesize(&examples).unwrap();
    assert!(program.depth() <= 2);
    assert!(reproduces(&program, &examples));
    assert_eq!(synthesizer.statistics().phase, SearchPhase::Found);
}

#[test]
fn test_timeout_is_respected() {
    let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    let unreachable = m(vec![vec![1.0, 2.0, 3.0, 4.0, 5.0]]);
    let examples = ExampleSet::from_pairs(vec![(vec![a], unreachable)]).unwrap();

    let timeout = Duration::from_millis(200);
    let config = SearchConfig::default()
        .with_timeout(timeout)
        .without_constants();
    let start = Instant::now();
    let err = EnumerativeSynthesizer::new(config)
        .synthesize(&examples)
        .unwrap_err();

    assert!(err.reason.contains("timed out"));
    assert!(start.elapsed() < timeout + Duration::from_secs(5));
}

#[test]
fn test_constant_recovery() {
    let c = m(vec![
        vec![1.0, 2.0, 3.0],
        vec![4.0, 5.0, 6.0],
        vec![7.0, 8.0, 9.0],
    ]);
    let id = ConcreteMatrix::identity(3).unwrap();
    let zero = ConcreteMatrix::zeros(3, 3).unwrap();
    let examples = ExampleSet::from_pairs(vec![
        (vec![id.clone()], id.add(&c).unwrap()),
        (vec![c.clone()], c.scale(&2.0)),
        (vec![zero], c.clone()),
    ])
    .unwrap();

    // Depth 1 cannot produce a fresh constant, so the solver has to
    let config = SearchConfig::default()
        .with_max_depth(1)
        .with_constants(
            ConstantConfig::default()
                .with_time_budget(Duration::from_secs(20))
                .with_solver_timeout(Duration::from_secs(10)),
        );
    let mut synthesizer = EnumerativeSynthesizer::new(config);
    let program = synthesizer.synthesize(&examples).unwrap();

    assert_eq!(
        program.to_string(),
        "var0.add(const[[1, 2, 3], [4, 5, 6], [7, 8, 9]])"
    );
    assert!(reproduces(&program, &examples));
    assert!(synthesizer.statistics().solver_sat >= 1);
}

#[test]
fn test_parallel_workers_agree() {
    let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    let b = m(vec![vec![0.0, 1.0], vec![2.0, 1.0]]);
    let target = a.multiply(&b.transpose()).unwrap();
    let examples = ExampleSet::from_pairs(vec![(vec![a, b], target)]).unwrap();

    let sequential = EnumerativeSynthesizer::new(structural())
        .synthesize(&examples)
        .unwrap();
    let parallel = EnumerativeSynthesizer::new(structural().with_workers(4))
        .synthesize(&examples)
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(sequential.depth(), 2);
}

#[test]
fn test_invalid_example_sets() {
    assert_eq!(ExampleSet::from_pairs(vec![]).unwrap_err(), ExampleError::Empty);

    let a = sample_a();
    let err = ExampleSet::from_pairs(vec![
        (vec![a.clone()], a.clone()),
        (vec![a.clone(), a.clone()], a),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        ExampleError::ArityMismatch {
            index: 1,
            expected: 1,
            found: 2
        }
    );
}
