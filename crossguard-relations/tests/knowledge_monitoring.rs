//! Monitoring with declarative models
//!
//! Covers:
//! - Resolution of the redundant speed model from JSON
//! - Fault attribution across availability changes
//! - Loading models from files
//! - Multi-input, stateful and code-registered relations

mod common;

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crossguard_core::{
    BayesMode, Bindings, Interval, Itom, Itoms, Monitor, MonitorConfig, MonitorError, Relation,
    RelationResolver, Scope, Variable,
};
use crossguard_relations::{KnowledgeBase, KnowledgeError};

use common::{batch, scalar_readings, simple_model, POWER_MODEL, SIMPLE_MODEL};

#[test]
fn simple_model_resolves_six_paths() {
    let chains = simple_model()
        .resolve(&Variable::new("x"), &scalar_readings())
        .unwrap();
    assert_eq!(chains.len(), 6);

    let monitor = Monitor::new(simple_model(), "x", &scalar_readings()).unwrap();
    let inputs: Vec<Vec<&str>> = monitor
        .substitutions()
        .unwrap()
        .iter()
        .map(|s| s.input_variables().iter().map(Variable::name).collect())
        .collect();
    assert_eq!(
        inputs,
        vec![
            vec!["x1"],
            vec!["x2"],
            vec!["a1"],
            vec!["b1"],
            vec!["c1"],
            vec!["d1"]
        ]
    );
}

#[test]
fn bad_source_is_blamed_across_availability_changes() {
    let mut monitor = Monitor::new(simple_model(), "x", &Default::default()).unwrap();
    assert!(monitor.substitutions().is_none());

    let fault = monitor.monitor(&scalar_readings()).unwrap().expect("d1 disagrees");
    assert_eq!(monitor.substitutions().map(<[_]>::len), Some(6));
    assert_eq!(fault.failed_itoms(), vec!["d1"]);

    // All intervals intersect in the common domain
    let agreeing = batch(&[
        ("x1", Interval::new(9.0, 11.0), "x"),
        ("a1", Interval::new(4.9, 5.1), "a"),
        ("b1", Interval::new(4.0, 6.0), "b"),
    ]);
    assert_eq!(monitor.monitor(&agreeing).unwrap(), None);
    assert_eq!(monitor.substitutions().map(<[_]>::len), Some(3));

    // d / 2 = [11.5, 12.5] misses [9, 11]
    let disagreeing = batch(&[
        ("x1", Interval::new(9.0, 11.0), "x"),
        ("a1", Interval::new(4.9, 5.1), "a"),
        ("d1", Interval::new(23.0, 25.0), "d"),
    ]);
    let fault = monitor.monitor(&disagreeing).unwrap().expect("d1 disagrees");
    assert_eq!(fault.failed_itoms(), vec!["d1"]);
}

#[test]
fn vote_blames_the_same_source() {
    let itoms = batch(&[
        ("x1", Interval::new(9.0, 11.0), "x"),
        ("a1", Interval::new(4.9, 5.1), "a"),
        ("d1", Interval::new(23.0, 25.0), "d"),
    ]);
    let config = MonitorConfig::default().with_bayes(BayesMode::Boolean);
    let mut monitor = Monitor::new_with_config(simple_model(), "x", &itoms, config).unwrap();

    let fault = monitor.monitor(&itoms).unwrap().expect("d1 disagrees");
    assert_eq!(fault.failed_itoms(), vec!["d1"]);
    assert_eq!(fault.probability, Some(1.0));
}

#[test]
fn model_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SIMPLE_MODEL.as_bytes()).unwrap();

    let mut knowledge = KnowledgeBase::new();
    knowledge.load(file.path()).unwrap();
    assert_eq!(knowledge.facts().len(), 4);
    assert_eq!(knowledge.registry().len(), 4);

    // Loading appends: every relation is now implemented twice
    knowledge.load(file.path()).unwrap();
    assert_eq!(knowledge.facts().len(), 8);
    assert!(matches!(
        Monitor::new(knowledge, "x", &scalar_readings()),
        Err(MonitorError::AmbiguousImplementation { .. })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = KnowledgeBase::new().load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(KnowledgeError::Io(_))));
}

#[test]
fn missing_implementation_is_fatal() {
    let mut knowledge = KnowledgeBase::new();
    knowledge.add_function("x", "r_unknown", ["a"]).unwrap();
    let itoms = batch(&[("x1", 10.0, "x"), ("a1", 5.0, "a")]);

    assert!(matches!(
        Monitor::new(knowledge, "x", &itoms),
        Err(MonitorError::NoImplementation { .. })
    ));
}

#[test]
fn empty_knowledge_base_stays_cold() {
    let itoms = batch(&[("x1", 10.0, "x")]);
    let mut monitor = Monitor::new(KnowledgeBase::new(), "x", &itoms).unwrap();
    assert!(!monitor.is_armed());
    assert!(matches!(
        monitor.monitor(&itoms),
        Err(MonitorError::RelationResolution { .. })
    ));
}

#[test]
fn multi_input_relations_combine_sources() {
    let knowledge = KnowledgeBase::from_json(POWER_MODEL).unwrap();
    let healthy = batch(&[
        ("p1", Interval::point(12.0), "p"),
        ("u1", Interval::new(5.9, 6.1), "u"),
        ("i1", Interval::new(1.95, 2.05), "i"),
        ("uc1", Interval::new(2.9, 3.1), "u_cell1"),
        ("uc2", Interval::new(2.95, 3.05), "u_cell2"),
    ]);
    let mut monitor = Monitor::new(knowledge, "p", &healthy).unwrap();
    assert_eq!(monitor.substitutions().map(<[_]>::len), Some(3));
    assert_eq!(monitor.monitor(&healthy).unwrap(), None);

    let bad_cell = batch(&[
        ("p1", Interval::point(12.0), "p"),
        ("u1", Interval::new(5.9, 6.1), "u"),
        ("i1", Interval::new(1.95, 2.05), "i"),
        ("uc1", Interval::new(2.9, 3.1), "u_cell1"),
        ("uc2", Interval::new(5.0, 5.1), "u_cell2"),
    ]);
    let fault = monitor.monitor(&bad_cell).unwrap().expect("cell disagrees");
    let blamed = fault.failed_itoms();
    assert!(blamed.contains(&"uc2"));
    assert!(!blamed.contains(&"p1"));
}

#[test]
fn stateful_relation_smooths_across_ticks() {
    let knowledge = KnowledgeBase::from_json(
        r#"{"functions":[{"output":"x","relation":"smooth","inputs":["a"]}],
            "implementations":[{"relation":"smooth","kind":"ema","alpha":0.5}]}"#,
    )
    .unwrap();
    let tick = |a: f64| batch(&[("x1", 10.0, "x"), ("a1", a, "a")]);
    let mut monitor = Monitor::new(knowledge, "x", &tick(10.0)).unwrap();

    let smoothed: Rc<RefCell<Vec<f64>>> = Rc::default();
    let sink = Rc::clone(&smoothed);
    monitor.set_debug_callback(move |record| {
        sink.borrow_mut().extend(
            record
                .outputs
                .iter()
                .filter(|output| output.substitution == 1)
                .map(|output| output.itom.value().midpoint()),
        );
    });

    for a in [10.0, 14.0, 14.0] {
        monitor.monitor(&tick(a)).unwrap();
    }
    assert_eq!(*smoothed.borrow(), vec![10.0, 12.0, 13.0]);
}

#[test]
fn smoothing_ignores_buffer_size() {
    let model = r#"{"functions":[{"output":"x","relation":"smooth","inputs":["a"]}],
        "implementations":[{"relation":"smooth","kind":"ema","alpha":0.5}]}"#;
    let tick = |t: f64, a: f64| -> Itoms {
        [
            Itom::new("x1", 10.0, "x").with_timestamp(t),
            Itom::new("a1", a, "a").with_timestamp(t),
        ]
        .into_iter()
        .collect()
    };

    for buffer_size in [1, 2, 3] {
        let config = MonitorConfig::default().with_buffer_size(buffer_size);
        let knowledge = KnowledgeBase::from_json(model).unwrap();
        let mut monitor = Monitor::new_with_config(knowledge, "x", &tick(0.0, 10.0), config).unwrap();

        let smoothed: Rc<RefCell<Vec<f64>>> = Rc::default();
        let sink = Rc::clone(&smoothed);
        monitor.set_debug_callback(move |record| {
            sink.borrow_mut().extend(
                record
                    .outputs
                    .iter()
                    .filter(|output| output.substitution == 1)
                    .map(|output| output.itom.value().midpoint()),
            );
        });

        for (t, a) in [(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)] {
            monitor.monitor(&tick(t, a)).unwrap();
        }
        assert_eq!(*smoothed.borrow(), vec![10.0, 15.0, 22.5], "buffer of {}", buffer_size);
    }
}

#[test]
fn registered_closures_join_json_facts() {
    let mut knowledge = KnowledgeBase::from_json(
        r#"{"functions":[{"output":"area","relation":"square","inputs":["side"]}]}"#,
    )
    .unwrap();
    knowledge.register(
        "square",
        Relation::new("v0 * v0", |inputs: &Bindings<'_>, _: &mut Scope| {
            let side = inputs.value("side")?;
            Ok(side * side)
        }),
    );

    let itoms = batch(&[("area1", 16.0, "area"), ("s1", 4.0, "side")]);
    let mut monitor = Monitor::new(knowledge, "area", &itoms).unwrap();
    assert_eq!(monitor.monitor(&itoms).unwrap(), None);

    let wrong = batch(&[("area1", 25.0, "area"), ("s1", 4.0, "side")]);
    assert!(monitor.monitor(&wrong).unwrap().is_some());
}
