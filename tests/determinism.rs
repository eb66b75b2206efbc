use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use cellrule::presets::PRESETS;
use cellrule::run;

#[test]
fn preset_runs_are_deterministic() {
    for preset in PRESETS {
        let mut fingerprints = HashSet::new();
        for _ in 0..5 {
            let doc = preset.document().expect("preset parses");
            let history = run(&doc).expect("preset runs");
            fingerprints.insert(history.fingerprint());
        }

        assert_eq!(fingerprints.len(), 1, "{} diverged across runs", preset.name);
    }
}

#[test]
fn failing_runs_fail_identically() {
    let doc = cellrule::parse_document(
        r#"
initial: "0000"
T: [ "..0": 1 ]
rules:
  - { start: 2, end: 3, name: T }
"#,
    )
    .expect("document parses");

    let first = run(&doc).unwrap_err();
    for _ in 0..3 {
        assert_eq!(run(&doc).unwrap_err(), first);
    }
}

#[test]
fn shared_document_across_threads() {
    let doc = Arc::new(PRESETS[0].document().expect("preset parses"));
    let expected = run(&doc).expect("preset runs").fingerprint();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let doc = Arc::clone(&doc);
            thread::spawn(move || run(&doc).expect("preset runs").fingerprint())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread completes"), expected);
    }
}
