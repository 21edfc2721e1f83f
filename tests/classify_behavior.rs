// Behavioral tests for session classification.
use rstest::rstest;
use snapmid::{ClassifyError, Label, Session, Snapshot, classify};

fn session(snapshots: &[&[&str]]) -> Session {
    Session::new(
        snapshots
            .iter()
            .map(|lines| Snapshot::from_lines(lines.iter().copied()))
            .collect(),
    )
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

mod empty_and_noop_behavior {
    use super::*;

    #[test]
    fn single_snapshot_session_yields_empty_output() {
        init_logging();
        let result = classify(&session(&[&["x = 1", "y = 2"]])).unwrap();
        assert!(result.labels.is_empty());
        assert!(result.forward_progress.is_empty());
        assert!(result.adjustment_locations.is_empty());
    }

    #[rstest]
    #[case::identical(&["x = 1"], &["x = 1"])]
    #[case::comment_only_change(&["x = 1  # old"], &["x = 1  # new"])]
    #[case::comment_line_added(&["x = 1"], &["x = 1", "# note to self"])]
    fn unchanged_after_stripping_is_none(#[case] before: &[&str], #[case] after: &[&str]) {
        init_logging();
        let result = classify(&session(&[before, after])).unwrap();
        assert_eq!(result.labels, vec![Label::None]);
    }
}

mod test_churn_behavior {
    use super::*;

    #[rstest]
    #[case::print_inserted(&["total = 0"], &["total = 0", "print(total)"])]
    #[case::print_removed(&["total = 0", "print(total)"], &["total = 0"])]
    #[case::print_argument_edited(&["print(1)"], &["print(2)"])]
    #[case::harness_line_edited(&["x = 1"], &["x = 11"])]
    fn debug_churn_is_test(#[case] before: &[&str], #[case] after: &[&str]) {
        init_logging();
        let result = classify(&session(&[before, after])).unwrap();
        assert_eq!(result.labels, vec![Label::Test]);
        assert!(result.forward_progress.is_empty());
    }

    #[test]
    fn print_swamped_additions_with_deletion_keep_test_label() {
        init_logging();
        // The print edit matches the substantive addition count, so no
        // forward progress is recorded, and the deletion alongside it
        // does not downgrade the transition to an adjustment.
        let result = classify(&session(&[
            &["def f():"],
            &["def f():", "    a = 1", "    b = 2", "print(1)"],
            &["def f():", "    b = 2", "    c = 3", "print(2)"],
        ]))
        .unwrap();
        assert_eq!(result.labels, vec![Label::ForwardProg(2), Label::Test]);
        assert!(result.adjustment_locations.is_empty());
    }
}

mod forward_progress_behavior {
    use super::*;

    #[test]
    fn substantive_additions_are_forward_progress_with_a_step() {
        init_logging();
        let result = classify(&session(&[
            &["def f():"],
            &["def f():", "    x = 1", "    y = 2"],
        ]))
        .unwrap();
        assert_eq!(result.labels, vec![Label::ForwardProg(2)]);
        assert_eq!(
            result.forward_progress,
            vec![vec!["    x = 1".to_string(), "    y = 2".to_string()]]
        );
        assert!(result.adjustment_locations.is_empty());
    }

    #[test]
    fn definition_line_counts_without_indentation() {
        init_logging();
        let result = classify(&session(&[&[], &["def f(a, b):"]])).unwrap();
        assert_eq!(result.labels, vec![Label::ForwardProg(1)]);
    }
}

mod adjustment_behavior {
    use super::*;

    /// Session with one recorded forward-progress step (`x = 1`, `y = 2`).
    fn with_history(last: &[&str]) -> Session {
        session(&[
            &["def f():"],
            &["def f():", "    x = 1", "    y = 2"],
            last,
        ])
    }

    #[test]
    fn block_deletion_refers_back_to_its_step() {
        init_logging();
        let s = with_history(&["def f():", "    y = 2"]);
        let result = classify(&s).unwrap();
        assert_eq!(
            result.labels,
            vec![Label::ForwardProg(2), Label::Adjustment]
        );
        assert_eq!(result.adjustment_locations.len(), 1);
        assert_eq!(
            result.adjustment_locations[0].iter().copied().collect::<Vec<_>>(),
            vec![0]
        );
        // The matched stored line is normalized to its trimmed form.
        assert_eq!(result.forward_progress[0][0], "x = 1");
    }

    #[test]
    fn block_deletion_without_history_is_an_error() {
        init_logging();
        let err = classify(&session(&[
            &["def f():", "    x = 1"],
            &["def f():"],
        ]))
        .unwrap_err();
        assert_eq!(err, ClassifyError::empty_history(0, "    x = 1"));
    }

    #[test]
    fn swapped_lines_are_an_adjustment_not_progress() {
        init_logging();
        let s = with_history(&["def f():", "    y = 2", "    x = 1"]);
        let result = classify(&s).unwrap();
        assert_eq!(
            result.labels,
            vec![Label::ForwardProg(2), Label::Adjustment]
        );
        // Only the original step exists; the swap recorded no new one.
        assert_eq!(result.forward_progress.len(), 1);
    }

    #[test]
    fn intraline_edit_of_a_block_line_is_an_adjustment() {
        init_logging();
        let result = classify(&session(&[
            &["def f():"],
            &["def f():", "    x = 1"],
            &["def f():", "    x = 2"],
        ]))
        .unwrap();
        assert_eq!(
            result.labels,
            vec![Label::ForwardProg(1), Label::Adjustment]
        );
        assert_eq!(result.adjustment_locations.len(), 1);
        assert!(result.adjustment_locations[0].contains(&0));
    }

    #[test]
    fn unmatched_deletion_defaults_to_most_recent_step() {
        init_logging();
        // `seed = 0` predates all recorded steps, so deleting it matches
        // nothing and falls back to the latest step.
        let result = classify(&session(&[
            &["def f():", "    seed = 0"],
            &["def f():", "    seed = 0", "    x = 1"],
            &["def f():", "    x = 1"],
        ]))
        .unwrap();
        assert_eq!(
            result.labels,
            vec![Label::ForwardProg(1), Label::Adjustment]
        );
        assert_eq!(
            result.adjustment_locations[0].iter().copied().collect::<Vec<_>>(),
            vec![0]
        );
    }
}

mod dual_emission_behavior {
    use super::*;

    #[test]
    fn delete_plus_new_progress_emits_adjustment_then_forward_prog() {
        init_logging();
        let result = classify(&session(&[
            &["def f():"],
            &["def f():", "    a = 1", "    b = 2"],
            &["def f():", "    b = 2", "    c = 3"],
        ]))
        .unwrap();
        assert_eq!(
            result.labels,
            vec![
                Label::ForwardProg(2),
                Label::Adjustment,
                Label::ForwardProg(1),
            ]
        );
        // Exactly one location set, for the one emitted ADJUSTMENT.
        assert_eq!(result.adjustment_locations.len(), 1);
        assert!(result.adjustment_locations[0].contains(&0));
        assert_eq!(
            result.forward_progress.last().unwrap(),
            &vec!["    c = 3".to_string()]
        );
    }
}

mod whole_session_behavior {
    use super::*;

    fn rainfall_session() -> Session {
        session(&[
            &["def rainfall(rain_list):"],
            &["def rainfall(rain_list):", "    total = 0", "    count = 0"],
            &[
                "def rainfall(rain_list):",
                "    total = 0",
                "    count = 0",
                "print(rain_list)",
            ],
            &["def rainfall(rain_list):", "    total = 0", "    count = 0"],
            &["def rainfall(rain_list):", "    count = 0", "    total = 0"],
            &["def rainfall(rain_list):", "    count = 0", "    total = 0"],
            &[
                "def rainfall(rain_list):",
                "    count = 0",
                "    total = 0",
                "    return total",
            ],
        ])
    }

    #[test]
    fn full_session_label_sequence() {
        init_logging();
        let result = classify(&rainfall_session()).unwrap();
        assert_eq!(
            result.labels,
            vec![
                Label::ForwardProg(2),
                Label::Test,
                Label::Test,
                Label::Adjustment,
                Label::None,
                Label::ForwardProg(1),
            ]
        );
        assert_eq!(result.forward_progress.len(), 2);
        // The swap deletes and re-adds one of the two bag-equal lines;
        // which one is the differ's choice of anchor. The resolver
        // normalizes exactly the re-added line's stored text.
        let step = &result.forward_progress[0];
        let trimmed: Vec<&str> = step.iter().map(|line| line.trim()).collect();
        assert_eq!(trimmed, vec!["total = 0", "count = 0"]);
        let normalized = step.iter().filter(|line| !line.starts_with(' ')).count();
        assert_eq!(normalized, 1);
        assert_eq!(
            result.forward_progress[1],
            vec!["    return total".to_string()]
        );
        assert_eq!(result.adjustment_locations.len(), 1);
    }

    #[test]
    fn classification_is_idempotent() {
        init_logging();
        let s = rainfall_session();
        assert_eq!(classify(&s).unwrap(), classify(&s).unwrap());
    }

    #[test]
    fn rendered_labels_match_report_format() {
        let result = classify(&rainfall_session()).unwrap();
        let rendered: Vec<String> = result.labels.iter().map(Label::to_string).collect();
        assert_eq!(
            rendered,
            vec![
                "FORWARD_PROG:2",
                "TEST",
                "TEST",
                "ADJUSTMENT",
                "NONE",
                "FORWARD_PROG:1",
            ]
        );
    }

    #[test]
    fn output_serializes_for_downstream_reports() {
        let result = classify(&rainfall_session()).unwrap();
        let value = serde_json::to_value(&result.labels).unwrap();
        assert_eq!(value[0], serde_json::json!({ "ForwardProg": 2 }));
        assert_eq!(value[1], serde_json::json!("Test"));
    }
}
