mod common;
use common::{grid, metadata, recording, small_dataset};
use ndarray::Array3;
use visual_stim::{DatasetError, Recording, StimulusDataset, SubjectFilter, WindowConfig};

#[test]
fn select_trace_matches_time_axis() {
    let ds = small_dataset();
    for subject in ds.subject_ids() {
        for rep in 0..ds.num_repetitions() as i64 {
            let traces = ds.select_trace(subject, rep, &[2, 0, 1]).unwrap();
            assert_eq!(traces.len(), 3);
            assert_eq!(
                traces.iter().map(|t| t.electrode).collect::<Vec<_>>(),
                vec![2, 0, 1]
            );
            for trace in &traces {
                assert_eq!(trace.len(), ds.time().len());
                let times: Vec<f64> = trace.points.iter().map(|p| p.0).collect();
                assert_eq!(times, ds.time());
            }
        }
    }
}

#[test]
fn select_trace_values_come_from_the_recording() {
    let ds = small_dataset();
    let traces = ds.select_trace(0, 1, &[2]).unwrap();
    // subject 0 voltages are e + t + r
    let expected: Vec<f64> = (0..7).map(|t| (2 + t + 1) as f64).collect();
    let got: Vec<f64> = traces[0].points.iter().map(|p| p.1).collect();
    assert_eq!(got, expected);
}

#[test]
fn mismatched_time_axis_length_is_shape_mismatch() {
    let a = recording(0, "A", &grid(10), 2, 2, |_, _, _| 0.0);
    let b = recording(1, "A", &grid(11), 2, 2, |_, _, _| 0.0);
    let err = StimulusDataset::new(vec![a, b], WindowConfig::default()).unwrap_err();
    assert!(matches!(err, DatasetError::ShapeMismatch(_)), "{err}");
}

#[test]
fn mismatched_time_values_are_shape_mismatch() {
    let shifted: Vec<f64> = grid(10).iter().map(|t| t + 0.001).collect();
    let a = recording(0, "A", &grid(10), 2, 2, |_, _, _| 0.0);
    let b = recording(1, "A", &shifted, 2, 2, |_, _, _| 0.0);
    let err = StimulusDataset::new(vec![a, b], WindowConfig::default()).unwrap_err();
    assert!(matches!(err, DatasetError::ShapeMismatch(_)));
}

#[test]
fn mismatched_repetition_count_is_shape_mismatch() {
    let a = recording(0, "A", &grid(10), 2, 2, |_, _, _| 0.0);
    let b = recording(1, "A", &grid(10), 2, 3, |_, _, _| 0.0);
    let err = StimulusDataset::new(vec![a, b], WindowConfig::default()).unwrap_err();
    assert!(matches!(err, DatasetError::ShapeMismatch(_)));
}

#[test]
fn electrode_sets_may_differ_between_subjects() {
    let a = recording(0, "A", &grid(5), 2, 1, |_, _, _| 0.0);
    let b = Recording::new(vec![7, 9], grid(5), Array3::zeros((2, 5, 1)), metadata(1, "A")).unwrap();
    let ds = StimulusDataset::new(vec![a, b], WindowConfig::default()).unwrap();
    assert!(ds.select_trace(1, 0, &[9]).is_ok());
    assert_eq!(
        ds.select_trace(1, 0, &[0]).unwrap_err(),
        DatasetError::UnknownElectrode { subject: 1, electrode: 0 }
    );
}

#[test]
fn repetition_past_the_end_is_out_of_range() {
    let ds = small_dataset();
    let err = ds.select_trace(0, 2, &[0]).unwrap_err();
    assert_eq!(err, DatasetError::OutOfRange { index: 2, len: 2 });
}

#[test]
fn negative_repetition_is_out_of_range() {
    let ds = small_dataset();
    let err = ds.select_trace(0, -1, &[0]).unwrap_err();
    assert_eq!(err, DatasetError::OutOfRange { index: -1, len: 2 });
}

#[test]
fn unknown_subject() {
    let ds = small_dataset();
    assert_eq!(
        ds.select_trace(42, 0, &[0]).unwrap_err(),
        DatasetError::UnknownSubject(42)
    );
}

#[test]
fn invalid_window_config_is_rejected() {
    let a = recording(0, "A", &grid(5), 1, 1, |_, _, _| 0.0);
    let cfg = WindowConfig { lower: 1.5, upper: 0.5 };
    let err = StimulusDataset::new(vec![a], cfg).unwrap_err();
    assert!(matches!(err, DatasetError::InvalidWindow(_)));
}

#[test]
fn select_by_experimenter() {
    let ds = small_dataset();
    let filter = SubjectFilter {
        experimenters: Some(["Raphael".to_string()].into()),
        ..SubjectFilter::default()
    };
    let sub = ds.select(&filter).unwrap();
    assert_eq!(sub.subject_ids().collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(sub.experimenters().collect::<Vec<_>>(), vec!["Raphael"]);

    let nobody = SubjectFilter {
        experimenters: Some(["Splinter".to_string()].into()),
        ..SubjectFilter::default()
    };
    assert_eq!(ds.select(&nobody).unwrap_err(), DatasetError::EmptyDataset);
}

#[test]
fn dataset_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StimulusDataset>();

    let ds = small_dataset();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| ds.experimenter_statistics().unwrap()))
            .collect();
        let first = ds.experimenter_statistics().unwrap();
        for h in handles {
            assert_eq!(h.join().unwrap(), first);
        }
    });
}
