mod common;
use std::collections::BTreeSet;

use approx::assert_abs_diff_eq;
use common::{grid, recording, small_dataset};
use visual_stim::{DatasetError, StimulusDataset, StimulusWindow, WindowConfig};

#[test]
fn keys_are_the_experimenters() {
    let ds = small_dataset();
    let stats = ds.experimenter_statistics().unwrap();
    let keys: BTreeSet<&str> = stats.keys().map(String::as_str).collect();
    let names: BTreeSet<&str> = ds.experimenters().collect();
    assert_eq!(keys, names);
    assert_eq!(keys, BTreeSet::from(["Leonardo", "Raphael"]));
}

#[test]
fn constant_data_has_zero_spread() {
    let v = 0.375;
    let time = grid(20);
    let recs = vec![
        recording(0, "Leonardo", &time, 3, 2, |_, _, _| v),
        recording(1, "Donatello", &time, 3, 2, |_, _, _| v),
        recording(2, "Leonardo", &time, 3, 2, |_, _, _| v),
    ];
    let ds = StimulusDataset::new(recs, WindowConfig::default()).unwrap();
    let stats = ds.experimenter_statistics().unwrap();
    assert_eq!(stats.len(), 2);
    for s in stats.values() {
        assert_abs_diff_eq!(s.mean, v, epsilon = 1e-12);
        assert_abs_diff_eq!(s.std, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.median, v, epsilon = 1e-12);
    }
}

#[test]
fn pools_all_subjects_of_an_experimenter() {
    // Leonardo: subject 0 is all 1.0, subject 2 all 3.0 -> mean 2, std 1, median 2
    let time = grid(5);
    let recs = vec![
        recording(0, "Leonardo", &time, 2, 2, |_, _, _| 1.0),
        recording(1, "Raphael", &time, 2, 2, |_, _, _| 10.0),
        recording(2, "Leonardo", &time, 2, 2, |_, _, _| 3.0),
    ];
    let ds = StimulusDataset::new(recs, WindowConfig::default()).unwrap();
    let stats = ds.experimenter_statistics().unwrap();
    let leo = stats["Leonardo"];
    assert_abs_diff_eq!(leo.mean, 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(leo.std, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(leo.median, 2.0, epsilon = 1e-12);
    assert_eq!(stats["Raphael"].mean, 10.0);
    assert_eq!(ds.pooled_samples("Leonardo").unwrap().len(), 2 * 2 * 5 * 2);
}

#[test]
fn statistics_ignore_subject_order() {
    let time = grid(9);
    let build = |ids: &[u32]| {
        let recs = ids.iter().map(|&id| {
            let name = if id % 3 == 0 { "Michelangelo" } else { "Donatello" };
            recording(id, name, &time, 2, 3, move |e, t, r| {
                ((id as usize * 31 + e * 7 + t * 3 + r) % 17) as f64 * 0.1 - 0.4
            })
        });
        StimulusDataset::new(recs, WindowConfig::default()).unwrap()
    };
    let forward = build(&[0, 1, 2, 3, 4, 5, 6]);
    let shuffled = build(&[4, 6, 0, 3, 5, 1, 2]);
    assert_eq!(
        forward.experimenter_statistics().unwrap(),
        shuffled.experimenter_statistics().unwrap()
    );
}

#[test]
fn empty_window_reports_empty_group() {
    let time = [0.0, 0.1, 0.2];
    let rec = recording(0, "Leonardo", &time, 2, 1, |_, _, _| 1.0);
    let ds = StimulusDataset::new(vec![rec], WindowConfig::default()).unwrap();
    let err = ds.post_stimulus().experimenter_statistics().unwrap_err();
    assert_eq!(err, DatasetError::EmptyGroup("Leonardo".to_string()));
    assert_eq!(ds.window_statistics().unwrap_err(), err);
}

#[test]
fn window_statistics_cover_all_windows() {
    let ds = small_dataset();
    let per_window = ds.window_statistics().unwrap();
    assert_eq!(
        per_window.keys().copied().collect::<Vec<_>>(),
        StimulusWindow::ALL.to_vec()
    );
    let during = ds.during_stimulus().experimenter_statistics().unwrap();
    assert_eq!(per_window[&StimulusWindow::During], during);
}
