use oms_streams::attr::AttrValue;
use oms_streams::collector::{CollectorOptions, StreamInfoCollector};
use oms_streams::error::Error;
use oms_streams::export::{read_export, write_export};
use oms_streams::fetch::{LS_LENGTH, StreamFetchMode};
use oms_streams::join::AggregateRecord;
use oms_streams::oms::{MemoryOms, Record};
use oms_streams::range::LsRange;
use oms_streams::record;
use oms_streams::runs::{RunSelection, resolve_runs};

const RUN: u32 = 386593;

fn lumisection(run: u32, ls: u32, delivered: f64, recorded: f64) -> Record {
    record! {
        "run_number" => run,
        "fill_number" => 9044u32,
        "lumisection_number" => ls,
        "start_time" => format!("2024-05-01T12:{:02}:00Z", ls),
        "pileup" => 60.0,
        "delivered_lumi_per_lumisection" => delivered,
        "recorded_lumi_per_lumisection" => recorded,
        "physics_flag" => true,
        "beam1_stable" => true,
        "beam2_stable" => true,
    }
}

fn stream(run: u32, name: &str, ls: u32) -> Record {
    record! {
        "run_number" => run,
        "stream_name" => name,
        "last_lumisection_number" => ls,
        "rate" => 100.0 + ls as f64,
        "file_size" => 0.5,
        "bandwidth" => 20.0,
    }
}

fn hlt_rate(run: u32, ls: u32, counter: f64) -> Record {
    record! {
        "run_number" => run,
        "path_name" => "Status_OnGPU",
        "first_lumisection_number" => ls,
        "last_lumisection_number" => ls,
        "counter" => counter,
    }
}

/// Three lumisections, stream "A" at LS 1 and 3 only.
fn three_lumisection_run(run: u32) -> MemoryOms {
    MemoryOms::new()
        .with(
            "lumisections",
            [
                lumisection(run, 1, 10.0, 9.0),
                lumisection(run, 2, 0.0, 0.0),
                lumisection(run, 3, 5.0, 5.0),
            ],
        )
        .with("streams", [stream(run, "A", 3), stream(run, "A", 1)])
        .with("hltpathrates", [hlt_rate(run, 1, 1000.0), hlt_rate(run, 2, 500.0)])
}

fn ls_column(records: &[AggregateRecord]) -> Vec<u32> {
    records.iter().filter_map(AggregateRecord::ls).collect()
}

#[test]
fn test_three_lumisection_join() {
    let mut collector = StreamInfoCollector::new(three_lumisection_run(RUN), CollectorOptions::default());

    let streams = collector.collect_run(RUN).unwrap();

    assert_eq!(streams.len(), 1);
    let a = &streams["A"];
    assert_eq!(ls_column(a), vec![1, 3]);
    assert!((a[0].get_f64("deadtime").unwrap() - 0.1).abs() < 1e-12);
    assert_eq!(a[1].get_f64("deadtime"), Some(0.0));

    assert_eq!(a[0].get_f64("hlt_rate_Status_OnGPU"), Some(1000.0 / LS_LENGTH));
    assert_eq!(a[1].get_f64("hlt_rate_Status_OnGPU"), Some(0.0));

    assert_eq!(a[0].get_f64("rate"), Some(101.0));
    assert_eq!(a[0].get_f64("size"), Some(0.5 * 1e9));
    assert_eq!(a[0].get_f64("bandwidth"), Some(20.0 * 1e6));
    assert_eq!(a[0].get_f64("pileup"), Some(60.0));
    assert_eq!(a[0].get("time"), Some(&AttrValue::Int(1714564860)));
    assert_eq!(
        a[0].get("start_time"),
        Some(&AttrValue::from("2024-05-01T12:01:00Z"))
    );
    // Only projected lumisection fields reach the output.
    assert!(a[0].get("physics_flag").is_none());
}

#[test]
fn test_ranged_fetch_matches_per_lumisection() {
    let mut per_ls = StreamInfoCollector::new(three_lumisection_run(RUN), CollectorOptions::default());
    let mut ranged = StreamInfoCollector::new(
        three_lumisection_run(RUN),
        CollectorOptions {
            stream_fetch: StreamFetchMode::Ranged,
            ..CollectorOptions::default()
        },
    );

    let expected = per_ls.collect_run(RUN).unwrap();
    assert_eq!(ranged.collect_run(RUN).unwrap(), expected);

    assert_eq!(per_ls.api().queries_for("streams"), 3);
    assert_eq!(ranged.api().queries_for("streams"), 1);
}

#[test]
fn test_output_is_sparse_and_ascending() {
    let run = 1000;
    let lumisections = (1..=20u32).map(|ls| lumisection(run, ls, 10.0, 9.5));
    let streams = [17u32, 4, 9, 4, 12, 1]
        .into_iter()
        .flat_map(|ls| [stream(run, "Express", ls), stream(run, "Physics", ls + 1)]);
    let oms = MemoryOms::new()
        .with("lumisections", lumisections)
        .with("streams", streams);
    let mut collector = StreamInfoCollector::new(oms, CollectorOptions::default());

    let result = collector.collect_run(run).unwrap();

    for records in result.values() {
        assert!(records.len() <= 20);
        let ls = ls_column(records);
        assert!(ls.windows(2).all(|w| w[0] <= w[1]));
        assert!(ls.iter().all(|l| (1..=20).contains(l)));
    }
    assert_eq!(ls_column(&result["Express"]), vec![1, 4, 4, 9, 12, 17]);
    assert_eq!(ls_column(&result["Physics"]), vec![2, 5, 5, 10, 13, 18]);
}

#[test]
fn test_window_restricts_lumisections() {
    let options = CollectorOptions {
        window: LsRange::new(2, 3),
        ..CollectorOptions::default()
    };
    let mut collector = StreamInfoCollector::new(three_lumisection_run(RUN), options);

    let streams = collector.collect_run(RUN).unwrap();
    assert_eq!(ls_column(&streams["A"]), vec![3]);
}

#[test]
fn test_window_outside_run() {
    let options = CollectorOptions {
        window: LsRange::new(50, 60),
        ..CollectorOptions::default()
    };
    let mut collector = StreamInfoCollector::new(three_lumisection_run(RUN), options);

    let err = collector.collect_run(RUN).unwrap_err();
    assert!(matches!(err, Error::EmptyWindow { run: RUN, .. }));
}

#[test]
fn test_failing_run_is_isolated() {
    let mut oms = three_lumisection_run(RUN);
    oms.insert("lumisections", [lumisection(RUN + 2, 1, 1.0, 1.0)]);
    oms.insert("streams", [stream(RUN + 2, "B", 1)]);
    let mut collector = StreamInfoCollector::new(oms, CollectorOptions::default());

    let outcome = collector.collect(&[RUN, RUN + 1, RUN + 2]);

    assert_eq!(outcome.data.keys().copied().collect::<Vec<_>>(), vec![RUN, RUN + 2]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].run, RUN + 1);
    assert!(matches!(outcome.failures[0].error, Error::NoLumisections { run } if run == RUN + 1));
    assert!(!outcome.all_failed());
}

#[test]
fn test_all_runs_failed() {
    let mut collector = StreamInfoCollector::new(MemoryOms::new(), CollectorOptions::default());
    let outcome = collector.collect(&[1, 2]);
    assert!(outcome.data.is_empty());
    assert!(outcome.all_failed());
}

#[test]
fn test_bad_start_time_fails_the_run() {
    let mut bad = lumisection(RUN, 2, 1.0, 1.0);
    if let Some(attrs) = bad.attributes.as_mut() {
        attrs.insert("start_time".into(), AttrValue::from("2024-05-01 12:00:00"));
    }
    let oms = MemoryOms::new()
        .with("lumisections", [lumisection(RUN, 1, 1.0, 1.0), bad])
        .with("streams", [stream(RUN, "A", 1)]);
    let mut collector = StreamInfoCollector::new(oms, CollectorOptions::default());

    assert!(matches!(collector.collect_run(RUN), Err(Error::Timestamp { .. })));
}

#[test]
fn test_fill_to_export() {
    let mut oms = three_lumisection_run(RUN);
    let mut unstable = lumisection(RUN + 1, 1, 1.0, 1.0);
    if let Some(attrs) = unstable.attributes.as_mut() {
        attrs.insert("beam2_stable".into(), AttrValue::Bool(false));
    }
    oms.insert("lumisections", [unstable]);

    let runs = resolve_runs(&mut oms, RunSelection::Fill(9044)).unwrap();
    assert_eq!(runs, vec![RUN]);

    let mut collector = StreamInfoCollector::new(oms, CollectorOptions::default());
    let outcome = collector.collect(&runs);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("detailed_stream_data.json");
    write_export(&path, &outcome.data).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("{\n    \"386593\": {\n        \"A\": ["));
    assert_eq!(read_export(&path).unwrap(), outcome.data);
}
