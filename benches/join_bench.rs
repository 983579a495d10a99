use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use fxhash::FxHashMap;
use oms_streams::attr::{AttrValue, Attributes};
use oms_streams::collector::{CollectorOptions, StreamInfoCollector};
use oms_streams::fetch::{StreamFetchMode, StreamRow};
use oms_streams::join::{LumisectionData, join_streams};
use oms_streams::oms::MemoryOms;
use oms_streams::record;
use std::hint::black_box;
use std::time::Duration;

const LUMISECTIONS: u32 = 2_000;
const STREAMS: [&str; 5] = [
    "PhysicsHLTPhysics0",
    "PhysicsHLTPhysics1",
    "ParkingSingleMuon0",
    "ScoutingPF",
    "Express",
];

fn stream_rows() -> Vec<StreamRow> {
    (1..=LUMISECTIONS)
        .flat_map(|ls| {
            STREAMS.iter().map(move |name| StreamRow {
                stream_name: name.to_string(),
                ls,
                rate: AttrValue::Float(150.0),
                file_size: AttrValue::Float(0.25),
                bandwidth: AttrValue::Float(11.0),
            })
        })
        .collect()
}

fn lumisection_maps() -> (
    FxHashMap<u32, Attributes>,
    FxHashMap<u32, f64>,
    FxHashMap<u32, f64>,
) {
    let mut details = FxHashMap::default();
    let mut deadtime = FxHashMap::default();
    let mut hlt_rates = FxHashMap::default();
    for ls in 1..=LUMISECTIONS {
        let mut attrs = Attributes::new();
        attrs.insert("lumisection_number".into(), AttrValue::from(ls));
        attrs.insert("pileup".into(), AttrValue::Float(62.5));
        attrs.insert("start_time".into(), AttrValue::from("2024-05-01T12:30:15Z"));
        attrs.insert("time".into(), AttrValue::Int(1714566615 + ls as i64 * 23));
        details.insert(ls, attrs);
        deadtime.insert(ls, 0.02);
        // Every tenth lumisection has no rate sample.
        if ls % 10 != 0 {
            hlt_rates.insert(ls, 1.5);
        }
    }
    (details, deadtime, hlt_rates)
}

fn memory_run(run: u32) -> MemoryOms {
    let lumisections = (1..=LUMISECTIONS).map(|ls| {
        record! {
            "run_number" => run,
            "lumisection_number" => ls,
            "start_time" => "2024-05-01T12:30:15Z",
            "pileup" => 62.5,
            "delivered_lumi_per_lumisection" => 10.0,
            "recorded_lumi_per_lumisection" => 9.8,
        }
    });
    let streams = (1..=LUMISECTIONS).flat_map(move |ls| {
        STREAMS.iter().map(move |name| {
            record! {
                "run_number" => run,
                "stream_name" => *name,
                "last_lumisection_number" => ls,
                "rate" => 150.0,
                "file_size" => 0.25,
                "bandwidth" => 11.0,
            }
        })
    });
    MemoryOms::new()
        .with("lumisections", lumisections)
        .with("streams", streams)
}

fn bench_join(c: &mut Criterion) {
    let rows = stream_rows();
    let (details, deadtime, hlt_rates) = lumisection_maps();
    let lumi = LumisectionData {
        details: &details,
        deadtime: &deadtime,
        hlt_rates: &hlt_rates,
    };

    let mut group = c.benchmark_group("join");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("join_streams_10k", |b| {
        b.iter_batched(
            || rows.clone(),
            |rows| black_box(join_streams(rows, lumi, "Status_OnGPU")),
            BatchSize::LargeInput,
        );
    });

    group.bench_function("collect_run_ranged_10k", |b| {
        b.iter_batched(
            || {
                let options = CollectorOptions {
                    stream_fetch: StreamFetchMode::Ranged,
                    ..CollectorOptions::default()
                };
                StreamInfoCollector::new(memory_run(1), options)
            },
            |mut collector| black_box(collector.collect_run(1)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_join);
criterion_main!(benches);
