use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use horizons::input::{ActionKind, HeldPlacement, InputFrame, InputOrigin};
use horizons::model::{BeatMap, BeatMapFormat, LevelId};
use horizons::play::{PlaySession, SessionConfig, TravelConfig};

fn large_map(notes: usize) -> String {
    let placements = ["U", "D", "M"];
    let mut text = String::new();
    for i in 0..notes {
        let start = i as f64 * 0.5;
        if i % 4 == 3 {
            let placement = placements[i % placements.len()];
            text.push_str(&format!("{} {} L {}\n", start, start + 0.4, placement));
        } else {
            text.push_str(&format!("{} {} S {}\n", start, start + 0.1, placements[i % 2]));
        }
    }
    text
}

fn config() -> SessionConfig {
    SessionConfig {
        level: LevelId::from("bench"),
        grace_period: 0.3,
        travel: TravelConfig::default(),
        end_delay: 2.0,
    }
}

fn parse_benchmark(c: &mut Criterion) {
    let text = large_map(2_000);
    c.bench_function("parse_2000_notes", |b| {
        b.iter(|| BeatMap::parse(black_box(&text), BeatMapFormat::Auto).unwrap());
    });
}

fn tick_benchmark(c: &mut Criterion) {
    let map = BeatMap::parse(&large_map(2_000), BeatMapFormat::FourField).unwrap();
    let hold = InputFrame::holding(HeldPlacement::UP)
        .with_event(ActionKind::Activate, InputOrigin::Sensor);

    let mut group = c.benchmark_group("session");

    group.bench_function("tick_mid_song", |b| {
        b.iter_batched(
            || {
                let mut session = PlaySession::new(map.clone(), config()).unwrap();
                session.start(0);
                session.tick(500_000_000, &InputFrame::idle());
                session
            },
            |mut session| {
                for step in 1..=120 {
                    black_box(session.tick(500_000_000 + step * 8_333, &hold));
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("full_run_120hz", |b| {
        b.iter_batched(
            || {
                let mut session = PlaySession::new(map.clone(), config()).unwrap();
                session.start(0);
                session
            },
            |mut session| {
                let mut now = 0;
                while !session.is_finished() {
                    now += 8_333;
                    black_box(session.tick(now, &hold));
                }
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, parse_benchmark, tick_benchmark);
criterion_main!(benches);
