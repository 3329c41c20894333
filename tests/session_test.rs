use std::collections::HashMap;

use horizons::database::{MemoryScoreStore, ScoreStore};
use horizons::input::{ActionKind, InputFrame, InputOrigin, MenuCommand};
use horizons::model::{BeatMap, BeatMapFormat, LevelId};
use horizons::play::{
    Autoplay, END_DELAY_SECS, Judgement, NullSpawnSink, PlayPhase, PlaySession, RecordingSpawnSink,
    SessionConfig, TravelConfig,
};
use horizons::state::{PlayScreen, ScreenExit};
use horizons::traits::input::ActionSource;
use horizons::traits::time::{MockTimeProvider, TimeProvider};

const STEP_US: i64 = 10_000;

fn config() -> SessionConfig {
    SessionConfig {
        level: LevelId::from("level_3"),
        grace_period: 0.3,
        travel: TravelConfig {
            distance: 700.0,
            obstacle_speed: 700.0,
            guideline_speed: 350.0,
        },
        end_delay: END_DELAY_SECS,
    }
}

fn session(text: &str) -> PlaySession {
    let map = BeatMap::parse(text, BeatMapFormat::Auto).unwrap();
    PlaySession::new(map, config()).unwrap()
}

/// Wall-clock times (us) of the spawn and the judgement of note 0.
fn spawn_and_judge_times(pause: Option<(i64, i64)>) -> (i64, f64, i64, f64) {
    let mut s = session("5 5.1 S\n");
    let clock = MockTimeProvider::new();
    s.start(clock.now_us());

    let mut spawned = None;
    let mut judged = None;
    let mut sink = RecordingSpawnSink::new();
    while judged.is_none() {
        clock.advance(STEP_US);
        let now = clock.now_us();
        if let Some((from, to)) = pause {
            if now == from {
                assert!(s.pause(now));
            }
            if now == to {
                assert!(s.resume(now));
            }
        }
        let outcome = s.tick_with(now, &InputFrame::idle(), &mut sink);
        if !outcome.spawned.is_empty() {
            spawned = Some((now, outcome.effective_time));
        }
        if let Some(event) = outcome.judgements.first() {
            assert_eq!(event.judgement, Judgement::Miss);
            judged = Some((now, event.effective_time));
        }
    }
    let (spawn_wall, spawn_effective) = spawned.unwrap();
    let (judge_wall, judge_effective) = judged.unwrap();
    assert_eq!(sink.indices(), vec![0]);
    (spawn_wall, spawn_effective, judge_wall, judge_effective)
}

#[test]
fn test_pause_shifts_timeline_by_pause_length() {
    let unpaused = spawn_and_judge_times(None);
    let paused = spawn_and_judge_times(Some((1_000_000, 6_000_000)));

    assert_eq!(paused.0, unpaused.0 + 5_000_000);
    assert_eq!(paused.1, unpaused.1);
    assert_eq!(paused.2, unpaused.2 + 5_000_000);
    assert_eq!(paused.3, unpaused.3);
}

#[test]
fn test_paused_ticks_change_nothing() {
    let mut s = session("1 1.1 S\n");
    s.start(0);
    s.tick(100_000, &InputFrame::idle());
    assert!(s.pause(200_000));
    assert!(!s.pause(300_000));

    let hit = InputFrame::idle().with_event(ActionKind::Activate, InputOrigin::Sensor);
    for now in (300_000..10_000_000).step_by(STEP_US as usize) {
        let outcome = s.tick(now, &hit);
        assert!(outcome.judgements.is_empty());
        assert_eq!(outcome.effective_time, 0.2);
    }
    assert_eq!(s.score().score, 0);
    assert_eq!(s.phase(), PlayPhase::Paused);
}

#[test]
fn test_every_note_judged_exactly_once() {
    let text = "1 1.1 S U\n1.5 3 L D\n2 2.1 S M\n4 6 L U\n4.5 4.6 S D\n";
    let mut s = session(text);
    s.start(0);
    let hit = InputFrame::idle().with_event(ActionKind::Activate, InputOrigin::Keyboard);

    let mut counts: HashMap<usize, usize> = HashMap::new();
    let mut now = 0;
    while !s.is_finished() {
        now += STEP_US;
        let frame = if now % 300_000 == 0 {
            hit.clone()
        } else {
            InputFrame::idle()
        };
        for event in s.tick(now, &frame).judgements {
            *counts.entry(event.index).or_default() += 1;
        }
    }

    assert_eq!(counts.len(), 5);
    assert!(counts.values().all(|&c| c == 1));
    assert!(s.notes().iter().all(|n| n.checked));
}

#[test]
fn test_autoplay_clears_level() {
    let text = "1 1.1 S U\n1.5 3 L D\n3.5 3.6 S M\n4 6 L U\n6.5 6.6 S D\n7 8 L M\n";
    let s = session(text);
    let max_score = s.score().max_score();
    let autoplay = Autoplay::new(s.notes());
    let mut screen = PlayScreen::new(s, autoplay, None, MemoryScoreStore::new(), 1_000_000);

    let clock = MockTimeProvider::new();
    let mut sink = NullSpawnSink;
    let exit = loop {
        if let Some(exit) = screen.update(clock.now_us(), &mut sink).unwrap() {
            break exit;
        }
        clock.advance(STEP_US);
        assert!(clock.now_us() < 60_000_000);
    };

    let ScreenExit::Finished(result) = exit else {
        panic!("unexpected exit {exit:?}");
    };
    assert_eq!(result.misses, 0);
    assert_eq!(result.perfect, 6);
    assert_eq!(result.max_streak, 6);
    assert!(result.score + 2 >= max_score, "score {} of {}", result.score, max_score);
    assert_eq!(result.stars, [true, true, true]);

    let stored = screen.store().load(&LevelId::from("level_3"));
    assert_eq!(stored.high_score.score, result.score);
    assert_eq!(screen.store().records(), 1);
}

/// Autoplay that also presses pause once at a fixed track time.
struct PauseOnce {
    inner: Autoplay,
    at: f64,
    done: bool,
}

impl ActionSource for PauseOnce {
    fn poll(&mut self, effective_time: f64) -> InputFrame {
        let frame = self.inner.poll(effective_time);
        if !self.done && effective_time >= self.at {
            self.done = true;
            return frame.with_event(ActionKind::Pause, InputOrigin::Keyboard);
        }
        frame
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[test]
fn test_restart_from_pause_menu_rearms_reporting() {
    let s = session("1 1.1 S\n");
    let input = PauseOnce {
        inner: Autoplay::new(s.notes()),
        at: 1.5,
        done: false,
    };
    let mut screen = PlayScreen::new(s, input, None, MemoryScoreStore::new(), 1_000_000);
    let mut sink = NullSpawnSink;

    let mut now = 0;
    while !screen.is_paused() {
        assert_eq!(screen.update(now, &mut sink).unwrap(), None);
        now += STEP_US;
    }
    assert_eq!(screen.session().score().score, 10);

    screen.push_menu_command(MenuCommand::Next);
    screen.push_menu_command(MenuCommand::Confirm);
    assert_eq!(screen.update(now, &mut sink).unwrap(), None);
    assert_eq!(screen.session().phase(), PlayPhase::Playing);
    assert_eq!(screen.session().score().score, 0);
    assert_eq!(screen.session().effective_time(now), 0.0);

    let exit = loop {
        now += STEP_US;
        if let Some(exit) = screen.update(now, &mut sink).unwrap() {
            break exit;
        }
    };
    let ScreenExit::Finished(result) = exit else {
        panic!("unexpected exit {exit:?}");
    };
    assert_eq!(result.score, 10);
    assert_eq!(result.misses, 0);
    assert_eq!(screen.store().records(), 1);
}
