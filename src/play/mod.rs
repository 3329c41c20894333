//! Gameplay engine: scheduling, judgement, scoring and session flow.

pub mod autoplay;
pub mod clock;
pub mod judge;
pub mod result;
pub mod scheduler;
pub mod score;
pub mod session;

pub use autoplay::Autoplay;
pub use clock::SessionClock;
pub use judge::{Judge, JudgeEvent, Judgement};
pub use result::{ResultReporter, SessionResult};
pub use scheduler::{Scheduler, TravelConfig};
pub use score::{STAR_TENTHS, ScoreState, StarThresholds};
pub use session::{END_DELAY_SECS, PlayPhase, PlaySession, SessionConfig, TickOutcome};
pub use crate::traits::render::{NullSpawnSink, RecordingSpawnSink, SpawnRecord, SpawnSink};
