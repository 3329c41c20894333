use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One boolean level published by a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    LeftHandUp,
    RightHandUp,
    LeftHandDown,
    RightHandDown,
    Clapped,
    CrossArm,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::LeftHandUp,
        Signal::RightHandUp,
        Signal::LeftHandDown,
        Signal::RightHandDown,
        Signal::Clapped,
        Signal::CrossArm,
    ];

    /// Key name used in logs and the detection contract.
    pub fn key(self) -> &'static str {
        match self {
            Signal::LeftHandUp => "left_hand_up",
            Signal::RightHandUp => "right_hand_up",
            Signal::LeftHandDown => "left_hand_down",
            Signal::RightHandDown => "right_hand_down",
            Signal::Clapped => "clapped",
            Signal::CrossArm => "cross_arm",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Levels owned by the pose sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoseLevels {
    pub left_hand_up: bool,
    pub right_hand_up: bool,
    pub left_hand_down: bool,
    pub right_hand_down: bool,
    pub cross_arm: bool,
}

/// Typed view of the shared detection state.
///
/// `version` increases on every write so readers can tell whether anything
/// changed since their last look.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionSnapshot {
    pub pose: PoseLevels,
    pub clapped: bool,
    pub ended: bool,
    /// At least one sensor has published data.
    pub sensors_live: bool,
    pub version: u64,
}

impl DetectionSnapshot {
    pub fn level(&self, signal: Signal) -> bool {
        match signal {
            Signal::LeftHandUp => self.pose.left_hand_up,
            Signal::RightHandUp => self.pose.right_hand_up,
            Signal::LeftHandDown => self.pose.left_hand_down,
            Signal::RightHandDown => self.pose.right_hand_down,
            Signal::Clapped => self.clapped,
            Signal::CrossArm => self.pose.cross_arm,
        }
    }
}

type Shared = Arc<Mutex<DetectionSnapshot>>;

fn lock(shared: &Shared) -> MutexGuard<'_, DetectionSnapshot> {
    // The snapshot is plain data, a panicking writer cannot leave it torn.
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn mark_live(shared: &Shared) {
    let mut state = lock(shared);
    if !state.sensors_live {
        state.sensors_live = true;
        state.version += 1;
    }
}

fn request_end(shared: &Shared) {
    let mut state = lock(shared);
    if !state.ended {
        state.ended = true;
        state.version += 1;
    }
}

/// Create the shared detection state.
///
/// Each writer handle can only touch its own key group and is not `Clone`,
/// so there is exactly one pose writer and one clap writer. Readers can be
/// cloned freely.
pub fn detection_channel() -> (DetectionReader, PoseWriter, ClapWriter) {
    let shared: Shared = Arc::new(Mutex::new(DetectionSnapshot::default()));
    (
        DetectionReader {
            shared: shared.clone(),
        },
        PoseWriter {
            shared: shared.clone(),
        },
        ClapWriter { shared },
    )
}

#[derive(Debug, Clone)]
pub struct DetectionReader {
    shared: Shared,
}

impl DetectionReader {
    pub fn snapshot(&self) -> DetectionSnapshot {
        *lock(&self.shared)
    }

    pub fn is_ended(&self) -> bool {
        lock(&self.shared).ended
    }

    /// Ask both sensors to stop (quit request).
    pub fn request_end(&self) {
        request_end(&self.shared);
    }
}

#[derive(Debug)]
pub struct PoseWriter {
    shared: Shared,
}

impl PoseWriter {
    /// Flag the sensor as producing data without changing any level.
    pub fn mark_live(&self) {
        mark_live(&self.shared);
    }

    /// Drop every pose level (sensor shutting down).
    pub fn clear(&self) {
        let mut state = lock(&self.shared);
        state.pose = PoseLevels::default();
        state.version += 1;
    }

    pub fn publish(&self, levels: PoseLevels) {
        let mut state = lock(&self.shared);
        state.pose = levels;
        state.sensors_live = true;
        state.version += 1;
    }

    pub fn is_ended(&self) -> bool {
        lock(&self.shared).ended
    }

    pub fn request_end(&self) {
        request_end(&self.shared);
    }
}

#[derive(Debug)]
pub struct ClapWriter {
    shared: Shared,
}

impl ClapWriter {
    /// Flag the sensor as producing data without changing any level.
    pub fn mark_live(&self) {
        mark_live(&self.shared);
    }

    pub fn clear(&self) {
        let mut state = lock(&self.shared);
        state.clapped = false;
        state.version += 1;
    }

    pub fn publish(&self, clapped: bool) {
        let mut state = lock(&self.shared);
        state.clapped = clapped;
        state.sensors_live = true;
        state.version += 1;
    }

    pub fn is_ended(&self) -> bool {
        lock(&self.shared).ended
    }

    pub fn request_end(&self) {
        request_end(&self.shared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writers_touch_only_their_keys() {
        let (reader, pose, clap) = detection_channel();
        clap.publish(true);
        pose.publish(PoseLevels {
            left_hand_up: true,
            ..Default::default()
        });
        let snap = reader.snapshot();
        assert!(snap.clapped);
        assert!(snap.pose.left_hand_up);
        assert!(snap.sensors_live);
        assert_eq!(snap.version, 2);

        pose.publish(PoseLevels::default());
        assert!(reader.snapshot().clapped);
    }

    #[test]
    fn mark_live_keeps_levels() {
        let (reader, _pose, clap) = detection_channel();
        clap.mark_live();
        clap.mark_live();
        let snap = reader.snapshot();
        assert!(snap.sensors_live);
        assert!(!snap.clapped);
        assert_eq!(snap.version, 1);
    }

    #[test]
    fn end_is_visible_to_everyone() {
        let (reader, pose, clap) = detection_channel();
        assert!(!pose.is_ended());
        reader.request_end();
        assert!(pose.is_ended());
        assert!(clap.is_ended());
        let version = reader.snapshot().version;
        clap.request_end();
        assert_eq!(reader.snapshot().version, version);
    }

    #[test]
    fn snapshot_levels_by_signal() {
        let snap = DetectionSnapshot {
            pose: PoseLevels {
                right_hand_down: true,
                cross_arm: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let raised: Vec<_> = Signal::ALL.into_iter().filter(|s| snap.level(*s)).collect();
        assert_eq!(raised, vec![Signal::RightHandDown, Signal::CrossArm]);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let (reader, pose, _clap) = detection_channel();
        let shared = reader.shared.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().unwrap();
            panic!("writer crashed");
        })
        .join();
        pose.publish(PoseLevels {
            cross_arm: true,
            ..Default::default()
        });
        assert!(reader.snapshot().pose.cross_arm);
    }
}
