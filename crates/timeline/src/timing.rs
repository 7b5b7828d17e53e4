//! Scene timing resolution.
//!
//! Maps probed media durations onto the declarative scene list:
//! each scene starts where the previous one ended, and the total is the
//! running sum. Offsets are derived, never user-supplied.

use std::collections::HashMap;

use scenecast_common::{ScenecastError, ScenecastResult};
use scenecast_scene_model::VideoConfig;
use serde::{Deserialize, Serialize};

/// Probed durations keyed by media source reference.
///
/// One entry per distinct source; scenes referencing the same source
/// share the entry.
#[derive(Debug, Clone, Default)]
pub struct SourceDurations {
    durations: HashMap<String, f64>,
}

impl SourceDurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a probed duration for a source.
    pub fn insert(&mut self, src: impl Into<String>, duration_secs: f64) {
        self.durations.insert(src.into(), duration_secs);
    }

    /// The probed duration for a source, if known.
    pub fn get(&self, src: &str) -> Option<f64> {
        self.durations.get(src).copied()
    }

    /// Number of distinct sources recorded.
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

impl FromIterator<(String, f64)> for SourceDurations {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            durations: iter.into_iter().collect(),
        }
    }
}

/// Resolved timing for a single scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTiming {
    /// Scene identifier from the config.
    pub scene_id: String,

    /// Global start offset in seconds.
    pub start_secs: f64,

    /// Global end offset in seconds (start + duration).
    pub end_secs: f64,

    /// Scene duration in seconds.
    pub duration_secs: f64,
}

/// The fully resolved timeline: per-scene windows plus the total.
///
/// Invariant: scenes are in declaration order, offsets are monotonically
/// non-decreasing, and windows neither gap nor overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTiming {
    scenes: Vec<SceneTiming>,
    total_secs: f64,
}

impl ResolvedTiming {
    /// Scene windows in declaration order.
    pub fn scenes(&self) -> &[SceneTiming] {
        &self.scenes
    }

    /// Total timeline duration (sum of scene durations).
    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    /// Look up a scene's window by id.
    pub fn get(&self, scene_id: &str) -> Option<&SceneTiming> {
        self.scenes.iter().find(|s| s.scene_id == scene_id)
    }
}

/// Resolve scene offsets and the total duration.
///
/// A scene's duration is the sum of its audio element durations in
/// declaration order (concatenation), unless the scene declares an
/// explicit `duration` override. A scene with neither audio nor an
/// override cannot be timed.
pub fn resolve_timing(
    config: &VideoConfig,
    durations: &SourceDurations,
) -> ScenecastResult<ResolvedTiming> {
    let mut scenes = Vec::with_capacity(config.scenes.len());
    let mut cursor = 0.0f64;

    for scene in &config.scenes {
        let duration = match scene.duration {
            Some(explicit) => explicit,
            None => {
                let mut sum = 0.0f64;
                let mut audio_count = 0usize;
                for audio in scene.audio_elements() {
                    let d = durations.get(&audio.src).ok_or_else(|| {
                        ScenecastError::probe(format!(
                            "no probed duration for audio source {}",
                            audio.src
                        ))
                    })?;
                    sum += d;
                    audio_count += 1;
                }
                if audio_count == 0 {
                    return Err(ScenecastError::AmbiguousDuration {
                        scene_id: scene.id.clone(),
                    });
                }
                sum
            }
        };

        scenes.push(SceneTiming {
            scene_id: scene.id.clone(),
            start_secs: cursor,
            end_secs: cursor + duration,
            duration_secs: duration,
        });
        cursor += duration;
    }

    tracing::debug!(
        scenes = scenes.len(),
        total_secs = cursor,
        "Resolved scene timing"
    );

    Ok(ResolvedTiming {
        scenes,
        total_secs: cursor,
    })
}
