//! Keyframe animation clips and the mixer that plays them on a scene graph.

use cgmath::{InnerSpace, VectorSpace};

use crate::data_structures::scene_graph::{SceneNode, traverse_mut};

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<cgmath::Vector3<f32>>),
    Rotation(Vec<cgmath::Quaternion<f32>>),
    Scale(Vec<cgmath::Vector3<f32>>),
    // TODO: morph target weights need per-vertex blending in the mesh pipeline
    Other,
}

/// One animated property of one node.
#[derive(Clone, Debug)]
pub struct AnimationChannel {
    /// Source index of the animated node.
    pub target: usize,
    pub keyframes: Keyframes,
    pub timestamps: Vec<f32>,
}

/// A named animation: a set of channels sharing one timeline.
#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    pub channels: Vec<AnimationChannel>,
}

impl AnimationClip {
    /// Length of the clip in seconds (last keyframe over all channels).
    pub fn duration(&self) -> f32 {
        self.channels
            .iter()
            .filter_map(|channel| channel.timestamps.last().copied())
            .fold(0.0, f32::max)
    }
}

/// Locate `time` between two keyframes: returns the lower keyframe index and
/// the blend factor towards the next one. Times outside the track clamp to
/// the first/last keyframe.
fn keyframe_span(timestamps: &[f32], time: f32) -> Option<(usize, usize, f32)> {
    let last = timestamps.len().checked_sub(1)?;
    if time <= timestamps[0] {
        return Some((0, 0, 0.0));
    }
    if time >= timestamps[last] {
        return Some((last, last, 0.0));
    }
    let next = timestamps.partition_point(|&t| t <= time);
    let prev = next - 1;
    let span = timestamps[next] - timestamps[prev];
    let alpha = if span > 0.0 {
        (time - timestamps[prev]) / span
    } else {
        0.0
    };
    Some((prev, next, alpha))
}

impl AnimationChannel {
    fn apply(&self, node: &mut dyn SceneNode, time: f32) {
        let Some((prev, next, alpha)) = keyframe_span(&self.timestamps, time) else {
            return;
        };
        let mut transform = node.get_local_transform().clone();
        match &self.keyframes {
            Keyframes::Translation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    transform.position = a.lerp(*b, alpha);
                }
            }
            Keyframes::Rotation(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    // q and -q are the same rotation; take the shorter arc
                    let b = if a.dot(*b) < 0.0 { -*b } else { *b };
                    transform.rotation = a.slerp(b, alpha).normalize();
                }
            }
            Keyframes::Scale(values) => {
                if let (Some(a), Some(b)) = (values.get(prev), values.get(next)) {
                    transform.scale = a.lerp(*b, alpha);
                }
            }
            Keyframes::Other => return,
        }
        node.set_local_transform(transform);
    }
}

/// Plays every clip of an asset simultaneously, each looping over its own duration.
#[derive(Debug)]
pub struct AnimationMixer {
    clips: Vec<AnimationClip>,
    time: f32,
}

impl AnimationMixer {
    /// `None` when the asset has nothing to animate.
    pub fn new(clips: Vec<AnimationClip>) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }
        Some(Self { clips, time: 0.0 })
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Advance by `dt` seconds and write the sampled transforms into the scene.
    pub fn update(&mut self, root: &mut dyn SceneNode, dt: f32) {
        self.time += dt.max(0.0);
        let time = self.time;
        let clips = &self.clips;
        traverse_mut(root, &mut |node| {
            let Some(index) = node.source_index() else {
                return;
            };
            for clip in clips {
                let duration = clip.duration();
                let local = if duration > 0.0 { time % duration } else { 0.0 };
                clip.channels
                    .iter()
                    .filter(|channel| channel.target == index)
                    .for_each(|channel| channel.apply(node, local));
            }
        });
    }
}
