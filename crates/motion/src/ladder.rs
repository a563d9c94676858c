//! Ladder geometry.
//!
//! A ladder is a vertical segment from `bottom` to `top` plus a `forward`
//! axis pointing from the climbing side into the wall (the direction a
//! climber faces). Progress along the segment is 0 at the bottom and 1 at
//! the top.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    pub id: u32,
    pub bottom: Vec3,
    pub top: Vec3,
    /// Direction a climber faces (into the wall).
    pub forward: Vec3,
    pub up: Vec3,
    /// Rung width (meters), widens the detection volume.
    pub width: f32,
}

impl Ladder {
    /// Create a ladder of `height` meters standing at `bottom`.
    pub fn new(id: u32, bottom: Vec3, height: f32, forward: Vec3) -> Self {
        Self {
            id,
            bottom,
            top: bottom + Vec3::Y * height,
            forward: math::project_on_plane(forward, Vec3::Y).normalize_or_zero(),
            up: Vec3::Y,
            width: 0.5,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn height(&self) -> f32 {
        self.bottom.distance(self.top)
    }

    /// Unit vector from bottom to top (the ladder's up when degenerate).
    pub fn climb_direction(&self) -> Vec3 {
        let axis = self.top - self.bottom;
        if axis.length_squared() < 1e-12 {
            self.up
        } else {
            axis.normalize()
        }
    }

    /// Closest point on the bottom-top segment to `position`.
    pub fn closest_point(&self, position: Vec3) -> Vec3 {
        let axis = self.top - self.bottom;
        let len_sq = axis.length_squared();
        if len_sq < 1e-12 {
            return self.bottom;
        }
        let t = ((position - self.bottom).dot(axis) / len_sq).clamp(0.0, 1.0);
        self.bottom + axis * t
    }

    /// Normalized progress of `position` along the ladder (0 when the ladder
    /// has no height).
    pub fn progress(&self, position: Vec3) -> f32 {
        let height = self.height();
        if height < 1e-6 {
            return 0.0;
        }
        self.bottom.distance(self.closest_point(position)) / height
    }

    pub fn is_at_top(&self, position: Vec3, threshold: f32) -> bool {
        self.progress(position) >= 1.0 - threshold
    }

    pub fn is_at_bottom(&self, position: Vec3, threshold: f32) -> bool {
        self.progress(position) <= threshold
    }

    /// Distance from `position` to the ladder segment.
    pub fn distance(&self, position: Vec3) -> f32 {
        position.distance(self.closest_point(position))
    }

    /// Yaw (radians) of a climber facing the ladder.
    pub fn facing_yaw(&self) -> f32 {
        math::yaw_of(self.forward)
    }
}

/// All ladders in a level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LadderSet {
    ladders: Vec<Ladder>,
}

impl LadderSet {
    pub fn new(ladders: Vec<Ladder>) -> Self {
        Self { ladders }
    }

    pub fn add(&mut self, ladder: Ladder) {
        self.ladders.push(ladder);
    }

    pub fn get(&self, id: u32) -> Option<&Ladder> {
        self.ladders.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ladder> {
        self.ladders.iter()
    }

    pub fn len(&self) -> usize {
        self.ladders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ladders.is_empty()
    }

    /// Ladders whose detection volume overlaps a sphere at `position`.
    pub fn overlapping(&self, position: Vec3, radius: f32) -> impl Iterator<Item = &Ladder> {
        self.ladders
            .iter()
            .filter(move |l| l.distance(position) <= radius + l.width * 0.5)
    }

    /// The overlapping ladder closest to `position`, by closest-point distance.
    pub fn nearest(&self, position: Vec3, radius: f32) -> Option<&Ladder> {
        self.overlapping(position, radius).min_by(|a, b| {
            a.distance(position)
                .partial_cmp(&b.distance(position))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}
