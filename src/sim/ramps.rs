//! Ramp geometry: four straight chutes feeding the dragon
//!
//! Left ramps run left-to-right from the left edge, right ramps are mirrored.
//! Layout is a pure function of the viewport, so it is rebuilt wholesale
//! whenever the display mode changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::WORLD_HEIGHT;
use crate::tuning::RampTuning;

/// One of the four fixed lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    #[default]
    LeftTop,
    LeftBottom,
    RightTop,
    RightBottom,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::LeftTop, Lane::LeftBottom, Lane::RightTop, Lane::RightBottom];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Lane::LeftTop => 0,
            Lane::LeftBottom => 1,
            Lane::RightTop => 2,
            Lane::RightBottom => 3,
        }
    }

    #[inline]
    pub fn is_left(self) -> bool {
        matches!(self, Lane::LeftTop | Lane::LeftBottom)
    }
}

/// A straight ramp segment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ramp {
    pub lane: Lane,
    pub start: Vec2,
    pub end: Vec2,
}

impl Ramp {
    /// Linear interpolation along the ramp, `t` clamped to [0, 1]
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }

    /// Unit direction of travel (constant for a straight ramp)
    #[inline]
    pub fn tangent(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit normal pointing up off the ramp surface
    pub fn surface_normal(&self) -> Vec2 {
        let t = self.tangent();
        if self.lane.is_left() {
            Vec2::new(t.y, -t.x)
        } else {
            Vec2::new(-t.y, t.x)
        }
    }
}

/// The full ramp layout for one viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampGeometry {
    ramps: [Ramp; 4],
    catch_points: [Vec2; 4],
    viewport: Vec2,
    floor_y: f32,
    surface_offset: f32,
}

impl RampGeometry {
    /// Build the layout for a viewport
    pub fn configure(viewport_width: f32, viewport_height: f32, tuning: &RampTuning) -> Self {
        let w = viewport_width;
        let h = viewport_height;
        // Authored against the logical world height; keep it vertically centered
        let dy = (h - WORLD_HEIGHT) / 2.0;

        let left_start = 0.0;
        let left_end = tuning.ramp_width;
        let left_catch = left_end + tuning.gap_to_catch;
        let right_start = w;
        let right_end = w - tuning.ramp_width;
        let right_catch = right_end - tuning.gap_to_catch;

        let top = (tuning.top_y_start + dy, tuning.top_y_end + dy);
        let bottom = (tuning.bottom_y_start + dy, tuning.bottom_y_end + dy);

        let ramp = |lane: Lane, x: (f32, f32), y: (f32, f32)| Ramp {
            lane,
            start: Vec2::new(x.0, y.0),
            end: Vec2::new(x.1, y.1),
        };

        let ramps = [
            ramp(Lane::LeftTop, (left_start, left_end), top),
            ramp(Lane::LeftBottom, (left_start, left_end), bottom),
            ramp(Lane::RightTop, (right_start, right_end), top),
            ramp(Lane::RightBottom, (right_start, right_end), bottom),
        ];

        let catch_points = [
            Vec2::new(left_catch, top.1 + tuning.catch_drop),
            Vec2::new(left_catch, bottom.1 + tuning.catch_drop),
            Vec2::new(right_catch, top.1 + tuning.catch_drop),
            Vec2::new(right_catch, bottom.1 + tuning.catch_drop),
        ];

        Self {
            ramps,
            catch_points,
            viewport: Vec2::new(w, h),
            floor_y: h - tuning.floor_inset,
            surface_offset: tuning.surface_offset,
        }
    }

    #[inline]
    pub fn ramp(&self, lane: Lane) -> &Ramp {
        &self.ramps[lane.index()]
    }

    pub fn ramps(&self) -> &[Ramp; 4] {
        &self.ramps
    }

    #[inline]
    pub fn point_at(&self, lane: Lane, t: f32) -> Vec2 {
        self.ramp(lane).point_at(t)
    }

    #[inline]
    pub fn tangent(&self, lane: Lane) -> Vec2 {
        self.ramp(lane).tangent()
    }

    /// Where an egg riding the ramp is drawn: on the surface, not the centerline
    pub fn surface_point(&self, lane: Lane, t: f32) -> Vec2 {
        let ramp = self.ramp(lane);
        ramp.point_at(t) + ramp.surface_normal() * self.surface_offset
    }

    #[inline]
    pub fn catch_position(&self, lane: Lane) -> Vec2 {
        self.catch_points[lane.index()]
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.floor_y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.viewport.x / 2.0
    }
}
