//! Clipping of rotated geometry to the visible cap of the sphere.
//!
//! All inputs are unit vectors in the view frame (see
//! [`OrthographicProjection::rotate`](super::OrthographicProjection::rotate)).
//! A point is visible when its `x` component exceeds the cosine of the clip
//! angle. Lines are cut where they cross the clip circle; polygon rings are
//! cut the same way and then closed again by walking along the clip circle.

use std::f64::consts::{PI, TAU};

use glam::DVec3;

/// Longest great-circle step kept without subdivision (radians).
const MAX_SEGMENT_ANGLE: f64 = 0.05;

/// Angular step used when following the clip circle (radians).
const RIM_STEP: f64 = 0.05;

/// Bisection iterations when locating a crossing of the clip circle.
const CROSSING_ITERATIONS: usize = 48;

/// The visible cap: points with `x > cos_radius`.
#[derive(Debug, Clone, Copy)]
pub struct ClipCircle {
    cos_radius: f64,
    sin_radius: f64,
}

/// A visible stretch of a ring, from where it enters the cap to where it
/// leaves it.
#[derive(Debug, Clone)]
pub struct Run {
    pub points: Vec<DVec3>,
    pub entry_angle: f64,
    pub exit_angle: f64,
}

/// Result of clipping one polygon ring.
#[derive(Debug, Clone)]
pub enum RingClip {
    /// The whole ring is visible.
    Inside(Vec<DVec3>),
    /// No part of the ring is visible.
    Outside,
    /// The ring crosses the clip circle.
    Crossing(Vec<Run>),
}

/// Which side of a ring, walking along it as seen from outside the sphere,
/// is the region it bounds.
///
/// Exterior rings wind clockwise and enclose the right-hand side; holes wind
/// the other way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interior {
    Right,
    Left,
}

impl Interior {
    pub fn of_ring(hole: bool) -> Self {
        if hole {
            Interior::Left
        } else {
            Interior::Right
        }
    }

    /// Sign of the rim walk (in rim angle) from an exit to the next entry.
    fn rim_direction(self) -> f64 {
        match self {
            Interior::Right => -1.0,
            Interior::Left => 1.0,
        }
    }
}

impl ClipCircle {
    pub fn new(cos_radius: f64, sin_radius: f64) -> Self {
        Self {
            cos_radius,
            sin_radius,
        }
    }

    pub fn is_visible(&self, v: DVec3) -> bool {
        v.x > self.cos_radius
    }

    /// Point on the clip circle at `angle`, measured in the view plane from
    /// the right-hand side, counter-clockwise.
    pub fn rim_point(&self, angle: f64) -> DVec3 {
        let (sin, cos) = angle.sin_cos();
        DVec3::new(self.cos_radius, self.sin_radius * cos, self.sin_radius * sin)
    }

    /// Splits an open line into its visible pieces.
    pub fn clip_line(&self, line: &[DVec3]) -> Vec<Vec<DVec3>> {
        let points = resample(line, false);
        let mut pieces = Vec::new();
        let mut current: Vec<DVec3> = Vec::new();
        let mut prev: Option<(DVec3, bool)> = None;

        for p in points {
            let visible = self.is_visible(p);
            match prev {
                None => {
                    if visible {
                        current.push(p);
                    }
                }
                Some((q, was_visible)) => match (was_visible, visible) {
                    (true, true) => current.push(p),
                    (false, true) => {
                        current.push(self.crossing(p, q));
                        current.push(p);
                    }
                    (true, false) => {
                        current.push(self.crossing(q, p));
                        pieces.push(std::mem::take(&mut current));
                    }
                    (false, false) => {}
                },
            }
            prev = Some((p, visible));
        }

        if current.len() >= 2 {
            pieces.push(current);
        }
        pieces.retain(|piece| piece.len() >= 2);
        pieces
    }

    /// Clips a closed ring. The ring may or may not repeat its first point.
    pub fn clip_ring(&self, ring: &[DVec3]) -> RingClip {
        let mut points = resample(ring, true);
        if points.len() < 3 {
            return RingClip::Outside;
        }

        let visibility: Vec<bool> = points.iter().map(|&p| self.is_visible(p)).collect();
        let Some(start) = visibility.iter().position(|v| !v) else {
            return RingClip::Inside(points);
        };
        if !visibility.iter().any(|&v| v) {
            return RingClip::Outside;
        }

        // Start on a hidden point so that every run has an entry and an exit.
        points.rotate_left(start);
        let n = points.len();
        let mut runs = Vec::new();
        let mut current: Option<Vec<DVec3>> = None;
        let mut entry_angle = 0.0;

        for k in 1..=n {
            let prev = points[k - 1];
            let p = points[k % n];
            let visible = self.is_visible(p);
            match (current.as_mut(), visible) {
                (None, true) => {
                    let entry = self.crossing(p, prev);
                    entry_angle = rim_angle(entry);
                    current = Some(vec![entry, p]);
                }
                (Some(run), true) => run.push(p),
                (Some(run), false) => {
                    let exit = self.crossing(prev, p);
                    run.push(exit);
                    runs.push(Run {
                        points: std::mem::take(run),
                        entry_angle,
                        exit_angle: rim_angle(exit),
                    });
                    current = None;
                }
                (None, false) => {}
            }
        }

        if runs.is_empty() {
            RingClip::Outside
        } else {
            RingClip::Crossing(runs)
        }
    }

    /// Closes the visible runs of a ring into polygons by following the clip
    /// circle from each exit to the next entry.
    ///
    /// The walking direction comes from the ring's winding: leaving the cap,
    /// the enclosed side of the ring is the side the rim is followed towards.
    pub fn stitch(&self, runs: &[Run], interior: Interior) -> Vec<Vec<DVec3>> {
        let direction = interior.rim_direction();
        let mut used = vec![false; runs.len()];
        let mut polygons = Vec::new();

        for start in 0..runs.len() {
            if used[start] {
                continue;
            }
            let mut polygon = Vec::new();
            let mut i = start;
            loop {
                used[i] = true;
                polygon.extend_from_slice(&runs[i].points);

                let exit = runs[i].exit_angle;
                let next = next_entry(runs, exit, direction);
                let target = runs[next].entry_angle;
                self.append_arc(&mut polygon, exit, target, direction);

                if next == start || used[next] {
                    break;
                }
                i = next;
            }
            polygons.push(polygon);
        }
        polygons
    }

    /// Whether a ring with no visible point still covers the view centre.
    ///
    /// Such a ring winds once around the view axis; its region holds the
    /// centre when that winding puts the centre on its enclosed side.
    pub fn encloses_centre(&self, ring: &[DVec3], interior: Interior) -> bool {
        let points = resample(ring, true);
        if points.len() < 3 {
            return false;
        }

        let mut turn = 0.0;
        for (i, &p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            turn += wrap_angle(rim_angle(q) - rim_angle(p));
        }
        match interior {
            Interior::Right => turn < -PI,
            Interior::Left => turn > PI,
        }
    }

    /// The whole clip circle, counter-clockwise.
    pub fn rim(&self) -> Vec<DVec3> {
        let steps = (TAU / RIM_STEP).ceil() as usize;
        (0..steps)
            .map(|i| self.rim_point(TAU * i as f64 / steps as f64))
            .collect()
    }

    /// Appends rim points strictly between `from` and `to`.
    fn append_arc(&self, out: &mut Vec<DVec3>, from: f64, to: f64, direction: f64) {
        let sweep = (direction * (to - from)).rem_euclid(TAU);
        let steps = (sweep / RIM_STEP).ceil() as usize;
        for i in 1..steps {
            let angle = from + direction * sweep * (i as f64) / (steps as f64);
            out.push(self.rim_point(angle));
        }
    }

    /// Point where the arc from `inside` to `outside` crosses the clip circle.
    fn crossing(&self, inside: DVec3, outside: DVec3) -> DVec3 {
        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..CROSSING_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.is_visible(slerp_approx(inside, outside, mid)) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let p = slerp_approx(inside, outside, lo);
        // Snap onto the circle so stitched arcs meet the runs exactly.
        self.rim_point(rim_angle(p))
    }
}

/// Angle of a point around the view centre, in the view plane.
pub fn rim_angle(v: DVec3) -> f64 {
    v.z.atan2(v.y)
}

/// Wraps an angle difference into `(-PI, PI]`.
fn wrap_angle(delta: f64) -> f64 {
    let wrapped = (delta + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

/// Index of the run whose entry comes first after `exit` when walking the
/// clip circle in `direction`.
fn next_entry(runs: &[Run], exit: f64, direction: f64) -> usize {
    let mut best = 0;
    let mut best_delta = f64::INFINITY;
    for (k, run) in runs.iter().enumerate() {
        let delta = (direction * (run.entry_angle - exit)).rem_euclid(TAU);
        if delta < best_delta {
            best_delta = delta;
            best = k;
        }
    }
    best
}

/// Normalised linear interpolation: a point on the great circle through
/// `a` and `b`.
fn slerp_approx(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    a.lerp(b, t).normalize_or_zero()
}

/// Subdivides long segments so that each step is at most
/// [`MAX_SEGMENT_ANGLE`] along the great circle. When `closed` is set the
/// closing segment is subdivided too and the closing duplicate is dropped.
pub fn resample(points: &[DVec3], closed: bool) -> Vec<DVec3> {
    let mut input: Vec<DVec3> = points.to_vec();
    if closed && input.len() >= 2 && input[0].abs_diff_eq(input[input.len() - 1], 1e-12) {
        input.pop();
    }
    let Some(&first) = input.first() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(input.len());
    out.push(first);
    let segment_count = if closed { input.len() } else { input.len() - 1 };
    for i in 0..segment_count {
        let a = input[i];
        let b = input[(i + 1) % input.len()];
        let angle = a.angle_between(b);
        if angle.is_finite() && angle > MAX_SEGMENT_ANGLE {
            let steps = (angle / MAX_SEGMENT_ANGLE).ceil() as usize;
            for s in 1..steps {
                let p = slerp_approx(a, b, s as f64 / steps as f64);
                if p != DVec3::ZERO {
                    out.push(p);
                }
            }
        }
        if !(closed && i + 1 == input.len()) {
            out.push(b);
        }
    }
    out
}
