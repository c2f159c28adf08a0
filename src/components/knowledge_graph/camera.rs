//! Orbit camera and perspective projection for the scene.

use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Add, Mul, Sub};

const NEAR_PLANE: f64 = 1.0;
const MIN_DISTANCE: f64 = 40.0;
const MAX_DISTANCE: f64 = 20_000.0;
const FIT_PADDING: f64 = 1.15;
const MIN_FIT_RADIUS: f64 = 60.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vec3 {
	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn length(self) -> f64 {
		(self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
	}

	pub fn lerp(self, other: Vec3, t: f64) -> Vec3 {
		self + (other - self) * t
	}
}

impl Add for Vec3 {
	type Output = Vec3;
	fn add(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
	}
}

impl Sub for Vec3 {
	type Output = Vec3;
	fn sub(self, rhs: Vec3) -> Vec3 {
		Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
	}
}

impl Mul<f64> for Vec3 {
	type Output = Vec3;
	fn mul(self, k: f64) -> Vec3 {
		Vec3::new(self.x * k, self.y * k, self.z * k)
	}
}

/// A point mapped to screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Distance in front of the camera; larger is farther.
	pub depth: f64,
	/// Pixels per world unit at this depth.
	pub scale: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	pub target: Vec3,
	pub yaw: f64,
	pub pitch: f64,
	pub distance: f64,
	/// Vertical field of view in radians.
	pub fov: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			target: Vec3::default(),
			yaw: 0.6,
			pitch: 0.45,
			distance: 900.0,
			fov: PI / 3.0,
		}
	}
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

impl Camera {
	pub fn project(&self, point: Vec3, width: f64, height: f64) -> Option<Projected> {
		let d = point - self.target;
		let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
		let x1 = d.x * cos_yaw - d.z * sin_yaw;
		let z1 = d.x * sin_yaw + d.z * cos_yaw;
		let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
		let y2 = d.y * cos_pitch - z1 * sin_pitch;
		let z2 = d.y * sin_pitch + z1 * cos_pitch;

		let depth = self.distance - z2;
		if depth < NEAR_PLANE {
			return None;
		}
		let scale = self.focal_length(height) / depth;
		Some(Projected {
			x: width / 2.0 + x1 * scale,
			y: height / 2.0 - y2 * scale,
			depth,
			scale,
		})
	}

	fn focal_length(&self, height: f64) -> f64 {
		(height / 2.0) / (self.fov / 2.0).tan()
	}

	pub fn orbit(&mut self, d_yaw: f64, d_pitch: f64) {
		self.yaw = (self.yaw + d_yaw).rem_euclid(2.0 * PI);
		let limit = FRAC_PI_2 - 0.05;
		self.pitch = (self.pitch + d_pitch).clamp(-limit, limit);
	}

	pub fn zoom(&mut self, factor: f64) {
		self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
	}

	/// Camera with the same orientation that frames every point in a
	/// viewport of the given aspect ratio.
	pub fn framing(&self, points: &[Vec3], aspect: f64) -> Option<Camera> {
		let first = *points.first()?;
		let (min, max) = points.iter().fold((first, first), |(lo, hi), p| {
			(
				Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
				Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
			)
		});
		let center = min.lerp(max, 0.5);
		let radius = points
			.iter()
			.map(|p| (*p - center).length())
			.fold(MIN_FIT_RADIUS, f64::max);

		let half_vertical = self.fov / 2.0;
		let half_horizontal = (half_vertical.tan() * aspect.max(0.1)).atan();
		let half_angle = half_vertical.min(half_horizontal);
		let distance = (radius * FIT_PADDING / half_angle.sin()).clamp(MIN_DISTANCE, MAX_DISTANCE);

		Some(Camera {
			target: center,
			distance,
			..*self
		})
	}

	fn lerp(&self, other: &Camera, t: f64) -> Camera {
		Camera {
			target: self.target.lerp(other.target, t),
			yaw: self.yaw + (other.yaw - self.yaw) * t,
			pitch: self.pitch + (other.pitch - self.pitch) * t,
			distance: self.distance + (other.distance - self.distance) * t,
			fov: self.fov + (other.fov - self.fov) * t,
		}
	}
}

/// Eased transition between two camera poses.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraTween {
	from: Camera,
	to: Camera,
	elapsed: f64,
	duration: f64,
}

impl CameraTween {
	pub fn new(from: Camera, to: Camera, duration: f64) -> Self {
		Self {
			from,
			to,
			elapsed: 0.0,
			duration: duration.max(0.0),
		}
	}

	/// Advances by `dt` seconds; the flag is true once the tween has landed.
	pub fn advance(&mut self, dt: f64) -> (Camera, bool) {
		self.elapsed += dt;
		if self.duration <= 0.0 || self.elapsed >= self.duration {
			return (self.to, true);
		}
		let t = ease_out_cubic(self.elapsed / self.duration);
		(self.from.lerp(&self.to, t), false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn target_projects_to_viewport_center() {
		let camera = Camera {
			target: Vec3::new(10.0, -20.0, 300.0),
			..Camera::default()
		};
		let p = camera.project(camera.target, 800.0, 600.0).unwrap();
		assert!((p.x - 400.0).abs() < 1e-9);
		assert!((p.y - 300.0).abs() < 1e-9);
		assert!((p.depth - camera.distance).abs() < 1e-9);
	}

	#[test]
	fn nearer_points_appear_larger() {
		let camera = Camera {
			yaw: 0.0,
			pitch: 0.0,
			..Camera::default()
		};
		let near = camera.project(Vec3::new(0.0, 0.0, 100.0), 800.0, 600.0).unwrap();
		let far = camera.project(Vec3::new(0.0, 0.0, -100.0), 800.0, 600.0).unwrap();
		assert!(near.scale > far.scale);
		assert!(near.depth < far.depth);
	}

	#[test]
	fn points_behind_camera_are_culled() {
		let camera = Camera {
			yaw: 0.0,
			pitch: 0.0,
			distance: 100.0,
			..Camera::default()
		};
		assert!(camera.project(Vec3::new(0.0, 0.0, 500.0), 800.0, 600.0).is_none());
	}

	#[test]
	fn framing_keeps_all_points_on_screen() {
		let points = [
			Vec3::new(200.0, 0.0, 0.0),
			Vec3::new(-100.0, 173.0, 150.0),
			Vec3::new(-100.0, -173.0, 450.0),
			Vec3::new(0.0, 0.0, 600.0),
		];
		let (width, height) = (1200.0, 600.0);
		let camera = Camera::default().framing(&points, width / height).unwrap();
		for point in points {
			let p = camera.project(point, width, height).unwrap();
			assert!((0.0..=width).contains(&p.x), "{point:?} -> {p:?}");
			assert!((0.0..=height).contains(&p.y), "{point:?} -> {p:?}");
		}
	}

	#[test]
	fn framing_nothing_is_none() {
		assert!(Camera::default().framing(&[], 1.0).is_none());
	}

	#[test]
	fn tween_lands_on_target() {
		let from = Camera::default();
		let to = Camera {
			distance: 400.0,
			..from
		};
		let mut tween = CameraTween::new(from, to, 0.5);
		let (mid, done) = tween.advance(0.25);
		assert!(!done);
		assert!(mid.distance < from.distance && mid.distance > to.distance);
		let (end, done) = tween.advance(0.5);
		assert!(done);
		assert_eq!(end, to);
	}

	#[test]
	fn pitch_is_clamped() {
		let mut camera = Camera::default();
		camera.orbit(0.0, 10.0);
		assert!(camera.pitch < FRAC_PI_2);
		camera.zoom(1e-6);
		assert_eq!(camera.distance, MIN_DISTANCE);
	}
}
