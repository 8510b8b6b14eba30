// Arc-drive kinematics for the 4-wheel swerve chassis
// Converts a pointer target into per-wheel steering angles and normalized speeds.

use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::config::{CHASSIS_CENTER, CHASSIS_HALF_EXTENT, MIN_CENTER_DISTANCE, WHEEL_OFFSET};

/// A point (or vector) in diagram coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Point2D) -> f64 {
        (*self - other).length()
    }

    /// Unit vector in the same direction
    ///
    /// A zero-length or non-finite vector has no direction and yields `(0, 0)`.
    pub fn normalized(&self) -> Point2D {
        let length = self.length();
        if length == 0.0 || !length.is_finite() {
            return Point2D::default();
        }
        Point2D::new(self.x / length, self.y / length)
    }

    /// Bearing of the vector, in radians (atan2 range)
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point2D {
    type Output = Point2D;
    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

/// Wrap an angle into [-PI, PI)
pub fn normalized_angle(theta: f64) -> f64 {
    if (-PI..PI).contains(&theta) {
        return theta;
    }
    (theta + PI).rem_euclid(TAU) - PI
}

/// Shortest angular distance between two angles, in [0, PI]
pub fn angle_difference(alpha: f64, beta: f64) -> f64 {
    normalized_angle(alpha - beta).abs()
}

/// One wheel of the arc-drive solution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Wheel {
    /// Steering pivot, fixed by the chassis
    pub axle: Point2D,
    /// Orientation of the unrotated wheel
    pub neutral_angle: f64,
    /// Where the wheel touches the ground
    pub contact: Point2D,
    /// Orientation to draw/steer the wheel at
    pub steering_angle: f64,
    /// +1 when the wheel faces the target, -1 when it was flipped
    pub sign: f64,
    /// Signed speed; raw from `create_wheel`, in [-1, 1] after `Chassis::arc_drive`
    pub speed: f64,
}

/// Steer a single wheel toward `target`
///
/// When the target lies more than a quarter turn away from the wheel's neutral
/// direction the wheel is flipped: it points away from the target and the
/// contact point moves against the direction vector. Exactly a quarter turn
/// does not flip.
///
/// `speed` is left at zero; it needs the chassis center, see [`Chassis::arc_drive`].
pub fn create_wheel(
    axle: Point2D,
    neutral_angle: f64,
    target: Point2D,
    wheel_offset: f64,
) -> Wheel {
    let direction = (target - axle).normalized();
    let raw_angle = direction.angle();

    let (sign, steering_angle) = if angle_difference(raw_angle, neutral_angle) > FRAC_PI_2 {
        (-1.0, raw_angle + PI)
    } else {
        (1.0, raw_angle)
    };

    Wheel {
        axle,
        neutral_angle,
        contact: axle + direction * (sign * wheel_offset),
        steering_angle,
        sign,
        speed: 0.0,
    }
}

/// Fixed chassis geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chassis {
    pub center: Point2D,
    /// Half the distance between left and right axles (and front and rear)
    pub half_extent: f64,
    /// Distance from axle to wheel contact point
    pub wheel_offset: f64,
    /// Floor for the center-to-target distance used as speed divisor
    pub min_center_distance: f64,
}

impl Default for Chassis {
    fn default() -> Self {
        Self {
            center: CHASSIS_CENTER.into(),
            half_extent: CHASSIS_HALF_EXTENT,
            wheel_offset: WHEEL_OFFSET,
            min_center_distance: MIN_CENTER_DISTANCE,
        }
    }
}

impl Chassis {
    pub fn new(center: Point2D, half_extent: f64, wheel_offset: f64) -> Self {
        Self {
            center,
            half_extent,
            wheel_offset,
            ..Self::default()
        }
    }

    /// Axle positions and neutral angles: [front-left, front-right, rear-left, rear-right]
    ///
    /// Left wheels face PI, right wheels face 0.
    pub fn corners(&self) -> [(Point2D, f64); 4] {
        let Point2D { x: cx, y: cy } = self.center;
        let b = self.half_extent;
        [
            (Point2D::new(cx - b, cy - b), PI),
            (Point2D::new(cx + b, cy - b), 0.0),
            (Point2D::new(cx - b, cy + b), PI),
            (Point2D::new(cx + b, cy + b), 0.0),
        ]
    }

    /// Full arc-drive solution for a pointer target
    pub fn arc_drive(&self, target: Point2D) -> ArcDrive {
        let center_distance = self.center.distance(target).max(self.min_center_distance);

        let mut wheels = self.corners().map(|(axle, neutral_angle)| {
            let mut wheel = create_wheel(axle, neutral_angle, target, self.wheel_offset);
            let signed_distance = axle.distance(target) - self.wheel_offset;
            wheel.speed = wheel.sign * signed_distance / center_distance;
            wheel
        });

        // Fastest wheel defines full speed
        let max_abs = wheels.iter().map(|w| w.speed.abs()).fold(0.0f64, f64::max);
        for wheel in &mut wheels {
            wheel.speed = if max_abs > 0.0 && max_abs.is_finite() {
                wheel.speed / max_abs
            } else {
                0.0
            };
        }

        ArcDrive { target, wheels }
    }
}

/// Wheel set for one target, recomputed on every input change
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcDrive {
    pub target: Point2D,
    pub wheels: [Wheel; 4],
}

impl ArcDrive {
    /// Returns speeds as array [front-left, front-right, rear-left, rear-right]
    pub fn speeds(&self) -> [f64; 4] {
        self.wheels.map(|w| w.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn scenario() -> (Chassis, Point2D) {
        (
            Chassis::new(Point2D::new(500.0, 500.0), 61.0, 30.0),
            Point2D::new(110.0, 400.0),
        )
    }

    #[test]
    fn test_normalized_is_unit_length() {
        for (x, y) in [(3.0, 4.0), (-1.0, 0.0), (0.001, -250.0), (-390.0, -100.0)] {
            let n = Point2D::new(x, y).normalized();
            assert!((n.length() - 1.0).abs() < EPS, "({}, {}) -> {:?}", x, y, n);
        }
    }

    #[test]
    fn test_normalized_degenerate_is_zero() {
        assert_eq!(Point2D::new(0.0, 0.0).normalized(), Point2D::new(0.0, 0.0));
        assert_eq!(Point2D::new(f64::INFINITY, 1.0).normalized(), Point2D::default());
        assert_eq!(Point2D::new(f64::NAN, 1.0).normalized(), Point2D::default());
    }

    #[test]
    fn test_angle_difference_range_and_symmetry() {
        let angles = [-7.0, -PI, -2.0, -0.3, 0.0, 0.5, FRAC_PI_2, PI, 3.9, 12.0];
        for &a in &angles {
            for &b in &angles {
                let d = angle_difference(a, b);
                assert!((0.0..=PI).contains(&d), "diff({}, {}) = {}", a, b, d);
                assert!((d - angle_difference(b, a)).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_angle_difference_zero_for_equal_angles() {
        assert_eq!(angle_difference(1.25, 1.25), 0.0);
        assert!(angle_difference(0.0, TAU) < EPS);
        assert!(angle_difference(-PI, PI) < EPS);
    }

    #[test]
    fn test_wheel_facing_target_keeps_raw_angle() {
        // Neutral 0, target straight ahead along +x
        let axle = Point2D::new(100.0, 100.0);
        let wheel = create_wheel(axle, 0.0, Point2D::new(300.0, 100.0), 30.0);
        assert_eq!(wheel.sign, 1.0);
        assert!(wheel.steering_angle.abs() < EPS);
        assert!((wheel.contact.x - 130.0).abs() < EPS);
        assert!((wheel.contact.y - 100.0).abs() < EPS);
    }

    #[test]
    fn test_wheel_behind_target_flips() {
        // Neutral 0, target directly behind along -x
        let axle = Point2D::new(100.0, 100.0);
        let wheel = create_wheel(axle, 0.0, Point2D::new(-100.0, 100.0), 30.0);
        assert_eq!(wheel.sign, -1.0);
        assert!((wheel.steering_angle - (PI + PI)).abs() < EPS);
        // Contact moves against the direction to the target
        assert!((wheel.contact.x - 130.0).abs() < EPS);
    }

    #[test]
    fn test_quarter_turn_does_not_flip() {
        // Target straight "down" from a wheel facing 0: difference is exactly PI/2
        let axle = Point2D::new(0.0, 0.0);
        let wheel = create_wheel(axle, 0.0, Point2D::new(0.0, 50.0), 10.0);
        assert_eq!(angle_difference(FRAC_PI_2, 0.0), FRAC_PI_2);
        assert_eq!(wheel.sign, 1.0);
        assert_eq!(wheel.steering_angle, FRAC_PI_2);
    }

    #[test]
    fn test_target_on_axle_is_degenerate() {
        let axle = Point2D::new(10.0, 10.0);
        let wheel = create_wheel(axle, 0.0, axle, 30.0);
        assert_eq!(wheel.steering_angle, 0.0);
        assert_eq!(wheel.contact, axle);
    }

    #[test]
    fn test_scenario_contact_points_at_offset() {
        let (chassis, target) = scenario();
        let drive = chassis.arc_drive(target);
        for wheel in &drive.wheels {
            let d = wheel.axle.distance(wheel.contact);
            assert!((d - 30.0).abs() < EPS, "contact distance {}", d);
        }
    }

    #[test]
    fn test_scenario_steering_points_at_target() {
        let (chassis, target) = scenario();
        let drive = chassis.arc_drive(target);
        for wheel in &drive.wheels {
            let bearing = (target - wheel.axle).angle();
            let expected = if wheel.sign > 0.0 { bearing } else { bearing + PI };
            assert!((wheel.steering_angle - expected).abs() < EPS);
            // Flipped or not, the wheel's long axis lies on the line to the target
            let axis = angle_difference(wheel.steering_angle, bearing);
            assert!(axis < EPS || (axis - PI).abs() < EPS);
        }
        // Target is to the left: left wheels (neutral PI) face it, right wheels flip
        assert_eq!(drive.wheels.map(|w| w.sign), [1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_speeds_normalized_to_unit_max() {
        let chassis = Chassis::default();
        for target in [(110.0, 400.0), (900.0, 120.0), (505.0, 495.0), (500.0, 950.0)] {
            let drive = chassis.arc_drive(target.into());
            let max = drive.speeds().iter().map(|s| s.abs()).fold(0.0f64, f64::max);
            assert!((max - 1.0).abs() < EPS, "target {:?}: max {}", target, max);
            assert!(drive.speeds().iter().all(|s| (-1.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn test_target_at_center_is_finite() {
        let chassis = Chassis::default();
        let drive = chassis.arc_drive(chassis.center);
        assert!(drive.speeds().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_unnormalizable_speeds_are_zero() {
        // Every axle sits on the target, so every raw speed is zero
        let chassis = Chassis::new(Point2D::new(0.0, 0.0), 0.0, 0.0);
        let drive = chassis.arc_drive(Point2D::new(0.0, 0.0));
        assert_eq!(drive.speeds(), [0.0; 4]);
    }

    #[test]
    fn test_speed_continuous_across_flip() {
        // Moving the target across the vertical line through the right axles flips them
        let chassis = Chassis::default();
        let axle_x = chassis.center.x + chassis.half_extent;
        let before = chassis.arc_drive(Point2D::new(axle_x - 1e-6, 100.0));
        let after = chassis.arc_drive(Point2D::new(axle_x + 1e-6, 100.0));
        assert_ne!(before.wheels[1].sign, after.wheels[1].sign);
        // Flipped wheels run backwards, so the visible velocity direction is preserved
        let velocity =
            |w: &Wheel| Point2D::new(w.steering_angle.cos(), w.steering_angle.sin()) * w.speed;
        let (vb, va) = (velocity(&before.wheels[1]), velocity(&after.wheels[1]));
        assert!(vb.distance(va) < 1e-6, "{:?} vs {:?}", vb, va);
    }
}
