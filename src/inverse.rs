//! Inverse kinematics: a target position to joint angles.
//!
//! The solver applies the law of cosines to the triangle formed by the base,
//! the elbow and the target. Targets outside of the reachable annulus are not
//! an error: the arm saturates to the nearest boundary, either fully extended
//! or fully folded, and points at the target. [`InverseSolution::reach`]
//! reports when this happened.

use std::fmt::Display;

use crate::{forward, Angle, JointAngles, KinematicSolution, LinkLengths, Point};

/// Which of the two mirror-image solutions to return for a target.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum ElbowBranch {
    /// The solution where the elbow angle is positive.
    #[default]
    Up,
    /// The solution where the elbow angle is negative.
    Down,
}

impl ElbowBranch {
    /// Returns the other branch.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl Display for ElbowBranch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElbowBranch::Up => f.write_str("elbow up"),
            ElbowBranch::Down => f.write_str("elbow down"),
        }
    }
}

/// Where a target lies relative to the arm's reachable annulus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reach {
    /// The target can be reached exactly.
    Within,
    /// The target is further from the base than the fully extended arm.
    TooFar {
        /// The distance between the base and the target.
        distance: f64,
    },
    /// The target is closer to the base than the fully folded arm.
    TooClose {
        /// The distance between the base and the target.
        distance: f64,
    },
}

impl Reach {
    /// Returns true if the target can be reached exactly.
    #[must_use]
    pub const fn is_within(&self) -> bool {
        matches!(self, Self::Within)
    }
}

impl Display for Reach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reach::Within => f.write_str("within reach"),
            Reach::TooFar { distance } => {
                f.write_str("too far: target is ")?;
                Display::fmt(distance, f)?;
                f.write_str(" from the base")
            }
            Reach::TooClose { distance } => {
                f.write_str("too close: target is ")?;
                Display::fmt(distance, f)?;
                f.write_str(" from the base")
            }
        }
    }
}

/// The result of solving for a target position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseSolution {
    /// The joint angles that place the end effector at, or as close as
    /// possible to, the target.
    pub angles: JointAngles,
    /// Whether the target could be reached exactly.
    pub reach: Reach,
}

impl InverseSolution {
    /// Returns true if the end effector lands exactly on the target.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.reach.is_within()
    }

    /// Runs the angles back through forward kinematics, producing the pose the
    /// arm actually takes.
    #[must_use]
    pub fn pose(&self, lengths: LinkLengths) -> KinematicSolution {
        forward::solve(self.angles, lengths)
    }
}

/// The relative rounding error allowed when deciding whether a target lies on
/// the boundary of the reachable annulus.
const REACH_ROUNDING: f64 = 16. * f64::EPSILON;

/// Returns the elbow-up joint angles that place the end effector at `target`.
///
/// Unreachable targets saturate silently. Use [`solve_inverse_with`] to pick
/// the branch or to learn whether the target was reachable.
#[must_use]
pub fn solve_inverse(target: Point, lengths: LinkLengths) -> JointAngles {
    solve_inverse_with(target, lengths, ElbowBranch::Up).angles
}

/// Returns the joint angles on `branch` that place the end effector at
/// `target`.
///
/// A target at the base has no direction; it is treated as lying along the
/// positive x-axis.
#[must_use]
pub fn solve_inverse_with(
    target: Point,
    lengths: LinkLengths,
    branch: ElbowBranch,
) -> InverseSolution {
    let (scaled_target, first, second) = if (lengths.first() * lengths.second()).is_normal() {
        (target, lengths.first(), lengths.second())
    } else {
        // The product of the lengths underflows or overflows; solve in units
        // of the longer link instead.
        let unit = lengths.first().max(lengths.second());
        (target / unit, lengths.first() / unit, lengths.second() / unit)
    };
    let distance_squared = scaled_target.x * scaled_target.x + scaled_target.y * scaled_target.y;
    let sum_of_squares = first * first + second * second;
    let scale = 2. * first * second;
    let cos_theta2 = (distance_squared - sum_of_squares) / scale;

    // Targets on the boundary round to either side of it.
    let tolerance = REACH_ROUNDING * (distance_squared + sum_of_squares) / scale;
    let reach = if cos_theta2 > 1. + tolerance {
        Reach::TooFar {
            distance: target.magnitude(),
        }
    } else if cos_theta2 < -1. - tolerance {
        Reach::TooClose {
            distance: target.magnitude(),
        }
    } else {
        Reach::Within
    };
    if !reach.is_within() {
        log::debug!("saturating target {target}: {reach}");
    }

    let cos_theta2 = cos_theta2.clamp(-1., 1.);
    let (theta2, sin_theta2) = match branch {
        ElbowBranch::Up => (cos_theta2.acos(), (1. - cos_theta2 * cos_theta2).sqrt()),
        ElbowBranch::Down => (
            -cos_theta2.acos(),
            -(1. - cos_theta2 * cos_theta2).sqrt(),
        ),
    };

    let elbow_offset = (second * sin_theta2).atan2(first + second * cos_theta2);
    let theta1 = target.direction() - Angle::radians(elbow_offset);

    InverseSolution {
        angles: JointAngles::new(theta1, Angle::radians(theta2)),
        reach,
    }
}

#[cfg(test)]
fn lengths(first: f64, second: f64) -> LinkLengths {
    LinkLengths::new(first, second).expect("valid lengths")
}

#[cfg(test)]
fn assert_points_eq(a: Point, b: Point) {
    approx::assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
}

#[test]
fn right_angle_elbow() {
    let angles = solve_inverse(Point::new(4., 5.), lengths(4., 5.));
    approx::assert_abs_diff_eq!(angles.theta2.to_degrees(), 90., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(angles.theta1.to_degrees(), 0., epsilon = 1e-9);
}

#[test]
fn fully_extended_on_outer_boundary() {
    let lengths = lengths(4., 5.);
    let solution = solve_inverse_with(Point::new(9., 0.), lengths, ElbowBranch::Up);
    assert_eq!(solution.reach, Reach::Within);
    assert_eq!(solution.angles.theta2, Angle::ZERO);
    assert_eq!(solution.angles.theta1, Angle::ZERO);

    let target = Point::from_polar(9., Angle::degrees(-120.));
    let angles = solve_inverse(target, lengths);
    approx::assert_abs_diff_eq!(angles.theta2.to_radians(), 0., epsilon = 1e-6);
    approx::assert_abs_diff_eq!(angles.theta1.to_degrees(), -120., epsilon = 1e-4);
}

#[test]
fn fully_folded_on_inner_boundary() {
    let lengths = lengths(4., 5.);
    let solution = solve_inverse_with(Point::new(1., 0.), lengths, ElbowBranch::Up);
    assert_eq!(solution.reach, Reach::Within);
    assert_eq!(solution.angles.theta2, Angle::HALF_TURN);
    assert_points_eq(solution.pose(lengths).end_effector, Point::new(1., 0.));

    let down = solve_inverse_with(Point::new(1., 0.), lengths, ElbowBranch::Down);
    assert_eq!(down.angles.theta2, Angle::HALF_TURN);

    let off_axis = Point::new(0.6, 0.8);
    for branch in [ElbowBranch::Up, ElbowBranch::Down] {
        let solution = solve_inverse_with(off_axis, lengths, branch);
        assert_eq!(solution.reach, Reach::Within);
        approx::assert_abs_diff_eq!(
            solution.angles.theta2.to_degrees().abs(),
            180.,
            epsilon = 1e-5
        );
        assert_points_eq(solution.pose(lengths).end_effector, off_axis);
    }
}

#[test]
fn boundary_targets_in_every_direction() {
    for (first, second) in [(4., 5.), (5., 2.), (1., 8.), (0.3, 0.3)] {
        let lengths = lengths(first, second);
        for degrees in -180..180 {
            let direction = Angle::degrees(f64::from(degrees));

            let outer = Point::from_polar(lengths.max_reach(), direction);
            let solution = solve_inverse_with(outer, lengths, ElbowBranch::Up);
            assert_eq!(solution.reach, Reach::Within, "{outer} with {lengths:?}");
            assert!(solution.angles.theta2.to_radians().abs() < 1e-6);
            assert_points_eq(solution.pose(lengths).end_effector, outer);

            if first == second {
                continue;
            }
            let inner = Point::from_polar(lengths.min_reach(), direction);
            for branch in [ElbowBranch::Up, ElbowBranch::Down] {
                let solution = solve_inverse_with(inner, lengths, branch);
                assert_eq!(solution.reach, Reach::Within, "{inner} with {lengths:?}");
                approx::assert_abs_diff_eq!(
                    solution.angles.theta2.to_radians().abs(),
                    std::f64::consts::PI,
                    epsilon = 1e-6
                );
                assert_points_eq(solution.pose(lengths).end_effector, inner);
            }
        }
    }
}

#[test]
fn extreme_link_lengths() {
    let tiny = lengths(1e-200, 1e-200);
    let solution = solve_inverse_with(Point::ORIGIN, tiny, ElbowBranch::Up);
    assert_eq!(solution.reach, Reach::Within);
    assert_eq!(solution.angles.theta1, Angle::ZERO);
    assert_eq!(solution.angles.theta2, Angle::HALF_TURN);

    let tiny = lengths(1e-200, 2e-200);
    let solution = solve_inverse_with(Point::new(0., 3e-200), tiny, ElbowBranch::Up);
    assert_eq!(solution.reach, Reach::Within);
    approx::assert_abs_diff_eq!(solution.angles.theta1.to_degrees(), 90., epsilon = 1e-4);
    assert!(solution.angles.theta2.to_radians().abs() < 1e-6);
    let solution = solve_inverse_with(Point::new(0., 1e-199), tiny, ElbowBranch::Up);
    assert!(matches!(solution.reach, Reach::TooFar { .. }));

    let huge = lengths(1e200, 1e200);
    let solution = solve_inverse_with(Point::new(1e200, 1e200), huge, ElbowBranch::Down);
    assert_eq!(solution.reach, Reach::Within);
    approx::assert_abs_diff_eq!(solution.angles.theta2.to_degrees(), -90., epsilon = 1e-6);
    approx::assert_abs_diff_eq!(solution.angles.theta1.to_degrees(), 90., epsilon = 1e-6);
}

#[test]
fn too_far_points_straight_at_target() {
    let lengths = lengths(4., 5.);
    let target = Point::new(20., 20.);
    let solution = solve_inverse_with(target, lengths, ElbowBranch::Up);
    assert!(!solution.is_reachable());
    let Reach::TooFar { distance } = solution.reach else {
        unreachable!("expected TooFar, got {:?}", solution.reach)
    };
    approx::assert_abs_diff_eq!(distance, target.magnitude());

    assert_eq!(solution.angles.theta2, Angle::ZERO);
    approx::assert_abs_diff_eq!(solution.angles.theta1.to_degrees(), 45., epsilon = 1e-9);
    let boundary = target / target.magnitude() * lengths.max_reach();
    assert_points_eq(solution.pose(lengths).end_effector, boundary);
    assert!(solve_inverse(boundary, lengths).theta2.to_radians().abs() < 1e-6);
}

#[test]
fn too_close_folds_toward_target() {
    for (first, second) in [(5., 2.), (2., 5.)] {
        let lengths = lengths(first, second);
        let target = Point::new(1., 1.);
        let solution = solve_inverse_with(target, lengths, ElbowBranch::Up);
        assert!(matches!(solution.reach, Reach::TooClose { .. }));
        assert_eq!(solution.angles.theta2, Angle::HALF_TURN);
        let boundary = target / target.magnitude() * lengths.min_reach();
        assert_points_eq(solution.pose(lengths).end_effector, boundary);
    }
}

#[test]
fn target_at_base() {
    // Unequal links cannot reach the base; the arm folds along the x-axis.
    let lengths_4_5 = lengths(4., 5.);
    let solution = solve_inverse_with(Point::ORIGIN, lengths_4_5, ElbowBranch::Up);
    assert!(matches!(solution.reach, Reach::TooClose { distance } if distance == 0.));
    assert_eq!(solution.angles.theta1, Angle::HALF_TURN);
    assert_eq!(solution.angles.theta2, Angle::HALF_TURN);
    assert_points_eq(solution.pose(lengths_4_5).end_effector, Point::new(1., 0.));

    // Equal links fold exactly onto the base with the first link on the
    // x-axis.
    let equal = lengths(3., 3.);
    let solution = solve_inverse_with(Point::new(-0., 0.), equal, ElbowBranch::Up);
    assert_eq!(solution.reach, Reach::Within);
    assert_eq!(solution.angles.theta1, Angle::ZERO);
    assert_eq!(solution.angles.theta2, Angle::HALF_TURN);
    assert_points_eq(solution.pose(equal).elbow, Point::new(3., 0.));
}

#[test]
fn elbow_down_mirrors_elbow_up() {
    let lengths = lengths(4., 5.);
    let target = Point::new(4., 5.);
    let up = solve_inverse_with(target, lengths, ElbowBranch::Up);
    let down = solve_inverse_with(target, lengths, ElbowBranch::Down);
    approx::assert_abs_diff_eq!(
        down.angles.theta2.to_radians(),
        -up.angles.theta2.to_radians(),
        epsilon = 1e-12
    );

    let up_pose = up.pose(lengths);
    let down_pose = down.pose(lengths);
    assert_points_eq(up_pose.end_effector, target);
    assert_points_eq(down_pose.end_effector, target);
    // The two elbows are mirror images across the base-to-target line.
    let along = target / target.magnitude();
    let dot = |p: Point| p.x * along.x + p.y * along.y;
    let cross = |p: Point| along.x * p.y - along.y * p.x;
    approx::assert_abs_diff_eq!(dot(up_pose.elbow), dot(down_pose.elbow), epsilon = 1e-9);
    approx::assert_abs_diff_eq!(cross(up_pose.elbow), -cross(down_pose.elbow), epsilon = 1e-9);
    assert_eq!(ElbowBranch::Up.opposite(), ElbowBranch::Down);
}

#[test]
fn reach_display() {
    assert_eq!(Reach::Within.to_string(), "within reach");
    assert_eq!(
        format!("{:.1}", Reach::TooFar { distance: 12.5 }),
        "too far: target is 12.5 from the base"
    );
}

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn forward_then_inverse_reaches_the_same_point(
            theta1 in -std::f64::consts::PI..=std::f64::consts::PI,
            theta2 in -std::f64::consts::PI..=std::f64::consts::PI,
            first in 0.1..10.0f64,
            second in 0.1..10.0f64,
        ) {
            let lengths = lengths(first, second);
            let end = forward::solve_forward(Angle::radians(theta1), Angle::radians(theta2), lengths);
            for branch in [ElbowBranch::Up, ElbowBranch::Down] {
                let solution = solve_inverse_with(end, lengths, branch);
                let reached = solution.pose(lengths).end_effector;
                prop_assert!((reached.x - end.x).abs() < 1e-6, "{reached} != {end}");
                prop_assert!((reached.y - end.y).abs() < 1e-6, "{reached} != {end}");
            }
        }

        #[test]
        fn unreachable_targets_land_on_the_boundary(
            direction in -180.0..180.0f64,
            beyond in 0.001..100.0f64,
            first in 0.1..10.0f64,
            second in 0.1..10.0f64,
        ) {
            let lengths = lengths(first, second);
            let direction = Angle::degrees(direction);
            let target = Point::from_polar(lengths.max_reach() + beyond, direction);
            let solution = solve_inverse_with(target, lengths, ElbowBranch::Up);
            let is_too_far = matches!(solution.reach, Reach::TooFar { .. });
            prop_assert!(is_too_far);
            prop_assert_eq!(solution.angles.theta2, Angle::ZERO);
            let boundary = Point::from_polar(lengths.max_reach(), direction);
            let reached = solution.pose(lengths).end_effector;
            prop_assert!((reached.x - boundary.x).abs() < 1e-9);
            prop_assert!((reached.y - boundary.y).abs() < 1e-9);
        }
    }
}
