//! Forward kinematics: joint angles to Cartesian positions.

use crate::{Angle, JointAngles, KinematicSolution, LinkLengths, Point};

/// Returns the location of the elbow when the first joint is rotated to
/// `theta1` and the first link is `first_length` long.
#[must_use]
pub fn elbow_position(theta1: Angle, first_length: f64) -> Point {
    Point::from_polar(first_length, theta1)
}

/// Returns the location of the end effector for the given joint angles.
///
/// `theta2` is relative to the first link, so the second link points in the
/// direction `theta1 + theta2`.
#[must_use]
pub fn solve_forward(theta1: Angle, theta2: Angle, lengths: LinkLengths) -> Point {
    elbow_position(theta1, lengths.first()) + Point::from_polar(lengths.second(), theta1 + theta2)
}

/// Solves the elbow and end effector positions for `joint_angles`.
#[must_use]
pub fn solve(joint_angles: JointAngles, lengths: LinkLengths) -> KinematicSolution {
    KinematicSolution {
        joint_angles,
        elbow: elbow_position(joint_angles.theta1, lengths.first()),
        end_effector: solve_forward(joint_angles.theta1, joint_angles.theta2, lengths),
    }
}

#[cfg(test)]
fn lengths(first: f64, second: f64) -> LinkLengths {
    LinkLengths::new(first, second).expect("valid lengths")
}

#[test]
fn forty_five_degrees() {
    let end = solve_forward(Angle::degrees(45.), Angle::degrees(45.), lengths(4., 5.));
    approx::assert_abs_diff_eq!(end.x, 2.828_427, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(end.y, 7.828_427, epsilon = 1e-6);
}

#[test]
fn straight_along_axes() {
    let lengths = lengths(2., 3.);
    let end = solve_forward(Angle::ZERO, Angle::ZERO, lengths);
    approx::assert_abs_diff_eq!(end.x, 5., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(end.y, 0., epsilon = 1e-12);

    let end = solve_forward(Angle::degrees(90.), Angle::degrees(-90.), lengths);
    approx::assert_abs_diff_eq!(end.x, 3., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(end.y, 2., epsilon = 1e-12);

    // Folded back onto itself.
    let end = solve_forward(Angle::ZERO, Angle::HALF_TURN, lengths);
    approx::assert_abs_diff_eq!(end.x, -1., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(end.y, 0., epsilon = 1e-12);
}

#[test]
fn elbow_follows_first_joint() {
    let solution = solve(JointAngles::degrees(30., 120.), lengths(4., 5.));
    approx::assert_abs_diff_eq!(solution.elbow.magnitude(), 4., epsilon = 1e-12);
    approx::assert_abs_diff_eq!(
        solution.elbow.direction().to_degrees(),
        30.,
        epsilon = 1e-9
    );
    approx::assert_abs_diff_eq!(
        (solution.end_effector - solution.elbow).magnitude(),
        5.,
        epsilon = 1e-12
    );
    approx::assert_abs_diff_eq!(
        (solution.end_effector - solution.elbow)
            .direction()
            .to_degrees(),
        150.,
        epsilon = 1e-9
    );
}

#[test]
fn mirrored_angles_reflect_across_x_axis() {
    let lengths = lengths(3.5, 1.25);
    for (theta1, theta2) in [(10., 20.), (-135., 60.), (170., -170.), (90., 180.)] {
        let angles = JointAngles::degrees(theta1, theta2);
        let mirrored = -angles;
        let end = solve_forward(angles.theta1, angles.theta2, lengths);
        let reflected = solve_forward(mirrored.theta1, mirrored.theta2, lengths);
        approx::assert_abs_diff_eq!(end.reflected().x, reflected.x, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(end.reflected().y, reflected.y, epsilon = 1e-9);
    }
}
