//! The inputs a front end exposes for an arm, solved together.
//!
//! An [`Arm`] only stores parameters. Every call to [`Arm::solve`] runs both
//! solvers from scratch and returns a fresh [`ArmPose`].

use std::ops::RangeInclusive;

use crate::{
    forward, inverse, Angle, ElbowBranch, JointAngles, KinematicSolution, LengthError, Link,
    LinkLengths, Point, Reach,
};

/// The range of joint angles, in degrees, offered to users.
pub const JOINT_DEGREES: RangeInclusive<f64> = -180.0..=180.0;
/// The range of each target coordinate offered to users.
pub const TARGET_COORDINATES: RangeInclusive<f64> = -10.0..=10.0;
/// The increment target coordinates are adjusted by.
pub const TARGET_STEP: f64 = 0.1;
/// The range of link lengths offered to users.
pub const LINK_LENGTHS: RangeInclusive<f64> = 1.0..=8.0;
/// The increment link lengths are adjusted by.
pub const LENGTH_STEP: f64 = 0.1;

/// The parameters of a two-link arm: the joint angles driving the forward
/// pose, the target driving the inverse pose, and the shared link lengths.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Arm {
    joint_angles: JointAngles,
    target: Point,
    lengths: LinkLengths,
    branch: ElbowBranch,
}

impl Default for Arm {
    fn default() -> Self {
        Self {
            joint_angles: JointAngles::degrees(45., 45.),
            target: Point::new(4., 5.),
            lengths: LinkLengths::default(),
            branch: ElbowBranch::Up,
        }
    }
}

impl Arm {
    /// Returns an arm with `lengths`, both joints at zero and the target at
    /// the tip of the fully extended arm.
    #[must_use]
    pub fn new(lengths: LinkLengths) -> Self {
        Self {
            joint_angles: JointAngles::default(),
            target: Point::new(lengths.max_reach(), 0.),
            lengths,
            branch: ElbowBranch::Up,
        }
    }

    /// Sets the joint angles and returns self.
    #[must_use]
    pub fn with_joint_angles(mut self, joint_angles: JointAngles) -> Self {
        self.joint_angles = joint_angles;
        self
    }

    /// Sets the target and returns self.
    #[must_use]
    pub fn with_target(mut self, target: Point) -> Self {
        self.target = target;
        self
    }

    /// Sets the elbow branch used for the inverse pose and returns self.
    #[must_use]
    pub fn with_branch(mut self, branch: ElbowBranch) -> Self {
        self.branch = branch;
        self
    }

    /// Returns the joint angles driving the forward pose.
    #[must_use]
    pub const fn joint_angles(&self) -> JointAngles {
        self.joint_angles
    }

    /// Sets the joint angles driving the forward pose.
    pub fn set_joint_angles(&mut self, joint_angles: JointAngles) {
        self.joint_angles = joint_angles;
    }

    /// Sets the angle of the joint driving `link`.
    pub fn set_joint_angle(&mut self, link: Link, angle: Angle) {
        self.joint_angles.set(link, angle);
    }

    /// Returns the target the inverse pose reaches for.
    #[must_use]
    pub const fn target(&self) -> Point {
        self.target
    }

    /// Sets the target the inverse pose reaches for.
    pub fn set_target(&mut self, target: Point) {
        self.target = target;
    }

    /// Returns the link lengths.
    #[must_use]
    pub const fn lengths(&self) -> LinkLengths {
        self.lengths
    }

    /// Replaces both link lengths.
    pub fn set_lengths(&mut self, lengths: LinkLengths) {
        self.lengths = lengths;
    }

    /// Sets the length of a single link. The arm is unchanged if `length` is
    /// rejected.
    pub fn set_length(&mut self, link: Link, length: f64) -> Result<(), LengthError> {
        self.lengths = self.lengths.with(link, length)?;
        Ok(())
    }

    /// Returns the elbow branch used for the inverse pose.
    #[must_use]
    pub const fn branch(&self) -> ElbowBranch {
        self.branch
    }

    /// Sets the elbow branch used for the inverse pose.
    pub fn set_branch(&mut self, branch: ElbowBranch) {
        self.branch = branch;
    }

    /// Solves both the forward pose and the inverse pose of this arm.
    #[must_use]
    pub fn solve(&self) -> ArmPose {
        let forward = forward::solve(self.joint_angles, self.lengths);
        let inverse = inverse::solve_inverse_with(self.target, self.lengths, self.branch);
        log::trace!(
            "solved arm: end effector {}, inverse angles {:?} ({})",
            forward.end_effector,
            inverse.angles,
            inverse.reach
        );
        ArmPose {
            forward,
            inverse: inverse.pose(self.lengths),
            reach: inverse.reach,
        }
    }
}

/// Both poses of an [`Arm`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ArmPose {
    /// The pose produced by the arm's joint angles.
    pub forward: KinematicSolution,
    /// The pose reaching for the arm's target.
    pub inverse: KinematicSolution,
    /// Whether the inverse pose reached its target exactly.
    pub reach: Reach,
}

#[test]
fn default_arm() {
    let pose = Arm::default().solve();
    approx::assert_abs_diff_eq!(pose.forward.end_effector.x, 2.828_427, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(pose.forward.end_effector.y, 7.828_427, epsilon = 1e-6);
    approx::assert_abs_diff_eq!(pose.forward.elbow.x, 2.828_427, epsilon = 1e-6);

    assert_eq!(pose.reach, Reach::Within);
    approx::assert_abs_diff_eq!(
        pose.inverse.joint_angles.theta1.to_degrees(),
        0.,
        epsilon = 1e-9
    );
    approx::assert_abs_diff_eq!(
        pose.inverse.joint_angles.theta2.to_degrees(),
        90.,
        epsilon = 1e-9
    );
    approx::assert_abs_diff_eq!(pose.inverse.elbow.x, 4., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(pose.inverse.end_effector.x, 4., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(pose.inverse.end_effector.y, 5., epsilon = 1e-9);
}

#[test]
fn default_parameters_fit_user_ranges() {
    let arm = Arm::default();
    assert!(JOINT_DEGREES.contains(&arm.joint_angles().theta1.to_degrees()));
    assert!(TARGET_COORDINATES.contains(&arm.target().x));
    assert!(TARGET_COORDINATES.contains(&arm.target().y));
    assert!(LINK_LENGTHS.contains(&arm.lengths().first()));
    assert!(LINK_LENGTHS.contains(&arm.lengths().second()));
}

#[test]
fn rejected_length_leaves_arm_unchanged() {
    let mut arm = Arm::default();
    assert!(arm.set_length(Link::First, 0.).is_err());
    assert_eq!(arm, Arm::default());
    arm.set_length(Link::Second, 2.).unwrap();
    assert_eq!(arm.lengths().second(), 2.);
}

#[test]
fn each_solve_is_independent() {
    let mut arm = Arm::new(LinkLengths::new(2., 2.).unwrap());
    let extended = arm.solve();
    approx::assert_abs_diff_eq!(extended.inverse.end_effector.x, 4., epsilon = 1e-9);

    arm.set_target(Point::new(0., 30.));
    arm.set_branch(ElbowBranch::Down);
    arm.set_joint_angle(Link::Second, Angle::degrees(90.));
    let saturated = arm.solve();
    assert!(matches!(saturated.reach, Reach::TooFar { .. }));
    approx::assert_abs_diff_eq!(saturated.inverse.end_effector.y, 4., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(saturated.forward.end_effector.x, 2., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(saturated.forward.end_effector.y, 2., epsilon = 1e-9);

    // Solving again with the original parameters gives the original pose.
    arm.set_target(Point::new(4., 0.));
    arm.set_branch(ElbowBranch::Up);
    arm.set_joint_angle(Link::Second, Angle::ZERO);
    assert_eq!(arm.solve(), extended);
}
