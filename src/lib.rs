#![doc = include_str!(".crate-docs.md")]

use std::{
    error::Error,
    f64::consts::{PI, TAU},
    fmt::{Debug, Display},
    ops::{Add, Div, Mul, Neg, Sub},
};

pub mod animation;
pub mod arm;
#[cfg(feature = "files")]
pub mod file;
pub mod forward;
pub mod inverse;
#[cfg(feature = "serde")]
mod serde;

pub use arm::{Arm, ArmPose};
pub use forward::{elbow_position, solve_forward};
pub use inverse::{solve_inverse, solve_inverse_with, ElbowBranch, InverseSolution, Reach};

/// A location in the arm's base frame.
///
/// The base joint of the arm is always located at [`Point::ORIGIN`].
#[derive(Default, Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct Point {
    /// The x-axis component of this point.
    pub x: f64,
    /// The y-axis component of this point.
    pub y: f64,
}

impl Point {
    /// The location of the arm's base joint.
    pub const ORIGIN: Self = Self::new(0., 0.);

    /// Returns a new point from the x and y values.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point `length` away from the origin in the direction of
    /// `angle`.
    #[must_use]
    pub fn from_polar(length: f64, angle: Angle) -> Self {
        Self::new(length * angle.cos(), length * angle.sin())
    }

    /// Returns the distance between this point and the origin.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the direction of this point as seen from the origin.
    ///
    /// The origin itself has no direction. It is defined to point along the
    /// positive x-axis, regardless of the sign of either zero component.
    #[must_use]
    pub fn direction(&self) -> Angle {
        if self.x == 0. && self.y == 0. {
            Angle::ZERO
        } else {
            Angle::radians(self.y.atan2(self.x))
        }
    }

    /// Returns this point mirrored across the x-axis.
    #[must_use]
    pub fn reflected(self) -> Self {
        Self::new(self.x, -self.y)
    }

    /// Returns the result of mapping `x` and `y` to `f`.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        Display::fmt(&self.x, f)?;
        f.write_str(", ")?;
        Display::fmt(&self.y, f)?;
        f.write_str(")")
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        self.map(|c| c * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        self.map(|c| c / rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.map(Neg::neg)
    }
}

/// An angle in radians, normalized into `(-π, π]`.
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Angle {
    radians: f64,
}

impl Angle {
    /// No rotation.
    pub const ZERO: Self = Self { radians: 0. };
    /// Half of a full rotation. This is also the largest representable
    /// angle.
    pub const HALF_TURN: Self = Self { radians: PI };

    /// Returns an angle representing the given radians.
    #[must_use]
    pub fn radians(radians: f64) -> Self {
        Self { radians }.normalized()
    }

    /// Returns an angle representing the given degrees.
    #[must_use]
    pub fn degrees(degrees: f64) -> Self {
        Self::radians(degrees.to_radians())
    }

    /// Returns this angle represented in degrees.
    ///
    /// This value will always be greater than -180.0 and less than or equal to
    /// 180.0.
    #[must_use]
    pub fn to_degrees(self) -> f64 {
        self.radians.to_degrees()
    }

    /// Returns this angle represented in radians.
    ///
    /// This value will always be greater than `-π` and less than or equal to
    /// `π`.
    #[must_use]
    pub const fn to_radians(self) -> f64 {
        self.radians
    }

    /// Returns the sine of this angle.
    #[must_use]
    pub fn sin(self) -> f64 {
        self.radians.sin()
    }

    /// Returns the cosine of this angle.
    #[must_use]
    pub fn cos(self) -> f64 {
        self.radians.cos()
    }

    fn normalized(mut self) -> Self {
        if self.radians > -PI && self.radians <= PI {
            return self;
        }
        // Non-finite input propagates as NaN.
        let radians = PI - (PI - self.radians).rem_euclid(TAU);
        // `rem_euclid` can round up to `TAU`, which would land on `-π`.
        self.radians = if radians <= -PI { radians + TAU } else { radians };
        self
    }
}

impl Debug for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.to_degrees(), f)?;
        f.write_str("°")
    }
}

impl Default for Angle {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Angle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::radians(self.radians + rhs.radians)
    }
}

impl Sub for Angle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::radians(self.radians - rhs.radians)
    }
}

impl Neg for Angle {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::radians(-self.radians)
    }
}

/// One of the two links of the arm, or the joint that drives it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum Link {
    /// The link attached to the base. Its joint angle is measured from the
    /// positive x-axis.
    First,
    /// The link attached to the elbow. Its joint angle is measured relative
    /// to the first link.
    Second,
}

impl Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Link::First => f.write_str("link 1"),
            Link::Second => f.write_str("link 2"),
        }
    }
}

/// The lengths of both links of the arm.
///
/// Both lengths are always finite and greater than zero.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LinkLengths {
    first: f64,
    second: f64,
}

impl LinkLengths {
    /// Returns the lengths for an arm whose first link is `first` long and
    /// whose second link is `second` long.
    pub fn new(first: f64, second: f64) -> Result<Self, LengthError> {
        Ok(Self {
            first: validate_length(Link::First, first)?,
            second: validate_length(Link::Second, second)?,
        })
    }

    /// Returns the length of the first link, `L1`.
    #[must_use]
    pub const fn first(&self) -> f64 {
        self.first
    }

    /// Returns the length of the second link, `L2`.
    #[must_use]
    pub const fn second(&self) -> f64 {
        self.second
    }

    /// Returns the length of `link`.
    #[must_use]
    pub const fn get(&self, link: Link) -> f64 {
        match link {
            Link::First => self.first,
            Link::Second => self.second,
        }
    }

    /// Returns a copy of these lengths with `link` replaced by `length`.
    pub fn with(mut self, link: Link, length: f64) -> Result<Self, LengthError> {
        let length = validate_length(link, length)?;
        match link {
            Link::First => self.first = length,
            Link::Second => self.second = length,
        }
        Ok(self)
    }

    /// Returns the distance from the base of the fully extended arm.
    #[must_use]
    pub fn max_reach(&self) -> f64 {
        self.first + self.second
    }

    /// Returns the distance from the base of the fully folded arm.
    #[must_use]
    pub fn min_reach(&self) -> f64 {
        (self.first - self.second).abs()
    }
}

impl Default for LinkLengths {
    /// Returns a 4-unit first link and a 5-unit second link.
    fn default() -> Self {
        Self {
            first: 4.,
            second: 5.,
        }
    }
}

fn validate_length(link: Link, length: f64) -> Result<f64, LengthError> {
    if !length.is_finite() {
        Err(LengthError::NotFinite { link, length })
    } else if length <= 0. {
        Err(LengthError::NotPositive { link, length })
    } else {
        Ok(length)
    }
}

/// A link length was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LengthError {
    /// The length was zero or negative.
    NotPositive {
        /// The link the length was given for.
        link: Link,
        /// The rejected length.
        length: f64,
    },
    /// The length was infinite or NaN.
    NotFinite {
        /// The link the length was given for.
        link: Link,
        /// The rejected length.
        length: f64,
    },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::NotPositive { link, length } => {
                write!(f, "{link} must be longer than 0, got {length}")
            }
            LengthError::NotFinite { link, length } => {
                write!(f, "{link} must have a finite length, got {length}")
            }
        }
    }
}

impl Error for LengthError {}

/// The angles of both joints of the arm.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct JointAngles {
    /// The angle between the positive x-axis and the first link.
    pub theta1: Angle,
    /// The angle between the first link's direction and the second link.
    pub theta2: Angle,
}

impl JointAngles {
    /// Returns joint angles from the base and elbow angles.
    #[must_use]
    pub const fn new(theta1: Angle, theta2: Angle) -> Self {
        Self { theta1, theta2 }
    }

    /// Returns joint angles from the base and elbow angles given in degrees.
    #[must_use]
    pub fn degrees(theta1: f64, theta2: f64) -> Self {
        Self::new(Angle::degrees(theta1), Angle::degrees(theta2))
    }

    /// Returns the angle of the joint driving `link`.
    #[must_use]
    pub const fn get(&self, link: Link) -> Angle {
        match link {
            Link::First => self.theta1,
            Link::Second => self.theta2,
        }
    }

    /// Sets the angle of the joint driving `link`.
    pub fn set(&mut self, link: Link, angle: Angle) {
        match link {
            Link::First => self.theta1 = angle,
            Link::Second => self.theta2 = angle,
        }
    }
}

impl Neg for JointAngles {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.theta1, -self.theta2)
    }
}

/// A fully solved arm pose.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct KinematicSolution {
    /// The joint angles the pose was computed from.
    pub joint_angles: JointAngles,
    /// The location of the joint between the two links.
    pub elbow: Point,
    /// The location of the tip of the second link.
    pub end_effector: Point,
}

#[test]
fn angle_normalization() {
    approx::assert_abs_diff_eq!(Angle::degrees(180.).to_radians(), PI, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(
        Angle::degrees(-180.).to_radians().abs(),
        PI,
        epsilon = 1e-12
    );
    assert_eq!(Angle::radians(0.25).to_radians(), 0.25);
    assert_eq!(Angle::radians(-PI), Angle::HALF_TURN);
    assert_eq!(Angle::radians(0.).to_radians(), 0.);
    approx::assert_abs_diff_eq!(Angle::degrees(270.).to_degrees(), -90., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(Angle::degrees(-450.).to_degrees(), -90., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(
        (Angle::degrees(90.) + Angle::degrees(180.)).to_degrees(),
        -90.,
        epsilon = 1e-9
    );
    approx::assert_abs_diff_eq!(
        (Angle::degrees(-170.) - Angle::degrees(20.)).to_degrees(),
        170.,
        epsilon = 1e-9
    );
    assert!(Angle::radians(f64::INFINITY).to_radians().is_nan());
}

#[test]
fn angle_display() {
    assert_eq!(format!("{:.2}", Angle::degrees(45.)), "45.00°");
    assert_eq!(format!("{:.1}", Point::new(1., -2.5)), "(1.0, -2.5)");
}

#[test]
fn point_direction() {
    assert_eq!(Point::ORIGIN.direction(), Angle::ZERO);
    assert_eq!(Point::new(-0., 0.).direction(), Angle::ZERO);
    assert_eq!(Point::new(0., -0.).direction(), Angle::ZERO);
    approx::assert_abs_diff_eq!(
        Point::new(0., 3.).direction().to_degrees(),
        90.,
        epsilon = 1e-9
    );
    assert_eq!(Point::new(-1., -0.).direction(), Angle::HALF_TURN);
}

#[test]
fn link_lengths() {
    let lengths = LinkLengths::new(4., 5.).unwrap();
    assert_eq!(lengths.max_reach(), 9.);
    assert_eq!(lengths.min_reach(), 1.);
    assert_eq!(lengths.get(Link::Second), 5.);
    assert_eq!(
        LinkLengths::new(0., 5.),
        Err(LengthError::NotPositive {
            link: Link::First,
            length: 0.
        })
    );
    assert!(matches!(
        LinkLengths::new(4., f64::NAN),
        Err(LengthError::NotFinite {
            link: Link::Second,
            ..
        })
    ));
    assert!(lengths.with(Link::Second, -1.).is_err());
    assert_eq!(lengths.with(Link::First, 2.).unwrap().first(), 2.);
    assert_eq!(
        LengthError::NotPositive {
            link: Link::Second,
            length: -1.
        }
        .to_string(),
        "link 2 must be longer than 0, got -1"
    );
}
