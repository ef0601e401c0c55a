//! Keyframed sweeps over an [`Arm`]'s parameters.
//!
//! An [`Animation`] is a list of [`Frame`]s. Each frame tweens a set of
//! parameters from wherever they were when the frame began to the values in
//! the frame's [`Change`]s. Animations only adjust parameters; call
//! [`Arm::solve`] after each update to get the new poses.
#![allow(missing_docs)]
use std::{ops::Deref, sync::Arc, time::Duration};

use easing_function::{easings::StandardEasing, Easing};

use crate::{Angle, Arm, Link, Point};

#[derive(Default, Debug, PartialEq, Clone)]
pub struct Animation(Arc<Vec<Frame>>);

impl Animation {
    #[must_use]
    pub fn with(mut self, frame: Frame) -> Self {
        Arc::make_mut(&mut self.0).push(frame);
        self
    }

    #[must_use]
    pub fn start(&self) -> RunningAnimation {
        RunningAnimation {
            animation: self.clone(),
            frame_elapsed: Duration::ZERO,
            frame: 0,
            repeat: false,
            frame_props: Vec::new(),
        }
    }
}

impl Deref for Animation {
    type Target = [Frame];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<Frame> for Animation {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Frame {
    duration: Duration,
    changes: Vec<Change>,
}

impl Frame {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            changes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_change(mut self, change: impl Into<Change>) -> Self {
        self.changes.push(change.into());
        self
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Change {
    kind: ChangeKind,
    easing: StandardEasing,
}

impl From<ChangeKind> for Change {
    fn from(kind: ChangeKind) -> Self {
        Self {
            kind,
            easing: StandardEasing::Linear,
        }
    }
}

/// A parameter of an [`Arm`] and the value it ends a frame at.
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChangeKind {
    /// Rotates the joint driving `link` along the shortest arc.
    Joint { link: Link, angle: Angle },
    /// Moves the inverse kinematics target.
    Target { position: Point },
    /// Resizes `link`. Lengths that are not greater than zero, including ones
    /// an easing overshoots into, are skipped.
    Length { link: Link, length: f64 },
}

impl ChangeKind {
    #[must_use]
    pub const fn with_easing(self, easing: StandardEasing) -> Change {
        Change { kind: self, easing }
    }
}

enum OriginalProperty {
    Angle(Angle),
    Point(Point),
    Length(f64),
}

pub struct RunningAnimation {
    animation: Animation,
    frame: usize,
    frame_elapsed: Duration,
    repeat: bool,
    frame_props: Vec<OriginalProperty>,
}

impl RunningAnimation {
    #[must_use]
    pub fn looping(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Returns the index of the frame currently being tweened.
    #[must_use]
    pub const fn frame(&self) -> usize {
        self.frame
    }

    /// Advances the animation by `elapsed`, updating `arm`'s parameters.
    ///
    /// Returns false once the final frame has completed and the animation is
    /// not looping.
    pub fn update(&mut self, elapsed: Duration, arm: &mut Arm) -> bool {
        self.frame_elapsed += elapsed;
        loop {
            let Some(frame) = self.animation.get(self.frame) else {
                return false;
            };

            if let Some(after_frame) = self.frame_elapsed.checked_sub(frame.duration) {
                self.frame_elapsed = after_frame;
                self.frame += 1;
                self.frame_props.clear();
                // Land exactly on the keyframe values.
                for change in &frame.changes {
                    apply(change.kind, arm);
                }
                if self.frame == self.animation.len() && self.repeat {
                    if self.animation.iter().all(|frame| frame.duration.is_zero()) {
                        // A loop that takes no time would never catch up.
                        return false;
                    }
                    self.frame = 0;
                }
            } else {
                // If this is the start of the frame, grab the current values
                // to tween towards the next keyframe.
                if self.frame_props.len() != frame.changes.len() {
                    self.frame_props.clear();
                    self.frame_props.reserve(frame.changes.len());
                    for change in &frame.changes {
                        self.frame_props.push(match change.kind {
                            ChangeKind::Joint { link, .. } => {
                                OriginalProperty::Angle(arm.joint_angles().get(link))
                            }
                            ChangeKind::Target { .. } => OriginalProperty::Point(arm.target()),
                            ChangeKind::Length { link, .. } => {
                                OriginalProperty::Length(arm.lengths().get(link))
                            }
                        });
                    }
                }

                let percent = self.frame_elapsed.as_secs_f32() / frame.duration.as_secs_f32();
                for (change, original) in frame.changes.iter().zip(&self.frame_props) {
                    let factor = change.easing.ease(percent);
                    let tweened = match (change.kind, original) {
                        (ChangeKind::Joint { link, angle }, OriginalProperty::Angle(original)) => {
                            ChangeKind::Joint {
                                link,
                                angle: original.lerp(angle, factor),
                            }
                        }
                        (ChangeKind::Target { position }, OriginalProperty::Point(original)) => {
                            ChangeKind::Target {
                                position: original.lerp(position, factor),
                            }
                        }
                        (ChangeKind::Length { link, length }, OriginalProperty::Length(original)) => {
                            ChangeKind::Length {
                                link,
                                length: original.lerp(length, factor),
                            }
                        }
                        _ => unreachable!(),
                    };
                    apply(tweened, arm);
                }
                return true;
            }
        }
    }
}

fn apply(change: ChangeKind, arm: &mut Arm) {
    match change {
        ChangeKind::Joint { link, angle } => arm.set_joint_angle(link, angle),
        ChangeKind::Target { position } => arm.set_target(position),
        ChangeKind::Length { link, length } => {
            if let Err(err) = arm.set_length(link, length) {
                log::warn!("skipping length change: {err}");
            }
        }
    }
}

trait Lerp: Sized {
    fn lerp(self, target: Self, percent: f32) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, target: Self, percent: f32) -> Self {
        let delta = target - self;
        self + delta * f64::from(percent)
    }
}

impl Lerp for Point {
    fn lerp(self, target: Self, percent: f32) -> Self {
        Point::new(
            self.x.lerp(target.x, percent),
            self.y.lerp(target.y, percent),
        )
    }
}

impl Lerp for Angle {
    fn lerp(self, target: Self, percent: f32) -> Self {
        // The difference is normalized, so this always takes the shorter way
        // around.
        let delta = target - self;
        Self::radians(self.to_radians().lerp(self.to_radians() + delta.to_radians(), percent))
    }
}

#[cfg(test)]
fn target_sweep() -> Animation {
    Animation::default()
        .with(
            Frame::new(Duration::from_secs(1)).with_change(ChangeKind::Target {
                position: Point::new(0., 5.),
            }),
        )
        .with(
            Frame::new(Duration::from_secs(2)).with_change(ChangeKind::Target {
                position: Point::new(0., -5.),
            }),
        )
}

#[test]
fn tweens_between_keyframes() {
    let mut arm = Arm::default();
    let mut running = target_sweep().start();

    assert!(running.update(Duration::from_millis(500), &mut arm));
    approx::assert_abs_diff_eq!(arm.target().x, 2., epsilon = 1e-6);
    approx::assert_abs_diff_eq!(arm.target().y, 5., epsilon = 1e-6);

    // Crossing into the second frame lands on the first keyframe before
    // tweening onward.
    assert!(running.update(Duration::from_millis(1_500), &mut arm));
    assert_eq!(running.frame(), 1);
    approx::assert_abs_diff_eq!(arm.target().x, 0., epsilon = 1e-6);
    approx::assert_abs_diff_eq!(arm.target().y, 0., epsilon = 1e-6);

    assert!(!running.update(Duration::from_secs(1), &mut arm));
    assert_eq!(arm.target(), Point::new(0., -5.));
    assert!(!running.update(Duration::from_secs(1), &mut arm));
}

#[test]
fn looping_restarts() {
    let mut arm = Arm::default();
    let mut running = target_sweep().start().looping();
    assert!(running.update(Duration::from_millis(3_250), &mut arm));
    assert_eq!(running.frame(), 0);
    // The second keyframe was applied, and a quarter of the first frame has
    // elapsed since.
    approx::assert_abs_diff_eq!(arm.target().y, -2.5, epsilon = 1e-6);
}

#[test]
fn joints_take_the_short_way_around() {
    let mut arm = Arm::default().with_joint_angles(crate::JointAngles::degrees(170., 0.));
    let mut running = Animation::default()
        .with(
            Frame::new(Duration::from_secs(1)).with_change(ChangeKind::Joint {
                link: Link::First,
                angle: Angle::degrees(-170.),
            }),
        )
        .start();
    assert!(running.update(Duration::from_millis(500), &mut arm));
    approx::assert_abs_diff_eq!(
        arm.joint_angles().theta1.to_degrees().abs(),
        180.,
        epsilon = 1e-3
    );
    assert!(!running.update(Duration::from_millis(500), &mut arm));
    approx::assert_abs_diff_eq!(
        arm.joint_angles().theta1.to_degrees(),
        -170.,
        epsilon = 1e-9
    );
}

#[test]
fn eased_changes() {
    let mut arm = Arm::default();
    let mut running = Animation::default()
        .with(
            Frame::new(Duration::from_secs(1)).with_change(
                ChangeKind::Joint {
                    link: Link::Second,
                    angle: Angle::degrees(135.),
                }
                .with_easing(StandardEasing::InOutSine),
            ),
        )
        .start();
    assert!(running.update(Duration::from_millis(250), &mut arm));
    // A quarter of the way through, in-out sine has covered about 14.6% of
    // the 90 degree turn.
    approx::assert_abs_diff_eq!(
        arm.joint_angles().theta2.to_degrees(),
        58.180_19,
        epsilon = 1e-3
    );
}

#[test]
fn invalid_lengths_are_skipped() {
    let mut arm = Arm::default();
    let mut running = Animation::default()
        .with(
            Frame::new(Duration::from_secs(1))
                .with_change(ChangeKind::Length {
                    link: Link::First,
                    length: -4.,
                })
                .with_change(ChangeKind::Length {
                    link: Link::Second,
                    length: 1.,
                }),
        )
        .start();

    // Halfway, the first link tweens through zero and is left alone.
    assert!(running.update(Duration::from_millis(500), &mut arm));
    approx::assert_abs_diff_eq!(arm.lengths().first(), 4., epsilon = 1e-9);
    approx::assert_abs_diff_eq!(arm.lengths().second(), 3., epsilon = 1e-6);

    assert!(!running.update(Duration::from_millis(500), &mut arm));
    approx::assert_abs_diff_eq!(arm.lengths().first(), 4., epsilon = 1e-9);
    assert_eq!(arm.lengths().second(), 1.);
}

#[test]
fn empty_animation_finishes_immediately() {
    let mut arm = Arm::default();
    assert!(!Animation::default()
        .start()
        .looping()
        .update(Duration::from_secs(1), &mut arm));
    assert_eq!(arm, Arm::default());
}

#[test]
fn instant_loop_stops() {
    let mut arm = Arm::default();
    let mut running = Animation::from_iter([Frame::new(Duration::ZERO).with_change(
        ChangeKind::Target {
            position: Point::new(1., 1.),
        },
    )])
    .start()
    .looping();
    assert!(!running.update(Duration::from_millis(16), &mut arm));
    assert_eq!(arm.target(), Point::new(1., 1.));
}
