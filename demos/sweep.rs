//! Sweeps an arm's target around a circle that passes beyond its reach,
//! printing both poses at each step.
use std::time::Duration;

use easing_function::easings::StandardEasing;
use twolink::{
    animation::{Animation, ChangeKind, Frame},
    Angle, Arm, Link, Point,
};

fn main() {
    let mut arm = Arm::default();

    // Walk the target a quarter turn at a time around a circle of radius 10.
    // The default arm is only 9 units long, so each keyframe is out of reach
    // while the straight paths between them dip back inside it.
    let animation = (1..=4)
        .map(|quarter| {
            let direction = Angle::degrees(f64::from(quarter) * 90.);
            Frame::new(Duration::from_secs(1))
                .with_change(ChangeKind::Target {
                    position: Point::from_polar(10., direction),
                })
                .with_change(
                    ChangeKind::Joint {
                        link: Link::First,
                        angle: direction,
                    }
                    .with_easing(StandardEasing::InOutSine),
                )
        })
        .collect::<Animation>();

    let mut running = animation.start();
    let step = Duration::from_millis(250);
    let mut elapsed = Duration::ZERO;
    print_pose(elapsed, &arm);
    while running.update(step, &mut arm) {
        elapsed += step;
        print_pose(elapsed, &arm);
    }
    print_pose(elapsed + step, &arm);
}

fn print_pose(elapsed: Duration, arm: &Arm) {
    let pose = arm.solve();
    println!(
        "{:>5.2}s  forward tip {:.2}  target {:.2}  inverse tip {:.2}  ({:.2})",
        elapsed.as_secs_f32(),
        pose.forward.end_effector,
        arm.target(),
        pose.inverse.end_effector,
        pose.reach,
    );
}
