//! Forward and inverse kinematics for a two-link planar arm, from the command
//! line.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use twolink::{
    forward, solve_inverse_with, Arm, ArmPose, ElbowBranch, JointAngles, KinematicSolution,
    LinkLengths, Point, Reach,
};

#[derive(Parser)]
#[command(version, propagate_version = true)]
#[command(about = "Two-link planar arm kinematics", long_about = None)]
struct Args {
    /// Level of verbosity.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the end effector position from joint angles.
    Forward {
        /// Angle of the first joint from the positive x-axis, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        theta1: f64,
        /// Angle of the second joint relative to the first link, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        theta2: f64,
        #[command(flatten)]
        lengths: LengthArgs,
    },
    /// Compute joint angles that reach a target position.
    Inverse {
        /// Target x coordinate.
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        /// Target y coordinate.
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[command(flatten)]
        lengths: LengthArgs,
        /// Which of the two solutions to report.
        #[arg(long, value_enum, default_value_t = Branch::Up)]
        branch: Branch,
    },
    /// Solve both poses stored in a parameters file.
    Solve {
        /// Path to the parameters file.
        file: PathBuf,
    },
    /// Write the default parameters to a file.
    Init {
        /// Path to the parameters file.
        file: PathBuf,
    },
}

#[derive(clap::Args)]
struct LengthArgs {
    /// Length of the first link.
    #[arg(long, default_value_t = 4.0)]
    l1: f64,
    /// Length of the second link.
    #[arg(long, default_value_t = 5.0)]
    l2: f64,
}

impl LengthArgs {
    fn lengths(&self) -> anyhow::Result<LinkLengths> {
        Ok(LinkLengths::new(self.l1, self.l2)?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Branch {
    Up,
    Down,
}

impl From<Branch> for ElbowBranch {
    fn from(branch: Branch) -> Self {
        match branch {
            Branch::Up => ElbowBranch::Up,
            Branch::Down => ElbowBranch::Down,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut log_config = simplelog::ConfigBuilder::new();
    log_config.set_time_level(log::LevelFilter::Off);
    log_config.set_target_level(log::LevelFilter::Off);
    log_config.set_location_level(log::LevelFilter::Off);

    let log_level = match args.verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    simplelog::TermLogger::init(
        log_level,
        log_config.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    match args.command {
        Command::Forward {
            theta1,
            theta2,
            lengths,
        } => {
            let solution = forward::solve(JointAngles::degrees(theta1, theta2), lengths.lengths()?);
            print_solution("Forward kinematics", &solution);
        }
        Command::Inverse {
            x,
            y,
            lengths,
            branch,
        } => {
            let lengths = lengths.lengths()?;
            let solution = solve_inverse_with(Point::new(x, y), lengths, branch.into());
            print_solution("Inverse kinematics", &solution.pose(lengths));
            print_reach(solution.reach);
        }
        Command::Solve { file } => {
            let arm = Arm::read_from(&file)?;
            log::info!("loaded arm parameters from {}", file.display());
            let ArmPose {
                forward,
                inverse,
                reach,
            } = arm.solve();
            print_solution("Forward kinematics", &forward);
            println!();
            println!("Target: {:.2}", arm.target());
            print_solution(&format!("Inverse kinematics ({})", arm.branch()), &inverse);
            print_reach(reach);
        }
        Command::Init { file } => {
            Arm::default().write_to(&file)?;
            println!("Wrote default parameters to {}", file.display());
        }
    }

    Ok(())
}

fn print_solution(title: &str, solution: &KinematicSolution) {
    println!("{title}");
    println!(
        "  θ1: {:.2}, θ2: {:.2}",
        solution.joint_angles.theta1, solution.joint_angles.theta2
    );
    println!("  Elbow: {:.2}", solution.elbow);
    println!("  End effector: {:.2}", solution.end_effector);
}

fn print_reach(reach: Reach) {
    if !reach.is_within() {
        println!("  Warning: {reach:.2}; showing the closest reachable pose");
    }
}
