//! Reading and writing [`Arm`] parameters as RSN documents.
//!
//! ```rsn
//! Arm {
//!     theta1_degrees: 45.0,
//!     theta2_degrees: 45.0,
//!     target_x: 4.0,
//!     target_y: 5.0,
//!     first_length: 4.0,
//!     second_length: 5.0,
//!     branch: Up,
//! }
//! ```
//!
//! Angles are stored in degrees. `branch` may be omitted, in which case the
//! elbow-up solution is used.

use std::{
    error::Error,
    fmt::Display,
    fs,
    io::{self, BufWriter},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tempfile::{NamedTempFile, PersistError};

use crate::{Arm, ElbowBranch, JointAngles, LengthError, LinkLengths, Point};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename = "Arm")]
struct SerializedArm {
    theta1_degrees: f64,
    theta2_degrees: f64,
    target_x: f64,
    target_y: f64,
    first_length: f64,
    second_length: f64,
    #[serde(default, with = "branch_name")]
    branch: ElbowBranch,
}

/// Stores the elbow branch as a bare `Up` or `Down`. Reading goes through
/// the string path so that both `Down` and `"Down"` are accepted.
mod branch_name {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::ElbowBranch;

    const NAMES: &[&str] = &["Up", "Down"];

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(branch: &ElbowBranch, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match branch {
            ElbowBranch::Up => serializer.serialize_unit_variant("ElbowBranch", 0, "Up"),
            ElbowBranch::Down => serializer.serialize_unit_variant("ElbowBranch", 1, "Down"),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ElbowBranch, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "Up" => Ok(ElbowBranch::Up),
            "Down" => Ok(ElbowBranch::Down),
            other => Err(de::Error::unknown_variant(other, NAMES)),
        }
    }
}

impl From<&'_ Arm> for SerializedArm {
    fn from(arm: &'_ Arm) -> Self {
        let joint_angles = arm.joint_angles();
        let target = arm.target();
        let lengths = arm.lengths();
        Self {
            theta1_degrees: joint_angles.theta1.to_degrees(),
            theta2_degrees: joint_angles.theta2.to_degrees(),
            target_x: target.x,
            target_y: target.y,
            first_length: lengths.first(),
            second_length: lengths.second(),
            branch: arm.branch(),
        }
    }
}

impl TryFrom<SerializedArm> for Arm {
    type Error = LengthError;

    fn try_from(arm: SerializedArm) -> Result<Self, Self::Error> {
        let lengths = LinkLengths::new(arm.first_length, arm.second_length)?;
        Ok(Arm::new(lengths)
            .with_joint_angles(JointAngles::degrees(
                arm.theta1_degrees,
                arm.theta2_degrees,
            ))
            .with_target(Point::new(arm.target_x, arm.target_y))
            .with_branch(arm.branch))
    }
}

impl Arm {
    /// Reads arm parameters from the RSN document at `path`.
    pub fn read_from(path: &Path) -> Result<Self, ReadError> {
        let contents = fs::read(path)?;
        let arm = rsn::from_slice::<SerializedArm>(&contents)?;
        Ok(Self::try_from(arm)?)
    }

    /// Writes these parameters to `path` as an RSN document.
    ///
    /// The document is written to a temporary file next to `path` and then
    /// moved into place, so an existing file is never left half-written.
    pub fn write_to(&self, path: &Path) -> Result<(), SaveError> {
        let arm = SerializedArm::from(self);
        let parent = path.parent().ok_or(SaveError::InvalidPath)?;
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        let mut temp_file = NamedTempFile::new_in(parent)?;
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        rsn::ser::Config::pretty().serialize_to_writer(&arm, &mut writer)?;
        writer
            .into_inner()
            .map_err(io::IntoInnerError::into_error)?;
        temp_file.persist(path)?;
        log::debug!("saved arm parameters to {}", path.display());

        Ok(())
    }
}

/// An error reading arm parameters.
#[derive(Debug)]
pub enum ReadError {
    /// The file could not be read.
    Io(io::Error),
    /// The file was not a valid parameters document.
    Rsn(rsn::de::Error),
    /// The document contained an invalid link length.
    Length(LengthError),
}

impl From<io::Error> for ReadError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rsn::de::Error> for ReadError {
    fn from(value: rsn::de::Error) -> Self {
        Self::Rsn(value)
    }
}

impl From<LengthError> for ReadError {
    fn from(value: LengthError) -> Self {
        Self::Length(value)
    }
}

impl Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::Io(err) => Display::fmt(err, f),
            ReadError::Rsn(err) => Display::fmt(err, f),
            ReadError::Length(err) => Display::fmt(err, f),
        }
    }
}

impl Error for ReadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReadError::Io(err) => Some(err),
            ReadError::Rsn(_) => None,
            ReadError::Length(err) => Some(err),
        }
    }
}

/// An error writing arm parameters.
#[derive(Debug)]
pub enum SaveError {
    /// The file could not be written.
    Io(io::Error),
    /// The path has no parent directory to write into.
    InvalidPath,
}

impl From<io::Error> for SaveError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<PersistError> for SaveError {
    fn from(err: PersistError) -> Self {
        Self::Io(err.error)
    }
}

impl Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(err) => Display::fmt(err, f),
            SaveError::InvalidPath => f.write_str("invalid file path"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SaveError::Io(err) => Some(err),
            SaveError::InvalidPath => None,
        }
    }
}

#[test]
fn save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arm.rsn");
    let arm = Arm::new(LinkLengths::new(3., 2.5).unwrap())
        .with_joint_angles(JointAngles::degrees(-90., 135.))
        .with_target(Point::new(-2.5, 0.5))
        .with_branch(ElbowBranch::Down);
    arm.write_to(&path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("branch: Down"));

    let loaded = Arm::read_from(&path).unwrap();
    assert_eq!(loaded.target(), arm.target());
    assert_eq!(loaded.lengths(), arm.lengths());
    assert_eq!(loaded.branch(), ElbowBranch::Down);
    approx::assert_abs_diff_eq!(
        loaded.joint_angles().theta2.to_degrees(),
        135.,
        epsilon = 1e-9
    );
    approx::assert_abs_diff_eq!(
        loaded.joint_angles().theta1.to_degrees(),
        -90.,
        epsilon = 1e-9
    );

    // Overwriting replaces the previous document.
    Arm::default().write_to(&path).unwrap();
    assert_eq!(Arm::read_from(&path).unwrap().branch(), ElbowBranch::Up);
}

#[test]
fn branch_defaults_to_up() {
    let document = "Arm { theta1_degrees: 45.0, theta2_degrees: -30.0, target_x: 4.0, \
                    target_y: 5.0, first_length: 4.0, second_length: 5.0 }";
    let serialized = rsn::from_slice::<SerializedArm>(document.as_bytes()).unwrap();
    let arm = Arm::try_from(serialized).unwrap();
    assert_eq!(arm.branch(), ElbowBranch::Up);
    assert_eq!(arm.lengths(), LinkLengths::default());
    approx::assert_abs_diff_eq!(
        arm.joint_angles().theta2.to_degrees(),
        -30.,
        epsilon = 1e-9
    );
}

#[test]
fn hand_written_branch() {
    let document = "Arm {
        theta1_degrees: 0.0,
        theta2_degrees: 0.0,
        target_x: 1.0,
        target_y: 2.0,
        first_length: 4.0,
        second_length: 5.0,
        branch: Down,
    }";
    let serialized = rsn::from_slice::<SerializedArm>(document.as_bytes()).unwrap();
    assert_eq!(serialized.branch, ElbowBranch::Down);

    let quoted = document.replace("branch: Down", "branch: \"Down\"");
    let serialized = rsn::from_slice::<SerializedArm>(quoted.as_bytes()).unwrap();
    assert_eq!(serialized.branch, ElbowBranch::Down);

    let sideways = document.replace("branch: Down", "branch: Sideways");
    assert!(rsn::from_slice::<SerializedArm>(sideways.as_bytes()).is_err());
}

#[test]
fn invalid_documents() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.rsn");
    assert!(matches!(Arm::read_from(&missing), Err(ReadError::Io(_))));

    let garbage = dir.path().join("garbage.rsn");
    fs::write(&garbage, "not an arm").unwrap();
    assert!(matches!(Arm::read_from(&garbage), Err(ReadError::Rsn(_))));

    let negative = dir.path().join("negative.rsn");
    let mut serialized = SerializedArm::from(&Arm::default());
    serialized.second_length = -5.;
    let mut bytes = Vec::new();
    rsn::ser::Config::pretty()
        .serialize_to_writer(&serialized, &mut bytes)
        .unwrap();
    fs::write(&negative, bytes).unwrap();
    let err = Arm::read_from(&negative).unwrap_err();
    assert!(matches!(err, ReadError::Length(LengthError::NotPositive { .. })));
    assert_eq!(err.to_string(), "link 2 must be longer than 0, got -5");

    assert!(matches!(
        Arm::default().write_to(Path::new("/")),
        Err(SaveError::InvalidPath)
    ));
}
