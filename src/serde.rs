use std::borrow::Cow;

use serde::{
    de::{self, Visitor},
    ser::SerializeStruct,
    Deserialize, Serialize,
};

use crate::{animation::Animation, animation::Frame, Angle, LinkLengths};

impl Serialize for Angle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_newtype_struct("Angle", &self.radians)
    }
}

impl<'de> Deserialize<'de> for Angle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename = "Angle")]
        struct Radians(f64);

        let Radians(radians) = Radians::deserialize(deserializer)?;
        Ok(Angle::radians(radians))
    }
}

impl Serialize for LinkLengths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("LinkLengths", 2)?;
        s.serialize_field("first", &self.first)?;
        s.serialize_field("second", &self.second)?;
        s.end()
    }
}

impl<'de> Deserialize<'de> for LinkLengths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_struct("LinkLengths", &["first", "second"], LinkLengthsVisitor)
    }
}

struct LinkLengthsVisitor;

impl<'de> Visitor<'de> for LinkLengthsVisitor {
    type Value = LinkLengths;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "the lengths of two links")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut first = None;
        let mut second = None;
        while let Some(key) = map.next_key::<Cow<'de, str>>()? {
            match &*key {
                "first" => {
                    first = Some(map.next_value::<f64>()?);
                }
                "second" => {
                    second = Some(map.next_value::<f64>()?);
                }
                _ => {
                    return Err(<A::Error as de::Error>::custom(format!(
                        "unexpected field {key}"
                    )))
                }
            }
        }

        let first = first.ok_or_else(|| <A::Error as de::Error>::missing_field("first"))?;
        let second = second.ok_or_else(|| <A::Error as de::Error>::missing_field("second"))?;
        LinkLengths::new(first, second).map_err(<A::Error as de::Error>::custom)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        let first = seq
            .next_element::<f64>()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(0, &self))?;
        let second = seq
            .next_element::<f64>()?
            .ok_or_else(|| <A::Error as de::Error>::invalid_length(1, &self))?;
        LinkLengths::new(first, second).map_err(<A::Error as de::Error>::custom)
    }
}

impl Serialize for Animation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for Animation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<Frame>::deserialize(deserializer).map(Animation::from_iter)
    }
}

#[test]
fn roundtrip() {
    use std::time::Duration;

    use crate::{
        animation::ChangeKind, Arm, ElbowBranch, JointAngles, Link, Point,
    };

    let arm = Arm::new(LinkLengths::new(2.5, 1.5).unwrap())
        .with_joint_angles(JointAngles::degrees(-30., 120.))
        .with_target(Point::new(-1., 2.))
        .with_branch(ElbowBranch::Down);
    let serialized = pot::to_vec(&arm).unwrap();
    let deserialized: Arm = pot::from_slice(&serialized).unwrap();
    assert_eq!(deserialized, arm);

    let animation = Animation::default().with(
        Frame::new(Duration::from_millis(250))
            .with_change(ChangeKind::Joint {
                link: Link::Second,
                angle: Angle::degrees(-45.),
            })
            .with_change(ChangeKind::Length {
                link: Link::First,
                length: 3.,
            }),
    );
    let serialized = pot::to_vec(&animation).unwrap();
    let deserialized: Animation = pot::from_slice(&serialized).unwrap();
    assert_eq!(deserialized, animation);
}

#[test]
fn invalid_lengths_rejected() {
    #[derive(Serialize)]
    #[serde(rename = "LinkLengths")]
    struct Unchecked {
        first: f64,
        second: f64,
    }

    let serialized = pot::to_vec(&Unchecked {
        first: 3.,
        second: -1.,
    })
    .unwrap();
    let err = pot::from_slice::<LinkLengths>(&serialized).unwrap_err();
    assert!(err.to_string().contains("link 2"), "{err}");
}
