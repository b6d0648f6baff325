//! Slash-separated text form of a joint.
//!
//! ```text
//! distance/3/0.5,0/7/-0.5,0/2/1
//! background-angle/4/0,0/0,2/0.25/1
//! ```
//!
//! Kind, body 1 id, local anchor 1, then either `id/local anchor 2` or the
//! fixed world anchor, then the kind's parameters and the strength. Floats
//! use the shortest form that parses back to the same value.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use super::{Joint, JointKind};
use crate::api::types::BodyId;
use crate::error::PhysicsError;

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind.name(self.is_background()), self.b1, Point(self.local1))?;
        if let Some(b2) = self.b2 {
            write!(f, "/{}", b2)?;
        }
        write!(f, "/{}", Point(self.anchor2))?;
        match self.kind {
            JointKind::Distance { length } => write!(f, "/{}", length)?,
            JointKind::Spring {
                rest_length,
                stiffness,
                damping,
            } => write!(f, "/{}/{}/{}", rest_length, stiffness, damping)?,
            JointKind::Angle { target } => write!(f, "/{}", target)?,
        }
        write!(f, "/{}", self.strength)
    }
}

struct Point(Vec2);

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

impl FromStr for Joint {
    type Err = PhysicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Tokens {
            input: s,
            parts: s.trim().split('/'),
        };
        let name = tokens.next("kind")?;
        let (background, base) = match name.strip_prefix("background-") {
            Some(base) => (true, base),
            None => (false, name),
        };

        let b1 = tokens.id()?;
        let local1 = tokens.vec()?;
        let b2 = if background { None } else { Some(tokens.id()?) };
        let anchor2 = tokens.vec()?;

        let kind = match base {
            "distance" => JointKind::Distance {
                length: tokens.float()?,
            },
            "spring" => JointKind::Spring {
                rest_length: tokens.float()?,
                stiffness: tokens.float()?,
                damping: tokens.float()?,
            },
            "angle" => JointKind::Angle {
                target: tokens.float()?,
            },
            other => {
                return Err(PhysicsError::joint_format(s, format!("unknown joint kind `{}`", other)))
            }
        };
        let strength = tokens.float()?;
        tokens.finish()?;

        Ok(Joint::from_parts(b1, b2, local1, anchor2, kind).with_strength(strength))
    }
}

struct Tokens<'a> {
    input: &'a str,
    parts: std::str::Split<'a, char>,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> Result<&'a str, PhysicsError> {
        self.parts
            .next()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| PhysicsError::joint_format(self.input, format!("missing {}", what)))
    }

    fn id(&mut self) -> Result<BodyId, PhysicsError> {
        let token = self.next("body id")?;
        token
            .parse::<u32>()
            .map(BodyId)
            .map_err(|e| PhysicsError::joint_format(self.input, format!("bad body id `{}`: {}", token, e)))
    }

    fn float(&mut self) -> Result<f32, PhysicsError> {
        let token = self.next("number")?;
        parse_float(self.input, token)
    }

    fn vec(&mut self) -> Result<Vec2, PhysicsError> {
        let token = self.next("point")?;
        let (x, y) = token
            .split_once(',')
            .ok_or_else(|| PhysicsError::joint_format(self.input, format!("bad point `{}`", token)))?;
        Ok(Vec2::new(parse_float(self.input, x)?, parse_float(self.input, y)?))
    }

    fn finish(&mut self) -> Result<(), PhysicsError> {
        match self.parts.next() {
            None => Ok(()),
            Some(extra) => Err(PhysicsError::joint_format(
                self.input,
                format!("unexpected trailing `{}`", extra),
            )),
        }
    }
}

fn parse_float(input: &str, token: &str) -> Result<f32, PhysicsError> {
    token
        .trim()
        .parse::<f32>()
        .map_err(|e| PhysicsError::joint_format(input, format!("bad number `{}`: {}", token, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_round_trip(joint: Joint) {
        let text = joint.to_string();
        let parsed: Joint = text.parse().unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_eq!(parsed, joint, "text {}", text);
        assert_eq!(parsed.to_string(), text);
    }

    #[test]
    fn every_kind_round_trips() {
        let awkward = Vec2::new(0.1 + 0.2, -1.0 / 3.0);
        assert_round_trip(Joint::from_parts(
            BodyId(3),
            Some(BodyId(7)),
            awkward,
            Vec2::new(-0.5, 0.0),
            JointKind::Distance { length: 2.7182817 },
        ));
        assert_round_trip(
            Joint::from_parts(
                BodyId(0),
                Some(BodyId(1)),
                Vec2::ZERO,
                awkward,
                JointKind::Spring {
                    rest_length: 4.0,
                    stiffness: 120.5,
                    damping: 0.33,
                },
            )
            .with_strength(0.75),
        );
        assert_round_trip(Joint::from_parts(
            BodyId(2),
            Some(BodyId(9)),
            Vec2::ZERO,
            Vec2::ZERO,
            JointKind::Angle { target: -0.785398 },
        ));
        assert_round_trip(Joint::from_parts(
            BodyId(4),
            None,
            awkward,
            Vec2::new(1e-7, 12345.678),
            JointKind::Distance { length: 5.0 },
        ));
        assert_round_trip(Joint::from_parts(
            BodyId(5),
            None,
            Vec2::ZERO,
            Vec2::new(0.0, 2.0),
            JointKind::Angle { target: 0.25 },
        ));
    }

    #[test]
    fn text_layout() {
        let joint = Joint::from_parts(
            BodyId(3),
            Some(BodyId(7)),
            Vec2::new(0.5, 0.0),
            Vec2::new(-0.5, 0.0),
            JointKind::Distance { length: 2.0 },
        );
        assert_eq!(joint.to_string(), "distance/3/0.5,0/7/-0.5,0/2/1");

        let background = Joint::from_parts(
            BodyId(4),
            None,
            Vec2::ZERO,
            Vec2::new(0.0, 2.0),
            JointKind::Angle { target: 0.25 },
        );
        assert_eq!(background.to_string(), "background-angle/4/0,0/0,2/0.25/1");
    }

    #[test]
    fn malformed_text_is_rejected() {
        for bad in [
            "",
            "rope/1/0,0/2/0,0/1/1",
            "distance/x/0,0/2/0,0/1/1",
            "distance/1/0;0/2/0,0/1/1",
            "distance/1/0,0/2/0,0/1",
            "distance/1/0,0/2/0,0/1/1/9",
            "background-distance/1/0,0/2/0,0/1/1",
        ] {
            match bad.parse::<Joint>() {
                Err(PhysicsError::JointFormat { input, .. }) => assert_eq!(input, bad),
                other => panic!("`{}` parsed as {:?}", bad, other),
            }
        }
    }
}
