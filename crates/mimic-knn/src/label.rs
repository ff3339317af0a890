//! Exercise label convention: `exercise-name_angle[_secN]`.

use std::fmt;
use std::str::FromStr;

use crate::error::LabelError;

/// Camera viewpoint a movement was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CameraAngle {
    Front,
    Back,
    /// One of the two lateral views. Mirrors into [`CameraAngle::Side2`].
    Side1,
    /// The other lateral view. Mirrors into [`CameraAngle::Side1`].
    Side2,
}

impl CameraAngle {
    /// Return the label token for this angle.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Side1 => "side1",
            Self::Side2 => "side2",
        }
    }

    /// Return true for side views, which have a mirrored counterpart.
    #[must_use]
    pub fn is_lateral(self) -> bool {
        matches!(self, Self::Side1 | Self::Side2)
    }

    /// Return the opposite lateral view, or `None` for front and back.
    #[must_use]
    pub fn opposite_side(self) -> Option<Self> {
        match self {
            Self::Side1 => Some(Self::Side2),
            Self::Side2 => Some(Self::Side1),
            Self::Front | Self::Back => None,
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "front" => Some(Self::Front),
            "back" => Some(Self::Back),
            "side1" => Some(Self::Side1),
            "side2" => Some(Self::Side2),
            _ => None,
        }
    }
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which half of a longer recording a series covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Sec1,
    Sec2,
}

impl Section {
    /// Return the label token for this section.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sec1 => "sec1",
            Self::Sec2 => "sec2",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "sec1" => Some(Self::Sec1),
            "sec2" => Some(Self::Sec2),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed exercise label.
///
/// The exercise name may contain hyphens but no underscores; underscores
/// separate the name, the camera angle and the optional section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExerciseLabel {
    exercise: String,
    angle: CameraAngle,
    section: Option<Section>,
}

impl ExerciseLabel {
    /// Parse a label of the form `exercise-name_angle[_secN]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`LabelError::EmptyExercise`] | Nothing precedes the first underscore |
    /// | [`LabelError::MissingAngle`] | No underscore-separated angle |
    /// | [`LabelError::UnknownAngle`] | Angle is not front, back, side1 or side2 |
    /// | [`LabelError::UnknownSection`] | Trailing text is not sec1 or sec2 |
    pub fn parse(label: &str) -> Result<Self, LabelError> {
        let mut parts = label.splitn(3, '_');
        let exercise = parts.next().unwrap_or_default();
        if exercise.is_empty() {
            return Err(LabelError::EmptyExercise {
                label: label.to_owned(),
            });
        }

        let Some(angle_token) = parts.next() else {
            return Err(LabelError::MissingAngle {
                label: label.to_owned(),
            });
        };
        let angle = CameraAngle::parse(angle_token).ok_or_else(|| LabelError::UnknownAngle {
            label: label.to_owned(),
            angle: angle_token.to_owned(),
        })?;

        let section = match parts.next() {
            None => None,
            Some(token) => Some(Section::parse(token).ok_or_else(|| {
                LabelError::UnknownSection {
                    label: label.to_owned(),
                    section: token.to_owned(),
                }
            })?),
        };

        Ok(Self {
            exercise: exercise.to_owned(),
            angle,
            section,
        })
    }

    /// Return the exercise name.
    #[must_use]
    pub fn exercise(&self) -> &str {
        &self.exercise
    }

    /// Return the camera angle.
    #[must_use]
    pub fn angle(&self) -> CameraAngle {
        self.angle
    }

    /// Return the section, if the label has one.
    #[must_use]
    pub fn section(&self) -> Option<Section> {
        self.section
    }

    /// Return `exercise_angle`, dropping any section suffix.
    #[must_use]
    pub fn exercise_and_angle(&self) -> String {
        format!("{}_{}", self.exercise, self.angle)
    }

    /// Return the same label viewed from the opposite side, or `None` for non-lateral angles.
    #[must_use]
    pub fn opposite_side(&self) -> Option<Self> {
        self.angle.opposite_side().map(|angle| Self {
            angle,
            ..self.clone()
        })
    }
}

impl fmt::Display for ExerciseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.exercise, self.angle)?;
        if let Some(section) = self.section {
            write!(f, "_{section}")?;
        }
        Ok(())
    }
}

impl FromStr for ExerciseLabel {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Return the label with its side marker swapped, or `None` if it is not a lateral label.
///
/// Unparseable labels have no opposite side.
#[must_use]
pub fn opposite_side_label(label: &str) -> Option<String> {
    ExerciseLabel::parse(label)
        .ok()?
        .opposite_side()
        .map(|l| l.to_string())
}

/// Strip any section suffix for display; unparseable labels are returned unchanged.
#[must_use]
pub fn display_label(label: &str) -> String {
    ExerciseLabel::parse(label).map_or_else(|_| label.to_owned(), |l| l.exercise_and_angle())
}
