use crate::error::ConfigurationError;
use crate::stimulus::{ArrowDirection, FixationColor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A keyboard key, identified by the lowercase character it types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "char", into = "char")]
pub struct KeyId(char);

impl KeyId {
    pub const SPACE: KeyId = KeyId(' ');

    pub fn new(c: char) -> Self {
        KeyId(c.to_ascii_lowercase())
    }

    pub fn as_char(&self) -> char {
        self.0
    }
}

impl From<char> for KeyId {
    fn from(c: char) -> Self {
        KeyId::new(c)
    }
}

impl From<KeyId> for char {
    fn from(key: KeyId) -> Self {
        key.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ' ' => f.write_str("space"),
            c => write!(f, "{}", c.to_ascii_uppercase()),
        }
    }
}

/// The two response keys and the direction each one reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: KeyId,
    pub right: KeyId,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: KeyId('f'),
            right: KeyId('j'),
        }
    }
}

impl KeyBindings {
    pub fn recognized(&self) -> [KeyId; 2] {
        [self.left, self.right]
    }

    pub fn direction_of(&self, key: KeyId) -> Option<ArrowDirection> {
        if key == self.left {
            Some(ArrowDirection::Left)
        } else if key == self.right {
            Some(ArrowDirection::Right)
        } else {
            None
        }
    }

    pub fn key_for(&self, direction: ArrowDirection) -> KeyId {
        match direction {
            ArrowDirection::Left => self.left,
            ArrowDirection::Right => self.right,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.left == self.right {
            return Err(ConfigurationError::InvalidKeys(format!(
                "left and right are both bound to {}",
                self.left
            )));
        }
        Ok(())
    }

    /// Pure: the same `(direction, key)` pair always yields the same class.
    pub fn classify(&self, direction: ArrowDirection, key: Option<KeyId>) -> Classification {
        match key.map(|k| self.direction_of(k)) {
            Some(Some(pressed)) if pressed == direction => Classification::Correct,
            Some(Some(_)) => Classification::Incorrect,
            Some(None) | None => Classification::Timeout,
        }
    }
}

/// What the input channel reported for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseOutcome {
    pub key: Option<KeyId>,
    pub reaction_time: Option<Duration>,
}

impl ResponseOutcome {
    pub fn pressed(key: KeyId, elapsed: Duration) -> Self {
        Self {
            key: Some(key),
            reaction_time: Some(elapsed),
        }
    }

    pub fn timeout() -> Self {
        Self::default()
    }

    pub fn is_timeout(&self) -> bool {
        self.key.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Correct,
    Incorrect,
    Timeout,
}

impl Classification {
    pub fn feedback_color(&self) -> FixationColor {
        match self {
            Self::Correct => FixationColor::Positive,
            Self::Incorrect | Self::Timeout => FixationColor::Negative,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Timeout => "timeout",
        }
    }
}
