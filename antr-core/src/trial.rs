use crate::error::ConfigurationError;
use crate::response::KeyId;
use crate::stimulus::{ArrowDirection, FlankerCongruency, TargetPosition, TargetStimulus};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::time::Duration;

const CUE_UP: &str = "cue_up";
const CUE_DOWN: &str = "cue_down";
const ARROW_DIRECTION: &str = "arrow_direction";
const FLANKER_CONGRUENCY: &str = "flanker_congruency";
const TARGET_POSITION: &str = "target_position";
const RESPONSE_KEY: &str = "response_key";
const REACTION_TIME: &str = "reaction_time";

const KNOWN_FIELDS: [&str; 5] = [
    CUE_UP,
    CUE_DOWN,
    ARROW_DIRECTION,
    FLANKER_CONGRUENCY,
    TARGET_POSITION,
];

/// How the cue relates to where the target appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueValidity {
    Valid,
    Invalid,
    Neutral,
    Double,
}

impl CueValidity {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Neutral => "neutral",
            Self::Double => "double",
        }
    }
}

/// One row of the trial list. Unknown columns ride along in `extra` and are
/// echoed into the result record untouched, after the known columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSpec {
    cue_up: bool,
    cue_down: bool,
    arrow_direction: ArrowDirection,
    flanker_congruency: FlankerCongruency,
    target_position: TargetPosition,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TrialSpec {
    pub fn new(
        cue_up: bool,
        cue_down: bool,
        arrow_direction: ArrowDirection,
        flanker_congruency: FlankerCongruency,
        target_position: TargetPosition,
    ) -> Self {
        Self {
            cue_up,
            cue_down,
            arrow_direction,
            flanker_congruency,
            target_position,
            extra: Map::new(),
        }
    }

    /// Adds a passthrough column. Known and reserved column names are
    /// rejected so the record never carries a column twice.
    pub fn with_extra(
        mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        check_passthrough_name(&name)?;
        self.extra.insert(name, value);
        Ok(self)
    }

    /// Validates one decoded trial-list row.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ConfigurationError> {
        let mut spec = Self::new(
            flag(fields, CUE_UP)?,
            flag(fields, CUE_DOWN)?,
            label(fields, ARROW_DIRECTION, ArrowDirection::from_label)?,
            label(fields, FLANKER_CONGRUENCY, FlankerCongruency::from_label)?,
            label(fields, TARGET_POSITION, TargetPosition::from_label)?,
        );
        for (name, value) in fields {
            if KNOWN_FIELDS.contains(&name.as_str()) {
                continue;
            }
            check_passthrough_name(name)?;
            spec.extra.insert(name.clone(), value.clone());
        }
        Ok(spec)
    }

    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Err(ConfigurationError::WrongType {
                field: "trial",
                expected: "an object",
            }),
        }
    }

    pub fn cue_up(&self) -> bool {
        self.cue_up
    }

    pub fn cue_down(&self) -> bool {
        self.cue_down
    }

    pub fn arrow_direction(&self) -> ArrowDirection {
        self.arrow_direction
    }

    pub fn flanker_congruency(&self) -> FlankerCongruency {
        self.flanker_congruency
    }

    pub fn target_position(&self) -> TargetPosition {
        self.target_position
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }

    pub fn target_stimulus(&self) -> TargetStimulus {
        TargetStimulus::select(self.arrow_direction, self.flanker_congruency)
    }

    pub fn cue_validity(&self) -> CueValidity {
        match (self.cue_up, self.cue_down) {
            (false, false) => CueValidity::Neutral,
            (true, true) => CueValidity::Double,
            (true, false) if self.target_position == TargetPosition::Up => CueValidity::Valid,
            (false, true) if self.target_position == TargetPosition::Down => CueValidity::Valid,
            _ => CueValidity::Invalid,
        }
    }
}

fn check_passthrough_name(name: &str) -> Result<(), ConfigurationError> {
    if KNOWN_FIELDS.contains(&name) || name == RESPONSE_KEY || name == REACTION_TIME {
        return Err(ConfigurationError::ReservedField {
            field: name.to_string(),
        });
    }
    Ok(())
}

fn flag(fields: &Map<String, Value>, field: &'static str) -> Result<bool, ConfigurationError> {
    let unknown = |value: String| ConfigurationError::UnknownValue { field, value };
    match fields.get(field) {
        None | Some(Value::Null) => Err(ConfigurationError::MissingField { field }),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(unknown(n.to_string())),
        },
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(unknown(s.clone())),
        },
        Some(_) => Err(ConfigurationError::WrongType {
            field,
            expected: "a boolean or 0/1",
        }),
    }
}

fn label<T>(
    fields: &Map<String, Value>,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<T, ConfigurationError> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ConfigurationError::MissingField { field }),
        Some(Value::String(s)) => parse(s).ok_or_else(|| ConfigurationError::UnknownValue {
            field,
            value: s.clone(),
        }),
        Some(_) => Err(ConfigurationError::WrongType {
            field,
            expected: "a string",
        }),
    }
}

/// One completed trial: the spec columns followed by the response columns.
/// Built once at the end of a trial and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    #[serde(flatten)]
    trial: TrialSpec,
    response_key: Option<KeyId>,
    #[serde(serialize_with = "as_millis")]
    reaction_time: Option<Duration>,
}

impl ResultRecord {
    pub fn new(trial: TrialSpec, response_key: Option<KeyId>, reaction_time: Option<Duration>) -> Self {
        Self {
            trial,
            response_key,
            reaction_time,
        }
    }

    pub fn trial(&self) -> &TrialSpec {
        &self.trial
    }

    pub fn response_key(&self) -> Option<KeyId> {
        self.response_key
    }

    /// Measured from target onset.
    pub fn reaction_time(&self) -> Option<Duration> {
        self.reaction_time
    }

    /// The record as an ordered column map, the shape every sink writes.
    pub fn to_row(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            _ => Ok(Map::new()),
        }
    }
}

fn as_millis<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => s.serialize_some(&(d.as_nanos() as f64 / 1e6)),
        None => s.serialize_none(),
    }
}
