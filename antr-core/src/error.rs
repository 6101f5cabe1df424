use thiserror::Error;

/// A trial list or configuration that cannot be run.
///
/// Raised while validating inputs, before the first trial starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unrecognized value {value:?} for field `{field}`")]
    UnknownValue { field: &'static str, value: String },

    #[error("missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("column `{field}` is reserved and cannot be passed through")]
    ReservedField { field: String },

    #[error("passthrough columns {found:?} differ from the first row's {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("trial list is empty")]
    EmptyTrialList,

    #[error("trial row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: Box<ConfigurationError>,
    },

    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    #[error("invalid key bindings: {0}")]
    InvalidKeys(String),
}

impl ConfigurationError {
    pub fn at_row(self, row: usize) -> Self {
        ConfigurationError::InvalidRow {
            row,
            source: Box::new(self),
        }
    }
}

/// A display or input collaborator failed mid-trial.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("display failed: {0}")]
    Display(String),

    #[error("input failed: {0}")]
    Input(String),

    #[error("{0} disconnected")]
    Disconnected(&'static str),

    #[error("session interrupted by participant")]
    Interrupted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_wrapper_keeps_the_cause_in_the_message() {
        let err = ConfigurationError::UnknownValue {
            field: "target_position",
            value: "left".into(),
        }
        .at_row(7);
        assert_eq!(
            err.to_string(),
            "trial row 7: unrecognized value \"left\" for field `target_position`"
        );
    }
}
