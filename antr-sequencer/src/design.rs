use crate::error::SessionError;
use antr_core::{
    ArrowDirection, ConfigurationError, FlankerCongruency, TargetPosition, TrialSpec,
};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// `(cue_up, cue_down)` for none, up, down and both.
const CUE_CONDITIONS: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

/// Every combination of cue condition, direction, congruency and position,
/// `repetitions` times over. 32 trials per repetition.
pub fn factorial_catalog(repetitions: usize) -> Vec<TrialSpec> {
    let mut trials = Vec::with_capacity(repetitions * 32);
    for _ in 0..repetitions {
        for (cue_up, cue_down) in CUE_CONDITIONS {
            for direction in [ArrowDirection::Left, ArrowDirection::Right] {
                for congruency in [FlankerCongruency::Congruent, FlankerCongruency::Incongruent] {
                    for position in [TargetPosition::Up, TargetPosition::Down] {
                        trials.push(TrialSpec::new(cue_up, cue_down, direction, congruency, position));
                    }
                }
            }
        }
    }
    trials
}

/// Validates every row up front; the first bad row aborts with its index.
/// Every row must carry the same passthrough columns, in the same order, as
/// the first one, so the output has one column layout.
pub fn trials_from_values(rows: &[Value]) -> Result<Vec<TrialSpec>, ConfigurationError> {
    if rows.is_empty() {
        return Err(ConfigurationError::EmptyTrialList);
    }
    let mut trials: Vec<TrialSpec> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let spec = TrialSpec::from_value(row).map_err(|e| e.at_row(i))?;
        if let Some(first) = trials.first() {
            if !first.extra().keys().eq(spec.extra().keys()) {
                return Err(ConfigurationError::ColumnMismatch {
                    expected: first.extra().keys().cloned().collect(),
                    found: spec.extra().keys().cloned().collect(),
                }
                .at_row(i));
            }
        }
        trials.push(spec);
    }
    Ok(trials)
}

/// Reads a JSON array of trial objects.
pub fn load_trial_list(path: &Path) -> Result<Vec<TrialSpec>, SessionError> {
    let text = fs::read_to_string(path)?;
    let rows: Vec<Value> = serde_json::from_str(&text)?;
    Ok(trials_from_values(&rows)?)
}

pub fn shuffle_trials<R: Rng + ?Sized>(trials: &mut [TrialSpec], rng: &mut R) {
    trials.shuffle(rng);
}
