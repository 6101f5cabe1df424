mod support;

use antr_core::{
    ArrowDirection, CapabilityError, ConfigurationError, KeyId, ResultRecord, TargetPosition,
    VisualState,
};
use antr_sequencer::{
    JsonLinesSink, ResultSink, Session, SessionConfig, SessionError, SessionSummary,
    factorial_catalog,
};
use antr_timing::{Timer, VirtualTimer};
use rand::rngs::StdRng;
use serde_json::Value;
use support::*;

type TestSession = Session<RecordingDisplay, ScriptedInput, VirtualTimer, StdRng>;

fn session(seed: u64) -> (TestSession, VirtualTimer) {
    let (seq, timer) = sequencer(seed);
    (Session::new(seq, SessionConfig::default()), timer)
}

#[test]
fn start_gate_and_lead_in_come_before_the_first_trial() {
    let (mut session, timer) = session(1);
    let trials = vec![spec(true, false, ArrowDirection::Left, TargetPosition::Up)];
    let mut sink: Vec<ResultRecord> = Vec::new();

    session.run(&trials, &mut sink).unwrap();

    let (mut display, input, _, _) = session.into_sequencer().into_parts();
    assert_eq!(input.calls[0].timeout, None);
    assert_eq!(
        input.calls[0].recognized,
        vec![KeyId::new('t'), KeyId::SPACE]
    );
    assert_eq!(timer.sleeps()[0], ms(1000));
    // Lead-in fixation, then the six trial frames.
    assert_eq!(display.states.len(), 7);
    assert_eq!(display.states.remove(0), VisualState::NEUTRAL);
}

#[test]
fn records_reach_the_sink_in_trial_order() {
    let (mut session, _) = session(2);
    let trials = factorial_catalog(1);
    let mut sink: Vec<ResultRecord> = Vec::new();

    let summary = session.run(&trials, &mut sink).unwrap();

    assert_eq!(summary.trials, 32);
    assert_eq!(summary.responses, 0);
    assert_eq!(sink.len(), 32);
    for (record, spec) in sink.iter().zip(&trials) {
        assert_eq!(record.trial(), spec);
    }
    assert_eq!(session.records(), sink.as_slice());
}

#[test]
fn summary_counts_correct_responses() {
    let (mut seq, _) = sequencer(3);
    // Start key, then left-correct, right-wrong, silence.
    seq.input_mut()
        .press('t', 0)
        .press('f', 300)
        .press('f', 310)
        .silence();
    let mut session = Session::new(seq, SessionConfig::default());
    let trials = vec![
        spec(false, false, ArrowDirection::Left, TargetPosition::Up),
        spec(false, false, ArrowDirection::Right, TargetPosition::Up),
        spec(false, false, ArrowDirection::Right, TargetPosition::Down),
    ];

    let summary = session.run(&trials, &mut Vec::<ResultRecord>::new()).unwrap();

    assert_eq!(
        summary,
        SessionSummary {
            trials: 3,
            responses: 2,
            correct: 1,
        }
    );
}

#[test]
fn empty_trial_list_never_touches_the_devices() {
    let (mut session, timer) = session(4);
    let err = session.run(&[], &mut Vec::<ResultRecord>::new()).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Configuration(ConfigurationError::EmptyTrialList)
    ));
    assert!(timer.sleeps().is_empty());
    assert_eq!(timer.now(), 0);
}

#[test]
fn capability_failure_stops_without_recording_the_failed_trial() {
    let (mut seq, _) = sequencer(5);
    // Lead-in plus two full trials render fine; the third trial's cue fails.
    seq.display_mut().fail_on = Some(1 + 6 + 6 + 1);
    let mut session = Session::new(seq, SessionConfig::default());
    let trials = factorial_catalog(1);
    let mut sink: Vec<ResultRecord> = Vec::new();

    let err = session.run(&trials, &mut sink).unwrap_err();

    assert!(matches!(
        err,
        SessionError::Capability(CapabilityError::Display(_))
    ));
    assert_eq!(sink.len(), 2);
    assert_eq!(session.records().len(), 2);
}

#[test]
fn jsonl_sink_gets_one_line_per_trial() {
    let (mut seq, _) = sequencer(6);
    seq.input_mut().press(' ', 0).press('j', 275);
    let mut session = Session::new(seq, SessionConfig::default());
    let trials = vec![
        spec(false, true, ArrowDirection::Right, TargetPosition::Down)
            .with_extra("block", Value::from(2))
            .unwrap(),
        spec(true, true, ArrowDirection::Left, TargetPosition::Up)
            .with_extra("block", Value::from(2))
            .unwrap(),
    ];
    let mut sink = JsonLinesSink::new(Vec::new());

    session.run(&trials, &mut sink).unwrap();
    sink.finish().unwrap();

    let text = String::from_utf8(sink.into_inner()).unwrap();
    let rows: Vec<Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["response_key"], "j");
    assert_eq!(rows[0]["reaction_time"], 475.0);
    assert_eq!(rows[0]["block"], 2);
    assert_eq!(rows[1]["response_key"], Value::Null);
    assert_eq!(rows[1]["reaction_time"], Value::Null);
}
