pub mod config;
pub mod design;
pub mod error;
pub mod sequencer;
pub mod session;
pub mod sink;
pub mod trial;

pub use config::{SequencerConfig, SessionConfig, TimingConfig};
pub use design::{factorial_catalog, load_trial_list, shuffle_trials, trials_from_values};
pub use error::SessionError;
pub use sequencer::TrialSequencer;
pub use session::{Session, SessionSummary};
pub use sink::{DelimitedSink, JsonLinesSink, ResultSink};
pub use trial::{TrialDurations, TrialTimestamps, planned_state};
