pub mod capability;
pub mod error;
pub mod phase;
pub mod response;
pub mod stimulus;
pub mod trial;

pub use capability::{DisplaySurface, InputChannel};
pub use error::{CapabilityError, ConfigurationError};
pub use phase::TrialPhase;
pub use response::{Classification, KeyBindings, KeyId, ResponseOutcome};
pub use stimulus::{
    ArrowDirection, CueFrames, FixationColor, FlankerCongruency, Stimulus, TargetPosition,
    TargetStimulus, VisualState,
};
pub use trial::{CueValidity, ResultRecord, TrialSpec};
