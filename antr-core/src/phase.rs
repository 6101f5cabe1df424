/// The fixed per-trial timeline. Every trial walks these in order, once.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TrialPhase {
    #[default]
    Baseline,
    Cue,
    CueTargetGap,
    Target,
    PostTargetBlank,
    ResponseWindow,
    Feedback,
}

impl TrialPhase {
    pub const ALL: [TrialPhase; 7] = [
        TrialPhase::Baseline,
        TrialPhase::Cue,
        TrialPhase::CueTargetGap,
        TrialPhase::Target,
        TrialPhase::PostTargetBlank,
        TrialPhase::ResponseWindow,
        TrialPhase::Feedback,
    ];

    pub fn allows_input(&self) -> bool {
        matches!(self, Self::ResponseWindow)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Cue => "cue",
            Self::CueTargetGap => "cue_target_gap",
            Self::Target => "target",
            Self::PostTargetBlank => "post_target_blank",
            Self::ResponseWindow => "response_window",
            Self::Feedback => "feedback",
        }
    }
}
