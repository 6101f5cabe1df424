use serde::{Deserialize, Serialize};

/// Stimuli held in a preloaded catalog, addressed by a dense index.
pub trait Stimulus: Copy + Clone + Send + Sync + std::fmt::Debug {
    /// Number of distinct values, i.e. the catalog length.
    const COUNT: usize;
    fn cache_id(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    Left,
    Right,
}

impl ArrowDirection {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Left => '<',
            Self::Right => '>',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlankerCongruency {
    Congruent,
    Incongruent,
}

impl FlankerCongruency {
    /// Accepts the short `cong`/`incong` spellings used by older trial lists.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "congruent" | "cong" => Some(Self::Congruent),
            "incongruent" | "incong" => Some(Self::Incongruent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPosition {
    Up,
    Down,
}

impl TargetPosition {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixationColor {
    #[default]
    Neutral,
    Positive,
    Negative,
}

impl Stimulus for FixationColor {
    const COUNT: usize = 3;

    fn cache_id(&self) -> usize {
        match self {
            Self::Neutral => 0,
            Self::Positive => 1,
            Self::Negative => 2,
        }
    }
}

/// Which placeholder frames are highlighted during the cue phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CueFrames {
    Top,
    Bottom,
    Both,
}

/// The four flanker rows, e.g. `> > < > >` is an incongruent left target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetStimulus {
    CongruentLeft,
    CongruentRight,
    IncongruentLeft,
    IncongruentRight,
}

/// Indexed by `[ArrowDirection as usize][FlankerCongruency as usize]`.
const TARGET_TABLE: [[TargetStimulus; 2]; 2] = [
    [TargetStimulus::CongruentLeft, TargetStimulus::IncongruentLeft],
    [TargetStimulus::CongruentRight, TargetStimulus::IncongruentRight],
];

impl TargetStimulus {
    pub const ALL: [TargetStimulus; 4] = [
        TargetStimulus::CongruentLeft,
        TargetStimulus::CongruentRight,
        TargetStimulus::IncongruentLeft,
        TargetStimulus::IncongruentRight,
    ];

    pub fn select(direction: ArrowDirection, congruency: FlankerCongruency) -> Self {
        TARGET_TABLE[direction as usize][congruency as usize]
    }

    pub fn direction(&self) -> ArrowDirection {
        match self {
            Self::CongruentLeft | Self::IncongruentLeft => ArrowDirection::Left,
            Self::CongruentRight | Self::IncongruentRight => ArrowDirection::Right,
        }
    }

    pub fn congruency(&self) -> FlankerCongruency {
        match self {
            Self::CongruentLeft | Self::CongruentRight => FlankerCongruency::Congruent,
            Self::IncongruentLeft | Self::IncongruentRight => FlankerCongruency::Incongruent,
        }
    }

    /// Five arrows, centre one at index 2.
    pub fn arrows(&self) -> [ArrowDirection; 5] {
        let center = self.direction();
        let flank = match self.congruency() {
            FlankerCongruency::Congruent => center,
            FlankerCongruency::Incongruent => center.opposite(),
        };
        [flank, flank, center, flank, flank]
    }

    pub fn text(&self) -> String {
        self.arrows()
            .iter()
            .map(|a| a.glyph().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Stimulus for TargetStimulus {
    const COUNT: usize = 4;

    fn cache_id(&self) -> usize {
        match self {
            Self::CongruentLeft => 0,
            Self::CongruentRight => 1,
            Self::IncongruentLeft => 2,
            Self::IncongruentRight => 3,
        }
    }
}

/// Everything the display can be asked to show. Each value is one committed
/// frame: the fixation cross, both placeholder frames, and at most one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    Fixation(FixationColor),
    Cue(CueFrames),
    Target {
        stimulus: TargetStimulus,
        position: TargetPosition,
    },
}

/// Indexed by `[cue_up as usize][cue_down as usize]`.
const CUE_TABLE: [[VisualState; 2]; 2] = [
    [
        VisualState::Fixation(FixationColor::Neutral),
        VisualState::Cue(CueFrames::Bottom),
    ],
    [
        VisualState::Cue(CueFrames::Top),
        VisualState::Cue(CueFrames::Both),
    ],
];

impl VisualState {
    pub const NEUTRAL: VisualState = VisualState::Fixation(FixationColor::Neutral);

    /// The cue-phase frame for a pair of cue flags. No flags is a neutral cue,
    /// which shows the plain fixation screen.
    pub fn cue(cue_up: bool, cue_down: bool) -> Self {
        CUE_TABLE[cue_up as usize][cue_down as usize]
    }

    pub fn cross_color(&self) -> FixationColor {
        match self {
            Self::Fixation(color) => *color,
            Self::Cue(_) | Self::Target { .. } => FixationColor::Neutral,
        }
    }

    pub fn top_cued(&self) -> bool {
        matches!(self, Self::Cue(CueFrames::Top | CueFrames::Both))
    }

    pub fn bottom_cued(&self) -> bool {
        matches!(self, Self::Cue(CueFrames::Bottom | CueFrames::Both))
    }

    pub fn target(&self) -> Option<(TargetStimulus, TargetPosition)> {
        match self {
            Self::Target { stimulus, position } => Some((*stimulus, *position)),
            _ => None,
        }
    }
}
