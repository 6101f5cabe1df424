use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// Runs an attention-network (ANT-R) session: cued flanker trials with
/// millisecond phase timing and per-trial response records.
#[derive(Parser, Debug)]
#[command(name = "ant-v", version, about)]
pub struct Cli {
    /// JSON array of trial rows. Without it a balanced factorial list is generated.
    #[arg(short, long, env = "ANTV_TRIALS")]
    pub trials: Option<PathBuf>,

    /// Copies of the 32-trial factorial design to generate.
    #[arg(short, long, default_value_t = 2, conflicts_with = "trials")]
    pub repetitions: usize,

    /// Short training run: a single factorial repetition.
    #[arg(long, conflicts_with_all = ["trials", "repetitions"])]
    pub training: bool,

    /// Run trials in list order instead of shuffling.
    #[arg(long)]
    pub keep_order: bool,

    /// JSON file with `timing`, `keys` and `session` overrides.
    #[arg(short, long, env = "ANTV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed for shuffling and baseline jitter.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Results file. Defaults to stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Results format.
    #[arg(long, value_enum, default_value = "jsonl")]
    pub format: OutputFormat,

    /// Dry run without a window, answered by a simulated participant.
    #[arg(long)]
    pub headless: bool,

    /// With --headless: run on a virtual clock so the session finishes at once.
    #[arg(long, requires = "headless")]
    pub fast: bool,

    /// Simulated participant: probability of pressing the correct key.
    #[arg(long, default_value_t = 0.9, requires = "headless")]
    pub accuracy: f64,

    /// Simulated participant: probability of not answering at all.
    #[arg(long, default_value_t = 0.05, requires = "headless")]
    pub miss_rate: f64,

    /// Open a 1280x720 window instead of going fullscreen.
    #[arg(long, conflicts_with = "headless")]
    pub windowed: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log as JSON lines on stderr.
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Tsv,
}

impl Cli {
    pub fn repetitions(&self) -> usize {
        if self.training { 1 } else { self.repetitions }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_generate_two_repetitions() {
        let cli = Cli::parse_from(["ant-v"]);
        assert_eq!(cli.repetitions(), 2);
        assert_eq!(cli.format, OutputFormat::Jsonl);
        assert!(!cli.headless);
    }

    #[test]
    fn training_overrides_repetitions() {
        let cli = Cli::parse_from(["ant-v", "--training"]);
        assert_eq!(cli.repetitions(), 1);
    }

    #[test]
    fn fast_requires_headless() {
        assert!(Cli::try_parse_from(["ant-v", "--fast"]).is_err());
        let cli = Cli::parse_from(["ant-v", "--headless", "--fast", "-vv", "--format", "tsv"]);
        assert!(cli.fast);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Tsv);
    }

    #[test]
    fn trial_file_excludes_generated_lists() {
        assert!(Cli::try_parse_from(["ant-v", "--trials", "t.json", "--training"]).is_err());
    }
}
