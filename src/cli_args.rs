use clap::Parser;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "commitline",
    version,
    about = "Generate a one-line Git commit message from a diff or change description",
    after_help = "Environment:\n  OPENAI_API_KEY        API key (required)\n  COMMITLINE_PRESET     classic | concise\n  COMMITLINE_VERBOSITY  0-3, log level on stderr\n\nOther settings live in ~/.config/commitline.toml or COMMITLINE_CONFIG."
)]
pub struct Cli {
    /// Diff or change description to summarize
    pub prompt: String,
}
