use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "groqsh")]
#[command(about = "Groq AI Shell Interface")]
#[command(version)]
pub struct Cli {
    /// Prompt for Groq AI
    #[arg(short, long)]
    pub prompt: String,

    /// Force JSON output
    #[arg(short, long)]
    pub json: bool,

    /// Select Groq model
    #[arg(short, long)]
    pub model: bool,
}
