use clap::Subcommand;

use crate::cli::utils::output_value;
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand)]
pub enum ReportCommands {
    #[command(about = "Dashboard stats for leads, deals or activities")]
    Stats {
        #[arg(help = "Subject (leads, deals, activities)")]
        subject: String,
    },

    #[command(about = "Forecast summary")]
    Forecast,
}

pub async fn handle(
    cmd: ReportCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.require_auth().await?;

    let report = match cmd {
        ReportCommands::Stats { subject } => ctx.console.stats().subject(&subject).await?,
        ReportCommands::Forecast => ctx.console.forecasts().summary().await?,
    };
    output_value(output_format, &report)
}
