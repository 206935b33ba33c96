use clap::Subcommand;

use crate::cli::utils::{output_value, parse_filter};
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand)]
pub enum DealsCommands {
    #[command(about = "Show pipeline stage definitions")]
    Stages,

    #[command(about = "Show the kanban board")]
    Kanban {
        #[arg(long, help = "JSON object of extra query parameters")]
        filter: Option<String>,
    },
}

pub async fn handle(
    cmd: DealsCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.require_auth().await?;
    let deals = ctx.console.deals();

    match cmd {
        DealsCommands::Stages => output_value(output_format, &deals.stages().await?),
        DealsCommands::Kanban { filter } => {
            let query = parse_filter(filter.as_deref())?;
            output_value(output_format, &deals.by_kanban(query).await?)
        }
    }
}
