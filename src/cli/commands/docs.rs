use std::path::PathBuf;

use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand)]
pub enum DocsCommands {
    #[command(about = "Upload a file as a document")]
    Upload {
        #[arg(help = "Path of the file to upload")]
        path: PathBuf,
    },

    #[command(about = "Download a document")]
    Download {
        #[arg(help = "Document ID")]
        id: String,
        #[arg(help = "Where to write the file")]
        output: PathBuf,
    },
}

pub async fn handle(
    cmd: DocsCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.require_auth().await?;
    let docs = ctx.console.documents();

    match cmd {
        DocsCommands::Upload { path } => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", path.display()))?
                .to_string();
            let bytes = tokio::fs::read(&path).await?;
            let created = docs.upload(&file_name, bytes).await?;
            output_success(
                output_format,
                &format!("Uploaded {}", file_name),
                Some(json!({ "document": created })),
            )
        }
        DocsCommands::Download { id, output } => {
            let bytes = docs.download(&id).await?;
            tokio::fs::write(&output, &bytes).await?;
            output_success(
                output_format,
                &format!("Saved {} bytes to {}", bytes.len(), output.display()),
                Some(json!({ "bytes": bytes.len(), "path": output.display().to_string() })),
            )
        }
    }
}
