use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_records, output_success, output_value, parse_filter, read_stdin_json};
use crate::cli::{Context, OutputFormat};
use crate::resources::{self, ResourceApi, CRUD_RESOURCES};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records with optional query filter")]
    List {
        #[arg(help = "Resource name (leads, contacts, deals, ...)")]
        resource: String,
        #[arg(long, help = "JSON object of query parameters")]
        filter: Option<String>,
        #[arg(long, help = "Print the payload as returned instead of a record list")]
        raw: bool,
    },

    #[command(about = "Get one record")]
    Get {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID")]
        id: String,
    },

    #[command(about = "Create record from stdin")]
    Create {
        #[arg(help = "Resource name")]
        resource: String,
    },

    #[command(about = "Update record from stdin")]
    Update {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to update")]
        id: String,
    },

    #[command(about = "Delete record")]
    Delete {
        #[arg(help = "Resource name")]
        resource: String,
        #[arg(help = "Record ID to delete")]
        id: String,
    },
}

pub async fn handle(
    cmd: DataCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.require_auth().await?;

    match cmd {
        DataCommands::List {
            resource,
            filter,
            raw,
        } => {
            let api = resource_api(ctx, &resource)?;
            let query = parse_filter(filter.as_deref())?;
            if raw {
                output_value(output_format, &api.list_raw(query).await?)
            } else {
                output_records(output_format, &resource, api.list(query).await?)
            }
        }
        DataCommands::Get { resource, id } => {
            let record = resource_api(ctx, &resource)?.get(&id).await?;
            output_value(output_format, &record)
        }
        DataCommands::Create { resource } => {
            let api = resource_api(ctx, &resource)?;
            let body = read_stdin_json()?;
            let created = api.create(body).await?;
            output_success(
                output_format,
                &format!("Created {} record", resource),
                Some(json!({ "record": created })),
            )
        }
        DataCommands::Update { resource, id } => {
            let api = resource_api(ctx, &resource)?;
            let body = read_stdin_json()?;
            let updated = api.update(&id, body).await?;
            output_success(
                output_format,
                &format!("Updated {} record {}", resource, id),
                Some(json!({ "record": updated })),
            )
        }
        DataCommands::Delete { resource, id } => {
            resource_api(ctx, &resource)?.remove(&id).await?;
            output_success(
                output_format,
                &format!("Deleted {} record {}", resource, id),
                None,
            )
        }
    }
}

fn resource_api(ctx: &Context, name: &str) -> anyhow::Result<ResourceApi> {
    match resources::lookup(name) {
        Some(config) => Ok(ctx.console.resource(config)),
        None => Err(anyhow::anyhow!(
            "Unknown resource '{}' (expected one of: {})",
            name,
            CRUD_RESOURCES.join(", ")
        )),
    }
}
