use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_records, output_success};
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "List team members")]
    List,

    #[command(about = "Invite a team member by email")]
    Invite {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, default_value = "user", help = "Role for the new member")]
        role: String,
    },

    #[command(about = "Reactivate a suspended member")]
    Activate {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Suspend a member")]
    Suspend {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Change a member's role")]
    Role {
        #[arg(help = "User ID")]
        id: String,
        #[arg(help = "New role")]
        role: String,
    },

    #[command(about = "Remove a member from the organization")]
    Remove {
        #[arg(help = "User ID")]
        id: String,
    },
}

pub async fn handle(
    cmd: UsersCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    ctx.require_auth().await?;
    let users = ctx.console.users();

    match cmd {
        UsersCommands::List => {
            let (_, members) = users.detect_base().await?;
            output_records(output_format, "users", members)
        }
        UsersCommands::Invite { email, role } => {
            let invited = users.invite(&email, &role).await?;
            output_success(
                output_format,
                &format!("Invitation sent to {}", email),
                Some(json!({ "invite": invited })),
            )
        }
        UsersCommands::Activate { id } => {
            users.set_active(&id, true).await?;
            output_success(output_format, &format!("User {} activated", id), None)
        }
        UsersCommands::Suspend { id } => {
            users.set_active(&id, false).await?;
            output_success(output_format, &format!("User {} suspended", id), None)
        }
        UsersCommands::Role { id, role } => {
            users.set_role(&id, &role).await?;
            output_success(
                output_format,
                &format!("User {} is now {}", id, role),
                Some(json!({ "role": role })),
            )
        }
        UsersCommands::Remove { id } => {
            users.remove(&id).await?;
            output_success(output_format, &format!("User {} removed", id), None)
        }
    }
}
