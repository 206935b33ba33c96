pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::auth::AuthApi;
use crate::client::ApiClient;
use crate::config::{config, ClientConfig};
use crate::error::ApiError;
use crate::hydration::{HydrationController, RouteDecision};
use crate::resources::Console;

#[derive(Parser)]
#[command(name = "zura")]
#[command(about = "Zura CLI - Command-line client for the Zura CRM API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign up, sign out and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "CRUD operations on console resources")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "Team member management")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UsersCommands,
    },

    #[command(about = "Deal pipeline views")]
    Deals {
        #[command(subcommand)]
        cmd: commands::deals::DealsCommands,
    },

    #[command(about = "Dashboards and forecasts")]
    Report {
        #[command(subcommand)]
        cmd: commands::report::ReportCommands,
    },

    #[command(about = "Document upload and download")]
    Docs {
        #[command(subcommand)]
        cmd: commands::docs::DocsCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs, wired around one shared client.
#[derive(Clone)]
pub struct Context {
    pub client: ApiClient,
    pub auth: AuthApi,
    pub hydration: HydrationController,
    pub console: Console,
}

impl Context {
    pub fn new(client: ApiClient) -> Self {
        let auth = AuthApi::new(client.clone());
        Self {
            hydration: HydrationController::new(auth.clone()),
            console: Console::new(client.clone()),
            auth,
            client,
        }
    }

    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        Ok(Self::new(ApiClient::from_config(config)?))
    }

    /// Gate for commands that need a signed-in session.
    pub async fn require_auth(&self) -> anyhow::Result<()> {
        match self.hydration.require_auth().await {
            RouteDecision::Render => Ok(()),
            RouteDecision::Redirect(_) => Err(anyhow::anyhow!(
                "Not signed in. Run `zura auth signin` first"
            )),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = Context::from_config(config().clone())?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, &output_format).await,
        Commands::Data { cmd } => commands::data::handle(cmd, &ctx, &output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, &ctx, &output_format).await,
        Commands::Deals { cmd } => commands::deals::handle(cmd, &ctx, &output_format).await,
        Commands::Report { cmd } => commands::report::handle(cmd, &ctx, &output_format).await,
        Commands::Docs { cmd } => commands::docs::handle(cmd, &ctx, &output_format).await,
    };

    if let Err(e) = &result {
        if let Some(api_error) = e.downcast_ref::<ApiError>() {
            utils::output_error(&output_format, api_error)?;
        }
    }
    result
}
