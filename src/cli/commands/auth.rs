use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::utils::{output_success, output_value};
use crate::cli::{Context, OutputFormat};
use crate::hydration::HydrationState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with an email or phone number")]
    Signin {
        #[arg(help = "Email or phone number")]
        identifier: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Create an account, then sign in if no token was returned")]
    Signup {
        #[arg(help = "Full name")]
        name: String,
        #[arg(long, help = "Work email")]
        email: Option<String>,
        #[arg(long, help = "Phone number")]
        phone: Option<String>,
        #[arg(long, help = "Password")]
        password: String,
        #[arg(long, help = "Invite token from an invitation link")]
        invite: Option<String>,
    },

    #[command(about = "Sign out (always clears the local session)")]
    Signout,

    #[command(about = "Show who the backend says is signed in")]
    Whoami,

    #[command(about = "Show the local session and hydration state")]
    Status,
}

pub async fn handle(
    cmd: AuthCommands,
    ctx: &Context,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Signin {
            identifier,
            password,
        } => {
            let outcome = ctx
                .auth
                .signin(json!({ "identifier": identifier, "password": password }))
                .await?;
            output_success(
                output_format,
                &format!("Signed in as {}", identifier),
                Some(json!({ "user": outcome.user, "org": outcome.org })),
            )
        }
        AuthCommands::Signup {
            name,
            email,
            phone,
            password,
            invite,
        } => {
            let body = signup_body(&name, email.as_deref(), phone.as_deref(), &password, invite)?;
            let identifier = email.or(phone).unwrap_or_default();
            let outcome = ctx.auth.signup(body).await?;
            if outcome.token.is_none() {
                ctx.auth
                    .signin(json!({ "identifier": identifier, "password": password }))
                    .await?;
            }
            output_success(
                output_format,
                &format!("Account created for {}", name),
                Some(json!({ "user": outcome.user, "org": outcome.org })),
            )
        }
        AuthCommands::Signout => {
            ctx.auth.signout().await;
            output_success(output_format, "Signed out", None)
        }
        AuthCommands::Whoami => {
            ctx.require_auth().await?;
            match ctx.hydration.identity() {
                Some(identity) => output_value(output_format, &serde_json::to_value(identity)?),
                None => Err(anyhow::anyhow!("Not signed in")),
            }
        }
        AuthCommands::Status => {
            let state = ctx.hydration.hydrate().await;
            let session = ctx.client.store().get();
            output_success(
                output_format,
                &match state {
                    HydrationState::Authenticated => "Authenticated".to_string(),
                    _ => "Not signed in".to_string(),
                },
                Some(json!({
                    "state": state,
                    "mode": session.mode,
                    "tenant_id": session.tenant_id,
                    "store": ctx.client.store().location(),
                })),
            )
        }
    }
}

fn signup_body(
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    password: &str,
    invite: Option<String>,
) -> anyhow::Result<Value> {
    if name.trim().is_empty() {
        return Err(anyhow::anyhow!("Please enter your full name"));
    }
    if email.is_none() && phone.is_none() {
        return Err(anyhow::anyhow!("Enter a work email or phone number"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(anyhow::anyhow!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }

    let mut body = Map::new();
    body.insert("name".into(), json!(name.trim()));
    body.insert("password".into(), json!(password));
    if let Some(email) = email {
        body.insert("email".into(), json!(email));
    }
    if let Some(phone) = phone {
        body.insert("phone".into(), json!(phone));
    }
    if let Some(invite) = invite {
        body.insert("inviteToken".into(), json!(invite));
    }
    Ok(Value::Object(body))
}
