//! UrbanPlan CLI - sessions, screen access and analyses from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the identity is kept in ~/.urbanplan/identity.json)
//! up-cli session login -e analista@florianopolis.gov -p secret
//!
//! # Switch to a demo role (requires ADMIN_DEMO_MODE=true)
//! up-cli session demo administrator
//!
//! # Who is signed in, and may they open a screen?
//! up-cli session whoami
//! up-cli access analysts
//!
//! # Check the navigation registry
//! up-cli screens validate
//!
//! # Run an analysis end to end
//! up-cli analyze --protocol 2024-00150 --address "Rua das Flores, 123" \
//!     --document site-plan --document measurement-sheet
//! ```
//!
//! # Commands
//!
//! - `session` - Login, demo role switch, whoami, logout
//! - `access` - Check whether the signed-in identity may open a screen
//! - `screens` - List screens or validate the registry
//! - `analyze` - Drive one analysis workflow to completion

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "up-cli")]
#[command(author, version, about = "UrbanPlan CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in identity
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Check whether the signed-in identity may open a screen
    Access {
        /// Screen name (e.g. `projects`, `new-analysis`)
        screen: String,
    },
    /// Inspect the navigation registry
    Screens {
        #[command(subcommand)]
        action: ScreensAction,
    },
    /// Run one analysis from intake to conclusion
    Analyze {
        /// Project protocol number
        #[arg(long)]
        protocol: String,

        /// Project address
        #[arg(long)]
        address: String,

        /// Document category to add (repeatable)
        #[arg(short, long = "document")]
        documents: Vec<String>,

        /// Make the scripted analysis fail with this reason
        #[arg(long)]
        fail: Option<String>,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        /// Password (or set `URBANPLAN_PASSWORD`)
        #[arg(short, long, env = "URBANPLAN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Switch to the demo account of a role
    Demo {
        /// `platform_operator`, `administrator` or `analyst`
        role: String,
    },
    /// Show the signed-in identity
    Whoami,
    /// Sign out
    Logout,
}

#[derive(Subcommand)]
enum ScreensAction {
    /// List screens visible to the signed-in identity
    List,
    /// Report screens no role can open
    Validate,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Session { action } => match action {
            SessionAction::Login { email, password } => {
                commands::session::login(&email, password).await?;
            }
            SessionAction::Demo { role } => {
                commands::session::demo(&role).await?;
            }
            SessionAction::Whoami => {
                commands::session::whoami().await?;
            }
            SessionAction::Logout => commands::session::logout().await?,
        },
        Commands::Access { screen } => commands::screens::access(&screen).await?,
        Commands::Screens { action } => match action {
            ScreensAction::List => commands::screens::list().await?,
            ScreensAction::Validate => commands::screens::validate()?,
        },
        Commands::Analyze {
            protocol,
            address,
            documents,
            fail,
        } => {
            commands::analyze::run(&protocol, &address, &documents, fail).await?;
        }
    }
    Ok(())
}
