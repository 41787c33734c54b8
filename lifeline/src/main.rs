//! lifeline: command-line front end for the crisis detection engine
//!
//! Persists plans and logs as JSON files under the data directory and
//! opens platform actions in dry-run mode.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use lifeline::{
    CrisisService, Demographics, DryRunInvoker, EngineConfig, FileStore, SafetyPlanUpdate,
    UserProfile,
};

#[derive(Parser)]
#[command(name = "lifeline")]
#[command(about = "Crisis-risk detection and intervention engine")]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory for plans and logs
    #[arg(short, long, env = "LIFELINE_DATA_DIR", default_value = ".lifeline")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze text and print the assessment and intervention
    Analyze {
        /// Text to analyze
        text: String,

        /// User id recorded with the crisis event
        #[arg(long)]
        user: Option<String>,

        /// User age, for resource ranking
        #[arg(long)]
        age: Option<u32>,

        /// Prefer LGBTQ+ youth resources
        #[arg(long)]
        lgbtq: bool,

        /// Prefer veteran resources
        #[arg(long)]
        veteran: bool,
    },
    /// Print statistics over the crisis logs
    Stats,
    /// Safety plan operations
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// Configuration operations
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Print the stored safety plan
    Show,
    /// Append a warning sign
    AddWarningSign { text: String },
    /// Append a coping strategy
    AddCopingStrategy { text: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration as YAML
    Dump,
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lifeline=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "Loading config");
            EngineConfig::from_file(path)?
        }
        None => EngineConfig::default(),
    };

    if let Command::Config {
        command: ConfigCommand::Dump,
    } = &cli.command
    {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let store = Arc::new(FileStore::new(cli.data_dir.clone()));
    let service = CrisisService::new(config, store, Arc::new(DryRunInvoker::new()))?;

    match cli.command {
        Command::Analyze {
            text,
            user,
            age,
            lgbtq,
            veteran,
        } => {
            let mut profile = UserProfile::default().with_demographics(Demographics {
                age,
                lgbtq,
                veteran,
            });
            profile.user_id = user;

            let assessment = service.analyze(&text);
            let intervention = service.handle_crisis_logged(&assessment, &profile).await;
            print_json(&serde_json::json!({
                "assessment": assessment,
                "intervention": intervention,
            }))?;
        }
        Command::Stats => {
            print_json(&service.crisis_statistics().await)?;
        }
        Command::Plan { command } => match command {
            PlanCommand::Show => match service.safety_plans().load().await? {
                Some(plan) => print_json(&plan)?,
                None => println!("No safety plan"),
            },
            PlanCommand::AddWarningSign { text } => {
                let plans = service.safety_plans();
                let mut signs = plans
                    .load()
                    .await?
                    .map(|plan| plan.warning_signs)
                    .unwrap_or_default();
                signs.push(text);
                let plan = plans
                    .try_update(SafetyPlanUpdate {
                        warning_signs: Some(signs),
                        ..Default::default()
                    })
                    .await?;
                print_json(&plan)?;
            }
            PlanCommand::AddCopingStrategy { text } => {
                let plans = service.safety_plans();
                let mut strategies = plans
                    .load()
                    .await?
                    .map(|plan| plan.coping_strategies)
                    .unwrap_or_default();
                strategies.push(text);
                let plan = plans
                    .try_update(SafetyPlanUpdate {
                        coping_strategies: Some(strategies),
                        ..Default::default()
                    })
                    .await?;
                print_json(&plan)?;
            }
        },
        Command::Config { .. } => {}
    }

    Ok(())
}
