use alertbridge::{
    cmd::{DryRunArgs, dry_run},
    context::AppContextBuilder,
    supervisor::Supervisor,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true, env = "ALERTBRIDGE_CONFIG_DIR")]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the webhook receiver, heartbeat and garbage collector.
    Run,
    /// Replays a webhook payload without contacting Icinga.
    DryRun(DryRunArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_supervisor(cli.config_dir).await?,
        Commands::DryRun(args) => dry_run::execute(args, cli.config_dir.as_deref()).await?,
    }

    Ok(())
}

async fn run_supervisor(config_dir: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let context = AppContextBuilder::new(config_dir).build().await?;

    let supervisor = Supervisor::builder().config(context.config).store(context.store).build()?;

    tracing::info!("Supervisor initialized, accepting alerts...");
    supervisor.run().await?;

    Ok(())
}
