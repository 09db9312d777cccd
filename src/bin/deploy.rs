//! Packs the static site and ships it to the web servers.

use clap::{Parser, Subcommand};
use hbnb::infra::config::{DeployConfig, DEFAULT_DEPLOY_KEY_FILE, DEFAULT_DEPLOY_USER};
use hbnb::infra::deploy::{self, SshShell};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploy", version, about = "Pack, deploy and clean web_static releases")]
struct Cli {
    /// Comma-separated web servers
    #[arg(long, env = "DEPLOY_HOSTS", global = true)]
    hosts: Option<String>,

    /// SSH user
    #[arg(long, env = "DEPLOY_USER", default_value = DEFAULT_DEPLOY_USER, global = true)]
    user: String,

    /// SSH private key
    #[arg(long, env = "DEPLOY_KEY_FILE", default_value = DEFAULT_DEPLOY_KEY_FILE, global = true)]
    key_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive the static site into the versions directory
    Pack {
        #[arg(long, default_value = "web_static")]
        source: PathBuf,
        #[arg(long, default_value = "versions")]
        versions: PathBuf,
    },
    /// Install an existing archive on every server
    DeployArchive {
        archive: PathBuf,
    },
    /// Pack, then deploy the new archive
    Deploy {
        #[arg(long, default_value = "web_static")]
        source: PathBuf,
        #[arg(long, default_value = "versions")]
        versions: PathBuf,
    },
    /// Keep only the newest archives and releases
    Clean {
        /// How many to keep; 0 keeps one
        #[arg(long, default_value_t = 0)]
        number: usize,
        #[arg(long, default_value = "versions")]
        versions: PathBuf,
    },
}

impl Cli {
    fn deploy_config(&self) -> anyhow::Result<DeployConfig> {
        let hosts = self.hosts.as_deref().unwrap_or_default();
        Ok(DeployConfig::new(hosts, &self.user, &self.key_file)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    hbnb::init_tracing();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Pack { source, versions } => {
            let archive = deploy::pack(source, versions).await?;
            println!("{}", archive.display());
        }
        Commands::DeployArchive { archive } => {
            let config = cli.deploy_config()?;
            let shell = SshShell::new(&config);
            deploy::deploy_archive(&shell, &config.hosts, archive).await?;
            println!("New version deployed!");
        }
        Commands::Deploy { source, versions } => {
            let config = cli.deploy_config()?;
            let shell = SshShell::new(&config);
            let archive = deploy::deploy(&shell, &config.hosts, source, versions).await?;
            println!("New version deployed: {}", archive.display());
        }
        Commands::Clean { number, versions } => {
            let config = cli.deploy_config()?;
            let shell = SshShell::new(&config);
            deploy::clean(&shell, &config.hosts, versions, *number).await?;
        }
    }

    Ok(())
}
