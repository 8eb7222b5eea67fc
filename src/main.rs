use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use coderr::connector::api::Router;
use coderr::{Commands, Container, ContainerConfig};

#[derive(Parser)]
#[command(name = "coderr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.coderr")]
    data_dir: String,

    /// Keep all data in memory (lost on exit)
    #[arg(long, global = true)]
    memory_storage: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ContainerConfig::new(expand_tilde(&cli.data_dir));
    config.memory_storage = cli.memory_storage;

    let container = Container::new(config).await?;
    let router = Router::new(&container);
    let output = router.route(cli.command).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["coderr", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert_eq!(cli.data_dir, "~/.coderr");
    }

    #[test]
    fn create_admin_requires_password() {
        let res = Cli::try_parse_from(["coderr", "create-admin", "root", "root@example.com"]);
        assert!(res.is_err(), "--password must be required");

        let cli = Cli::try_parse_from([
            "coderr",
            "--memory-storage",
            "create-admin",
            "root",
            "root@example.com",
            "--password",
            "pw",
        ])
        .unwrap();
        assert!(cli.memory_storage);
        assert!(matches!(
            cli.command,
            Commands::CreateAdmin { ref profile_type, .. } if profile_type == "business"
        ));
    }

    #[test]
    fn tilde_is_expanded() {
        std::env::set_var("HOME", "/home/tester");
        assert_eq!(expand_tilde("~/.coderr"), "/home/tester/.coderr");
        assert_eq!(expand_tilde("/var/data"), "/var/data");
    }
}
