use anyhow::Result;
use clap::Parser;
use nenkin::api::{Cli, Command, run_calc, run_http_server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Calc(args) => {
            let report = run_calc(args)?;
            println!("{}", report.trim_end());
        }
        Command::Serve(args) => run_http_server(args.host, args.port).await?,
    }
    Ok(())
}
