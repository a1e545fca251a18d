use clap::Parser;
use profiles_api::cli::Cli;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // The error itself was already reported by `run`
    if let Err(e) = profiles_api::cli::run(cli).await {
        if matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1")) {
            eprintln!("{e:?}");
        }
        std::process::exit(1);
    }
}
