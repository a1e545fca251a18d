pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "profiles")]
#[command(about = "Profiles API admin CLI - schema and account management")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, conflicts_with = "json", help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create a user account")]
    CreateUser {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Plaintext password (hashed before storage)")]
        password: String,
        #[arg(long, help = "Mark the account as staff")]
        staff: bool,
    },

    #[command(about = "Block login and token use for a user")]
    DeactivateUser {
        #[arg(long, help = "Login email")]
        email: String,
    },

    #[command(about = "Restore login and token use for a user")]
    ActivateUser {
        #[arg(long, help = "Login email")]
        email: String,
    },

    #[command(about = "Issue a new auth token for an existing user")]
    IssueToken {
        #[arg(long, help = "Login email")]
        email: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    /// `--text` wins; JSON only when asked for
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json && !cli.text {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Run a command. Failures are reported once, in the selected format, and
/// then returned so the binary can set the exit status.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&output_format).await,
        Commands::CreateUser {
            email,
            name,
            password,
            staff,
        } => commands::user::create_user(email, name, password, staff, &output_format).await,
        Commands::DeactivateUser { email } => commands::user::set_active(email, false, &output_format).await,
        Commands::ActivateUser { email } => commands::user::set_active(email, true, &output_format).await,
        Commands::IssueToken { email } => commands::user::issue_token(email, &output_format).await,
    };

    if let Err(e) = &result {
        utils::output_error(&output_format, &e.to_string(), utils::error_code(e))?;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn output_format_follows_flags() {
        let cli = parse(&["profiles", "migrate"]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));

        let cli = parse(&["profiles", "--json", "migrate"]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));

        let cli = parse(&["profiles", "migrate", "--text"]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Text));
    }

    #[test]
    fn text_and_json_conflict() {
        assert!(Cli::try_parse_from(["profiles", "--json", "--text", "migrate"]).is_err());
    }

    #[test]
    fn parses_account_commands() {
        let cli = parse(&["profiles", "deactivate-user", "--email", "ada@example.com"]);
        assert!(matches!(cli.command, Commands::DeactivateUser { ref email } if email == "ada@example.com"));

        let cli = parse(&[
            "profiles", "create-user", "--email", "ada@example.com", "--name", "Ada", "--password", "pw", "--staff",
        ]);
        assert!(matches!(cli.command, Commands::CreateUser { staff: true, .. }));
    }
}
