//! Drives a LabOS session from the command line.
//!
//! ```text
//! LABOS_STORAGE_PATH=/tmp/labos.json \
//! LABOS_EMAIL=ada@labos.dev LABOS_PASSWORD=... \
//!     cargo run -p session-cli -- [login|status|logout]
//! ```
//!
//! With a storage path set, a second `status` run picks up the token the
//! first `login` left behind.

use clap::{Parser, Subcommand};
use labos::prelude::*;

/// Log in to LabOS, check the stored session, or log out
#[derive(Debug, Parser)]
#[command(name = "session-cli", version, about, long_about = None)]
struct Cli {
    /// API base URL, overriding LABOS_API_BASE_URL
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Re-validate the stored token and print the user
    Status,
    /// Log in with email and password
    Login {
        #[arg(long, env = "LABOS_EMAIL")]
        email: String,
        #[arg(long, env = "LABOS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and forget the stored token
    Logout,
}

fn describe(user: &UserProfile) -> String {
    match &user.user_name {
        Some(name) => format!("{name} ({})", user.id),
        None => user.id.to_string(),
    }
}

impl Cli {
    async fn execute(self) -> Result<(), LabosError> {
        let mut builder = LabosClientBuilder::from_env()?;
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        let mut session = builder.build()?;

        match self.command {
            Command::Status => match session.check_login_status().await {
                Some(user) => println!("logged in as {}", describe(user)),
                None => println!("not logged in"),
            },
            Command::Login { email, password } => {
                let user = session.login(&email, &password).await?;
                println!("logged in as {}", describe(&user));
            }
            Command::Logout => {
                session.logout().await;
                println!("logged out");
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    labos::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
