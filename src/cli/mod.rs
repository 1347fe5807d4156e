use clap::Parser;
use error_stack::Result;
use thiserror::Error;

mod migrate;
mod server;
mod token;

#[derive(Debug, Error)]
#[error("quill exited with an error")]
pub struct CliError;

/// Command line options for quill.
#[derive(Debug, Parser)]
#[command(about = "Social blogging service", version, author)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args),
            Subcommand::Migrate(args) => self::migrate::run(args),
            Subcommand::Token(args) => self::token::run(args),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Expose the quill HTTP server
    Server(self::server::ServerCommand),
    /// Apply pending database migrations
    Migrate(self::migrate::MigrateCommand),
    /// Mint a bearer token for an existing user id
    Token(self::token::TokenCommand),
}
