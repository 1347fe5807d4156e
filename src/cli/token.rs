use clap::Parser;
use error_stack::{Result, ResultExt};

use quill::config::Server as Config;
use quill::http::Jwt;
use quill::types::id::UserId;

use super::CliError;

/// Stand-in for the external auth collaborator: signs a bearer
/// token for an already-provisioned user id.
#[derive(Debug, Parser)]
pub struct TokenCommand {
    /// Id of the user the token should authenticate as
    pub user_id: u64,
}

pub fn run(args: TokenCommand) -> Result<(), CliError> {
    let config = Config::load().change_context(CliError)?;

    let user_id = UserId::new_checked(args.user_id)
        .ok_or_else(|| error_stack::Report::new(CliError))
        .attach_printable("user id must be a positive integer")?;

    let token = Jwt::encode(user_id, config.jwt_secret.as_str()).change_context(CliError)?;
    println!("{token}");
    Ok(())
}
