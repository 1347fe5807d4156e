use clap::Parser;
use error_stack::{Result, ResultExt};

use quill::config::Server as Config;

use super::CliError;

#[derive(Debug, Parser)]
pub struct MigrateCommand {}

pub fn run(_args: MigrateCommand) -> Result<(), CliError> {
    let config = Config::load().change_context(CliError)?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .change_context(CliError)?
        .block_on(async move {
            let app = quill::App::new(config).await.change_context(CliError)?;
            app.primary_db.migrate().await.change_context(CliError)?;
            println!("migrations applied");
            Ok(())
        })
}
