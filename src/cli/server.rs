use actix_web::{web, HttpServer};
use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use quill::config::Server as Config;

use super::CliError;

#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: ServerCommand) -> Result<(), CliError> {
    let mut config = Config::load().change_context(CliError)?;
    args.override_config(&mut config);

    init_tracing();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .change_context(CliError)
        .attach_printable("could not build tokio runtime")?
        .block_on(serve(config))
}

async fn serve(config: Config) -> Result<(), CliError> {
    let app = quill::App::new(config).await.change_context(CliError)?;

    let addr = (app.config.ip, app.config.port);
    let workers = app.config.workers;
    tracing::info!("listening on {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        actix_web::App::new()
            .app_data(web::Data::new(app.clone()))
            .wrap(TracingLogger::default())
            .configure(quill::http::controllers::configure)
    })
    .workers(workers)
    .bind(addr)
    .change_context(CliError)
    .attach_printable("could not bind to the configured address")?
    .run()
    .await
    .change_context(CliError)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();
}

impl ServerCommand {
    fn override_config(&self, config: &mut Config) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = workers.get();
        }
    }
}
