use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::server;
use crate::settings::Settings;

use super::build_service;

pub async fn run(args: &ServeArgs, mut settings: Settings) -> Result<(), CliError> {
    if let Some(host) = &args.host {
        settings.server.host = host.clone();
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    let service = build_service(&settings)?;
    server::serve(service, &settings).await
}
