//! Server CLI command handler

use crate::cli::commands::ServeArgs;
use crate::core::config::Config;
use crate::error::Result;
use crate::server;

/// Handle `vibes serve`: command-line flags win over the config file
pub async fn handle_serve(config: &Config, args: ServeArgs) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(bind) = args.bind {
        server_config.bind = bind;
    }
    server_config.canned_oracle |= args.canned;
    server_config.single_user |= args.single_user;

    println!("vibes server listening on http://{}", server_config.bind);
    server::serve(&server_config).await
}
