use database::{DatabaseConnectionInfo, PgDatabase};
use storage::memory::MemoryDatabase;
use web::{config::WebConfig, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = WebConfig::from_env();

    // database
    let result = match DatabaseConnectionInfo::from_env() {
        Some(database_connection_info) => {
            match PgDatabase::connect(database_connection_info).await {
                Ok(database) => start_web_server(config, WebState::new(database)).await,
                Err(why) => {
                    log::error!("could not connect to database: {}", why);
                    std::process::exit(1);
                }
            }
        }
        None => {
            log::warn!(
                "no database connection info in env, keeping data in memory only"
            );
            start_web_server(config, WebState::new(MemoryDatabase::new())).await
        }
    };

    if let Err(why) = result {
        log::error!("web server stopped: {}", why);
        std::process::exit(1);
    }
}
