use blogsite_schema::app::{config::Config, AppError};
use blogsite_schema::database::db_utils::{build_pool, run_migrations, DbConn};
use log::{error, info};

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let pool = build_pool(&config)?;

    let conn: DbConn = pool.get()?;
    run_migrations(&conn)?;
    info!("schema is up to date at {}", config.database_url);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{}", err);
        std::process::exit(1);
    }
}
