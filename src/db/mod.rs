use diesel::pg::PgConnection;
use failure::err_msg;
use r2d2_diesel::ConnectionManager;
use std::env;

use crate::utils::SingleInit;
use super::Config;

pub mod models;
pub mod schema;
pub mod types;

pub type Connection = PgConnection;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

static POOL: SingleInit<Pool> = SingleInit::uninit();

/// Resolve the database URL. The `DATABASE_URL` environment variable
/// takes precedence over the configuration file.
pub fn database_url(cfg: &Config) -> Result<String, GetDatabaseUrlError> {
    match env::var("DATABASE_URL") {
        Ok(url) => return Ok(url),
        Err(env::VarError::NotUnicode(_)) =>
            return Err(GetDatabaseUrlError::VarInvalidUnicode),
        Err(env::VarError::NotPresent) => (),
    }

    cfg.database.as_ref()
        .map(|db| db.url.clone())
        .ok_or(GetDatabaseUrlError::NotConfigured)
}

/// Open a single connection.
///
/// Short-lived commands use this; longer jobs should prefer [`pool()`].
pub fn connect(cfg: &Config) -> crate::Result<Connection> {
    use diesel::Connection;

    let url = database_url(cfg)?;
    Ok(PgConnection::establish(&url)?)
}

/// Create a connection pool for the database.
///
/// Only one pool is ever created; once this function has succeeded,
/// every later call returns the same pool. In production builds the
/// first successful call also applies pending migrations.
pub fn pool(cfg: &Config) -> crate::Result<Pool> {
    POOL.get_or_try_init(|| {
        let manager = ConnectionManager::new(database_url(cfg)?);
        let pool = Pool::new(manager)?;

        // Connect once up front so a bad URL fails here, not at first
        // use.
        let conn = pool.get()?;

        if cfg!(not(debug_assertions)) {
            embedded_migrations::run_with_output(&*conn, &mut ::std::io::stderr())
                .map_err(|_| err_msg("Migrations failed"))?;
        }

        Ok(pool)
    }).map(Clone::clone)
}

#[derive(Debug, Fail)]
pub enum GetDatabaseUrlError {
    #[fail(display = "No database connection configured")]
    NotConfigured,
    #[fail(display = "DATABASE_URL contains invalid Unicode")]
    VarInvalidUnicode,
}

#[cfg(not(debug_assertions))]
embed_migrations!();

// `pool` requires embedded_migrations::run_with_output to typecheck,
// even when it's never called.
#[cfg(debug_assertions)]
mod embedded_migrations {
    use diesel::pg::PgConnection;
    pub fn run_with_output<W>(_: &PgConnection, _: &mut W) -> Result<(), ()> {
        Ok(())
    }
}
