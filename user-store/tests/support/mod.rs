//! Shared helpers for the user store's embedded PostgreSQL suites.
//!
//! Databases are created with `postgres` so `CREATE DATABASE` runs outside a
//! transaction; schemas come from the crate's embedded Diesel migrations.

pub mod pg_embed;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Render a `postgres` error with its SQLSTATE, detail and hint.
///
/// `postgres::Error`'s `Display` collapses server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}

/// Run `statement` against `url` outside any transaction.
pub fn execute(url: &str, statement: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(statement)
        .map_err(|err| format_postgres_error(&err))
}

/// Create a fresh database on `cluster`, migrate it and return its URL.
pub fn provision_database(cluster: &TestCluster) -> Result<String, String> {
    let connection = cluster.connection();
    let name = format!("user_store_{}", Uuid::new_v4().simple());
    execute(
        &connection.database_url("postgres"),
        &format!("CREATE DATABASE \"{name}\""),
    )?;

    let url = connection.database_url(&name);
    migrate_schema(&url)?;
    Ok(url)
}

/// Apply every pending migration to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}
