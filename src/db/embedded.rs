//! Embedded PostgreSQL support.
//!
//! With the `embedded-db` feature a bundled PostgreSQL instance is started
//! alongside the server, so a development checkout needs no external database.
//! Production deployments configure `database.type = external` instead.

#[cfg(feature = "embedded-db")]
use postgresql_embedded::{PostgreSQL, Settings, V16};
#[cfg(feature = "embedded-db")]
use std::path::PathBuf;
#[cfg(feature = "embedded-db")]
use tracing::{debug, info};

#[cfg(feature = "embedded-db")]
pub struct EmbeddedDatabase {
    postgres: PostgreSQL,
    connection_string: String,
}

#[cfg(feature = "embedded-db")]
impl EmbeddedDatabase {
    /// Start a bundled PostgreSQL instance on an ephemeral port.
    ///
    /// `data_dir` defaults to `$HOME/.orbitfund_data/postgres`. With
    /// `persistent = false` the instance is temporary and its data is
    /// discarded on shutdown.
    pub async fn start(data_dir: Option<PathBuf>, persistent: bool) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            if let Some(home) = std::env::home_dir() {
                home.join(".orbitfund_data").join("postgres")
            } else {
                PathBuf::from("orbitfund_data/postgres")
            }
        });

        if persistent {
            debug!("Starting embedded PostgreSQL with data directory: {}", data_dir.display());
        } else {
            debug!("Starting ephemeral embedded PostgreSQL");
        }

        let settings = Settings {
            version: V16.clone(),
            port: 0, // OS-assigned, avoids clashes with a host postgres
            username: "postgres".to_string(),
            password: "password".to_string(),
            temporary: !persistent,
            installation_dir: data_dir.join("installation"),
            data_dir: data_dir.join("data"),
            ..Default::default()
        };

        let mut postgres = PostgreSQL::new(settings);
        postgres
            .setup()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to setup embedded PostgreSQL: {e}"))?;
        postgres
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to start embedded PostgreSQL: {e}"))?;

        let database_name = "orbitfund";
        postgres
            .create_database(database_name)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create database '{database_name}': {e}"))?;

        let connection_string = postgres.settings().url(database_name);
        info!("Embedded PostgreSQL started on port {}", postgres.settings().port);

        Ok(Self {
            postgres,
            connection_string,
        })
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Stop the instance. Temporary data directories are removed by the
    /// underlying crate on drop.
    pub async fn stop(self) -> anyhow::Result<()> {
        info!("Stopping embedded PostgreSQL...");
        self.postgres
            .stop()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to stop embedded PostgreSQL: {e}"))?;
        Ok(())
    }
}

// Stub so `Option<EmbeddedDatabase>` type-checks without the feature; start
// refuses at runtime.
#[cfg(not(feature = "embedded-db"))]
pub struct EmbeddedDatabase;

#[cfg(not(feature = "embedded-db"))]
#[allow(dead_code)]
impl EmbeddedDatabase {
    pub async fn start(_data_dir: Option<std::path::PathBuf>, _persistent: bool) -> anyhow::Result<Self> {
        anyhow::bail!(
            "Embedded database is configured but the feature is not enabled. \
             Rebuild with --features embedded-db to use it."
        )
    }

    pub fn connection_string(&self) -> &str {
        ""
    }

    pub async fn stop(self) -> anyhow::Result<()> {
        Ok(())
    }
}
