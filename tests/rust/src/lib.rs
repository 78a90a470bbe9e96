//! Shared test utilities and fixtures for ScopeLog integration tests.

pub use scopelog::{LogEntry, LogLevel, LogModel, LoggerContext, LoggerScope};

pub use mocks::MemoryLogStore;

/// Record shape fixtures
pub mod fixtures {
    use chrono::{DateTime, Utc};
    use scopelog::{Column, LogModel};
    use serde::{Deserialize, Serialize};

    /// Product trace record with an explicit table name.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ProductLog {
        pub scope: String,
        pub time: DateTime<Utc>,
        pub lot_id: String,
        pub product_name: String,
        pub quantity: i64,
        pub passed: bool,
    }

    impl LogModel for ProductLog {
        const TABLE: Option<&'static str> = Some("App.ProductLog");
        const COLUMNS: &'static [Column] = &[
            Column::text("scope").export_ignore(),
            Column::timestamp("time"),
            Column::text("lot_id"),
            Column::text("product_name"),
            Column::integer("quantity"),
            Column::boolean("passed"),
        ];

        fn time(&self) -> DateTime<Utc> {
            self.time
        }
        fn set_time(&mut self, time: DateTime<Utc>) {
            self.time = time;
        }
        fn scope(&self) -> &str {
            &self.scope
        }
        fn set_scope(&mut self, scope: &str) {
            self.scope = scope.to_string();
        }
    }

    /// Create a product record with placeholder scope and time
    pub fn product(lot_id: &str, product_name: &str) -> ProductLog {
        ProductLog {
            scope: "unset".to_string(),
            time: DateTime::<Utc>::default(),
            lot_id: lot_id.to_string(),
            product_name: product_name.to_string(),
            quantity: 1,
            passed: true,
        }
    }

    /// Scope tag types
    pub struct Assembly;
    pub struct Inspection;
}

/// Fault fixtures
pub mod faults {
    /// Innermost cause
    #[derive(Debug, thiserror::Error)]
    #[error("sensor {sensor} returned no data")]
    pub struct SensorError {
        pub sensor: u32,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("calibration failed")]
    pub struct CalibrationError {
        #[source]
        pub source: SensorError,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("station offline")]
    pub struct StationError {
        #[source]
        pub source: CalibrationError,
    }

    /// A fault with two nested causes: Station → Calibration → Sensor.
    pub fn station_failure() -> StationError {
        StationError {
            source: CalibrationError {
                source: SensorError { sensor: 7 },
            },
        }
    }
}

/// Database test helpers
pub mod db {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use scopelog::{LoggerConfig, LoggerContext};
    use tempfile::TempDir;

    /// Database file name (without extension, normalization appends `.db`)
    const DB_FILE: &str = "scopelog_test";

    /// A logger context over a database in a temporary directory
    pub struct TestContext {
        pub context: Arc<LoggerContext>,
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext {
        /// Create a context over a fresh file database
        pub fn new() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let config = LoggerConfig::new(temp_dir.path().join(DB_FILE));
            let db_path = config.database_path();
            let context = LoggerContext::open(&config).expect("Failed to open test database");
            Self {
                context,
                db_path,
                _temp_dir: temp_dir,
            }
        }

        /// Create an in-memory context for fast tests
        pub fn in_memory() -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            let context = LoggerContext::open(&LoggerConfig::in_memory())
                .expect("Failed to open in-memory database");
            Self {
                context,
                db_path: PathBuf::new(),
                _temp_dir: temp_dir,
            }
        }

        /// Get the temporary directory path
        pub fn path(&self) -> &Path {
            self._temp_dir.path()
        }

        /// Get the full database file path
        pub fn db_path(&self) -> &Path {
            &self.db_path
        }
    }

    impl Default for TestContext {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Async test helpers
pub mod async_helpers {
    use std::time::Duration;
    use tokio::time::timeout;

    /// Run an async operation with a timeout
    pub async fn with_timeout<F, T>(duration: Duration, f: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        timeout(duration, f).await.expect("Operation timed out")
    }

    /// Default test timeout (10 seconds)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
}
