use carshop_rest::app_env;
use carshop_rest::config::{DatabaseConfig, DatabaseEngine};
use carshop_rest::db;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{AnyPool, Connection, PgConnection};
use std::env;
use std::future::Future;
use std::panic;
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let schema_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{}", schema_id);
        let mut conn = PgConnection::connect(base_url).await?;

        sqlx::query(format!("CREATE DATABASE {}", db_name).as_str())
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }

    async fn drop_db(self) {
        let conn = PgConnection::connect(&self.base_url).await;
        let mut conn = match conn {
            Ok(cxn) => cxn,
            Err(conn_err) => {
                println!(
                    "Failed to reconnect to drop test database {}, please remove it manually. Error: {}",
                    self.db_name, conn_err
                );
                return;
            }
        };

        let drop_result = sqlx::query(format!("DROP DATABASE {}", self.db_name).as_str())
            .execute(&mut conn)
            .await;
        if let Err(db_err) = drop_result {
            println!(
                "Failed to drop test database {}, please remove it manually. Error: {}",
                self.db_name, db_err
            );
        }
    }
}

/// Creates a throwaway, migrated database for a test and drops it afterwards, even when the
/// test fails.
///
/// Expects that the TEST_DB_URL environment variable is populated with a connection string
/// that has no database name in its path
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    F: FnOnce(AnyPool) -> R,
    R: Future<Output = ()> + Send + 'static,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(app_env::test::TEST_DB_URL).expect(
            "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
        );
        let test_db = match TestDatabase::create(&base_url).await {
            Ok(tdb) => tdb,
            Err(db_err) => panic!("Failed to start test database: {}", db_err),
        };

        let db_config = DatabaseConfig {
            engine: DatabaseEngine::Postgres,
            data_source: test_db.url(),
            max_connections: 5,
        };
        let sqlx_pool = db::connect_sqlx(&db_config)
            .await
            .expect("could not connect to test database");
        db::run_migrations(&sqlx_pool)
            .await
            .expect("could not migrate test database");

        let test_result = tokio::spawn(test_fn(sqlx_pool.clone())).await;
        sqlx_pool.close().await;
        test_db.drop_db().await;

        if let Err(join_err) = test_result {
            if join_err.is_panic() {
                panic::resume_unwind(join_err.into_panic());
            }
            panic!("Test task did not finish: {join_err}");
        }
    });
}
