//! Runs against a real server when `TESTING_MYSQL_PASSWORD` is set; otherwise each test
//! returns early. Host, port, user and database come from `TESTING_MYSQL_HOST`,
//! `TESTING_MYSQL_PORT`, `TESTING_MYSQL_USER` and `TESTING_MYSQL_DB`.

use std::sync::Arc;

use mysql_gateway::prelude::*;

fn live_gateway() -> Option<ConnectionGateway> {
    let Ok(password) = std::env::var("TESTING_MYSQL_PASSWORD") else {
        eprintln!("TESTING_MYSQL_PASSWORD not set; skipping live MySQL test");
        return None;
    };
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());

    let port = var("TESTING_MYSQL_PORT", "3306").parse().unwrap_or(3306);
    let config = ConnectionConfig::new(
        var("TESTING_MYSQL_HOST", "127.0.0.1"),
        var("TESTING_MYSQL_USER", "root"),
        password,
    )
    .with_port(port)
    .with_database(var("TESTING_MYSQL_DB", "test"));
    Some(ConnectionGateway::new(config))
}

const PEOPLE_DDL: &str = "
    CREATE TEMPORARY TABLE people (
        id INT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        score INT NOT NULL DEFAULT 0,
        active TINYINT(1) NOT NULL DEFAULT 1
    );";

#[test]
fn test02_connection_is_opened_once_and_shared() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        assert!(!db.is_connected());
        let first = db.acquire().await?;
        let second = db.acquire().await?;
        assert!(Arc::ptr_eq(&first, &second));
        assert!(db.is_connected());
        assert!(db.config().is_some());

        // A session variable set through one call is visible to the next.
        db.execute_batch("SET @marker = 41;").await?;
        let row = db
            .fetch_one("SELECT @marker + 1 AS answer", QueryParams::none())
            .await?
            .expect("one row");
        assert_eq!(row.get("answer").and_then(RowValues::as_int), Some(&42));

        db.ping().await?;
        drop((first, second));
        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_fetch_and_execute_semantics() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        db.execute_batch(PEOPLE_DDL).await?;

        assert!(
            db.fetch_one("SELECT id FROM people WHERE id = ?", vec![RowValues::Int(1)])
                .await?
                .is_none()
        );
        assert!(
            db.fetch_all("SELECT id FROM people", QueryParams::none())
                .await?
                .is_empty()
        );

        let rs = db
            .run_query(
                "INSERT INTO people (name, score) VALUES (:name, :score)",
                QueryParams::named().bind("name", "alice").bind("score", 10),
            )
            .await?;
        assert_eq!(rs.rows_affected, 1);
        assert_eq!(rs.last_insert_id, Some(1));

        let inserted = db
            .execute(
                "INSERT INTO people (name, score) VALUES (?, ?), (?, ?)",
                vec![
                    RowValues::Text("bob".into()),
                    RowValues::Int(20),
                    RowValues::Text("carol".into()),
                    RowValues::Int(30),
                ],
            )
            .await?;
        assert_eq!(inserted, 2);

        let rows = db
            .fetch_all(
                "SELECT id, name, active FROM people WHERE score >= :min ORDER BY id",
                QueryParams::named().bind("min", 20),
            )
            .await?;
        let names: Vec<_> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(RowValues::as_text))
            .collect();
        assert_eq!(names, ["bob", "carol"]);
        assert_eq!(rows[0].get("active").and_then(RowValues::as_bool), Some(true));
        assert_eq!(rows[0].column_names(), ["id", "name", "active"]);

        let changed = db
            .execute(
                "UPDATE people SET score = 99 WHERE id = :id",
                QueryParams::named().bind("id", 1),
            )
            .await?;
        assert_eq!(changed, 1);
        let changed = db
            .execute(
                "UPDATE people SET score = 99 WHERE id = :id",
                QueryParams::named().bind("id", 1000),
            )
            .await?;
        assert_eq!(changed, 0);

        let deleted = db
            .execute("DELETE FROM people WHERE score < ?", vec![RowValues::Int(25)])
            .await?;
        assert_eq!(deleted, 1);

        db.execute_batch("DROP TEMPORARY TABLE people;").await?;
        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_bound_values_are_never_spliced_into_sql() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        db.execute_batch(PEOPLE_DDL).await?;

        let hostile = "O'Brien'; DROP TABLE people; -- :name";
        db.execute(
            "INSERT INTO people (name) VALUES (:name)",
            QueryParams::named().bind("name", hostile),
        )
        .await?;

        let row = db
            .fetch_one(
                "SELECT name, COUNT(*) AS n FROM people WHERE name = ? GROUP BY name",
                vec![RowValues::Text(hostile.into())],
            )
            .await?
            .expect("row stored verbatim");
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some(hostile));
        assert_eq!(row.get("n").and_then(RowValues::as_int), Some(&1));

        let zoe = db
            .fetch_one("SELECT CAST(:v AS CHAR) AS v", QueryParams::named().bind("v", "Zoë ünï"))
            .await?
            .expect("one row");
        assert_eq!(zoe.get("v").and_then(RowValues::as_text), Some("Zoë ünï"));

        db.execute_batch("DROP TEMPORARY TABLE people;").await?;
        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_driver_failures_surface_as_query_errors() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let err = db
            .fetch_all("SELEC 1", QueryParams::none())
            .await
            .unwrap_err();
        assert!(matches!(err, SqlGatewayError::QueryError { .. }));
        assert_eq!(err.code(), Some("42000"));
        assert_eq!(err.server_error_number(), Some(1064));
        assert!(!err.message().is_empty());

        let err = db
            .fetch_one("SELECT * FROM no_such_table_here", QueryParams::none())
            .await
            .unwrap_err();
        assert_eq!(err.server_error_number(), Some(1146));

        // The connection stays usable after a failed statement.
        let row = db
            .fetch_one("SELECT 1 AS one", QueryParams::none())
            .await?
            .expect("one row");
        assert_eq!(row.get("one").and_then(RowValues::as_int), Some(&1));

        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_concurrent_callers_share_one_connection() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = Arc::new(db);
        let mut handles = Vec::new();
        for i in 0..8_i64 {
            let db = Arc::clone(&db);
            handles.push(tokio::spawn(async move {
                let row = db
                    .fetch_one("SELECT CAST(? AS SIGNED) AS v, CONNECTION_ID() AS cid", vec![RowValues::Int(i)])
                    .await?
                    .expect("one row");
                let v = row.get("v").and_then(RowValues::as_int).copied();
                let cid = row.get("cid").and_then(RowValues::as_int).copied();
                Ok::<_, SqlGatewayError>((i, v, cid))
            }));
        }

        let mut connection_ids = Vec::new();
        for handle in handles {
            let (i, v, cid) = handle.await.expect("task panicked")?;
            assert_eq!(v, Some(i));
            connection_ids.push(cid);
        }
        connection_ids.dedup();
        assert_eq!(connection_ids.len(), 1);
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_column_types_map_to_row_values() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        db.execute_batch(
            "CREATE TEMPORARY TABLE typed (
                dt DATETIME,
                ts TIMESTAMP NULL,
                ts_null TIMESTAMP NULL,
                d DATE,
                t TIME,
                amount DECIMAL(10, 2),
                yr YEAR,
                big BIGINT UNSIGNED,
                small INT UNSIGNED,
                doc JSON,
                bytes BLOB,
                flag TINYINT(1),
                ratio DOUBLE
            );
            INSERT INTO typed VALUES (
                '2024-03-01 10:11:12', '2024-03-01 10:11:12', NULL, '2024-03-01',
                '-100:30:00', 12.34, 2024, 18446744073709551615, 7, '{\"a\": 1}',
                X'000102', 1, 1.5
            );",
        )
        .await?;

        let row = db
            .fetch_one("SELECT * FROM typed", QueryParams::none())
            .await?
            .expect("one row");
        let expected_at = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(10, 11, 12))
            .expect("valid date");

        assert_eq!(row.get("dt"), Some(&RowValues::Timestamp(expected_at)));
        assert_eq!(row.get("ts"), Some(&RowValues::Timestamp(expected_at)));
        assert_eq!(row.get("ts_null"), Some(&RowValues::Null));
        assert_eq!(row.get("d"), Some(&RowValues::Text("2024-03-01".into())));
        assert!(
            row.get("t")
                .and_then(RowValues::as_text)
                .is_some_and(|t| t.starts_with("-100:30:00"))
        );
        assert_eq!(row.get("amount"), Some(&RowValues::Text("12.34".into())));
        assert_eq!(row.get("yr"), Some(&RowValues::Int(2024)));
        assert_eq!(
            row.get("big"),
            Some(&RowValues::Text("18446744073709551615".into()))
        );
        assert_eq!(row.get("small"), Some(&RowValues::Int(7)));
        assert_eq!(
            row.get("doc"),
            Some(&RowValues::JSON(serde_json::json!({"a": 1})))
        );
        assert_eq!(row.get("bytes"), Some(&RowValues::Blob(vec![0, 1, 2])));
        assert_eq!(row.get("flag"), Some(&RowValues::Bool(true)));
        assert_eq!(row.get("ratio"), Some(&RowValues::Float(1.5)));

        let elapsed = db
            .fetch_one(
                "SELECT TIMEDIFF('2024-03-02 12:00:00', '2024-03-01 10:00:00') AS span",
                QueryParams::none(),
            )
            .await?
            .expect("one row");
        assert!(
            elapsed
                .get("span")
                .and_then(RowValues::as_text)
                .is_some_and(|t| t.starts_with("26:00:00"))
        );

        db.execute_batch("DROP TEMPORARY TABLE typed;").await?;
        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_procedure_results_carry_column_names() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        db.execute_batch(
            "DROP PROCEDURE IF EXISTS gateway_echo;
             CREATE PROCEDURE gateway_echo(IN v INT) SELECT v AS echoed;",
        )
        .await?;

        let row = db
            .fetch_one("CALL gateway_echo(?)", vec![RowValues::Int(5)])
            .await?
            .expect("procedure returns a row");
        assert_eq!(row.column_names(), ["echoed"]);
        assert_eq!(row.get("echoed").and_then(RowValues::as_int), Some(&5));

        db.execute_batch("DROP PROCEDURE gateway_echo;").await?;
        db.close().await?;
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}

#[test]
fn test02_batches_run_on_spawned_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let Some(db) = live_gateway() else {
        return Ok(());
    };
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let db = Arc::new(db);
        let handle = tokio::spawn({
            let db = Arc::clone(&db);
            async move {
                db.execute_batch(
                    "CREATE TEMPORARY TABLE spawned (id INT); INSERT INTO spawned VALUES (1), (2);",
                )
                .await
            }
        });
        handle.await.expect("task panicked")?;

        let rows = db
            .fetch_all("SELECT id FROM spawned ORDER BY id", QueryParams::none())
            .await?;
        assert_eq!(rows.len(), 2);
        Ok::<(), SqlGatewayError>(())
    })?;
    Ok(())
}
