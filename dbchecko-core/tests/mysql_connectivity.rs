//! MySQL connectivity tests.
//!
//! The container test needs a Docker daemon and is ignored by default:
//! `cargo test -p dbchecko-core --test mysql_connectivity -- --ignored`

#[cfg(feature = "mysql")]
mod mysql_connectivity_tests {
    use dbchecko_core::{ConnectionConfig, DbChecko, DbCheckoError};
    use std::time::Duration;
    use testcontainers_modules::{mysql::Mysql, testcontainers::runners::AsyncRunner};

    async fn select(checko: &DbChecko, query: &str) -> String {
        let mut out = Vec::new();
        checko.execute_select(query, &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    /// MySQL accepts TCP connections before it accepts logins.
    async fn wait_until_reachable(checko: &DbChecko, max_attempts: u32) {
        for _ in 0..max_attempts {
            if checko.check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        panic!("MySQL failed to become ready after {max_attempts} attempts");
    }

    #[tokio::test]
    async fn test_mysql_connection_error_is_sanitized() {
        let checko = DbChecko::new(ConnectionConfig::new(
            "jdbc:mysql://127.0.0.1:1/lportal?password=hunter2",
            "root",
            "hunter2",
            "com.mysql.cj.jdbc.Driver",
        ));

        assert!(!checko.check().await);

        let result = checko.execute_update("SELECT 1").await;
        let Err(error) = result else {
            panic!("connecting to port 1 should fail");
        };
        assert!(matches!(error, DbCheckoError::ConnectionFailed { .. }));
        assert!(!error.to_string().contains("hunter2"));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_mysql_container_round_trip() {
        let mysql = Mysql::default().start().await.unwrap();
        let port = mysql.get_host_port_ipv4(3306).await.unwrap();

        let checko = DbChecko::new(ConnectionConfig::new(
            format!("jdbc:mysql://localhost:{port}/test"),
            "root",
            "",
            "com.mysql.cj.jdbc.Driver",
        ));
        wait_until_reachable(&checko, 30).await;

        checko
            .execute_update(
                "CREATE TABLE user_ (id INT PRIMARY KEY, name VARCHAR(75), \
                 balance DECIMAL(10, 2), settings JSON)",
            )
            .await
            .unwrap();
        let inserted = checko
            .execute_update(
                "INSERT INTO user_ VALUES \
                 (1, 'Raptor', 12.50, '{\"theme\": \"dark\"}'), \
                 (2, 'Peter', NULL, NULL), \
                 (3, 'John', 0.10, '[]')",
            )
            .await
            .unwrap();
        assert_eq!(inserted.affected_rows, 3);

        let updated = checko
            .execute_update("UPDATE user_ SET name = 'SuperRaptor' WHERE id = 1")
            .await
            .unwrap();
        assert_eq!(updated.affected_rows, 1);

        let output = select(&checko, "SELECT id, name FROM user_ ORDER BY id").await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "id         || name      ");
        assert_eq!(lines[2], "1          || SuperRaptor");
        assert_eq!(lines[4], "3          || John      ");

        let output = select(&checko, "SELECT id, balance, settings FROM user_ ORDER BY id").await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[2], r#"1          || 12.50      || {"theme":"dark"}"#);
        assert_eq!(lines[3], format!("2          || {} || {}", " ".repeat(10), " ".repeat(10)));
        assert_eq!(lines[4], "3          || 0.10       || []        ");

        let output = select(&checko, "SELECT 1.5 AS x, AVG(balance) AS avg_balance FROM user_").await;
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "x          || avg_balance");
        assert!(lines[2].starts_with("1.5        || 6.30"), "got {output:?}");
    }
}
