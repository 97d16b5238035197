//! One-off loader for the ingredient catalog.
//!
//! Reads a two-column CSV (`name,measurement_unit`) and inserts every pair
//! not already present. The file path is the first argument, defaulting to
//! `data/ingredients.csv`.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use common::database::{DatabaseConfig, init_pool, run_migrations};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/ingredients.csv".to_string());
    let contents = tokio::fs::read_to_string(&path).await?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    run_migrations(&pool).await?;

    let mut inserted = 0u64;
    let mut skipped = 0u64;

    for (line_no, line) in contents.lines().enumerate() {
        let Some((name, unit)) = parse_line(line) else {
            if !line.trim().is_empty() {
                warn!("Skipping malformed line {}: {}", line_no + 1, line);
            }
            continue;
        };

        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            SELECT $1, $2
            WHERE NOT EXISTS (
                SELECT 1 FROM ingredients WHERE name = $1 AND measurement_unit = $2
            )
            "#,
        )
        .bind(name)
        .bind(unit)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }

    info!(
        "Ingredient import finished: {} inserted, {} already present",
        inserted, skipped
    );

    Ok(())
}

/// Split one CSV line into (name, unit). Names may be quoted and may
/// contain commas; units never do, so the split is at the last comma.
fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (name, unit) = line.trim().rsplit_once(',')?;
    let name = name.trim().trim_matches('"').trim();
    let unit = unit.trim().trim_matches('"').trim();
    if name.is_empty() || unit.is_empty() {
        return None;
    }
    Some((name, unit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_plain() {
        assert_eq!(parse_line("flour,g"), Some(("flour", "g")));
    }

    #[test]
    fn test_parse_line_quoted_name_with_comma() {
        assert_eq!(
            parse_line("\"apricot jam, seedless\",g"),
            Some(("apricot jam, seedless", "g"))
        );
    }

    #[test]
    fn test_parse_line_trims_whitespace() {
        assert_eq!(parse_line("  milk , ml "), Some(("milk", "ml")));
    }

    #[test]
    fn test_parse_line_rejects_incomplete_rows() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("flour"), None);
        assert_eq!(parse_line("flour,"), None);
        assert_eq!(parse_line(",g"), None);
    }
}
