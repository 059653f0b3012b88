use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::catalog::models::Package;

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// Packages shipped with the service.
pub fn bundled_packages() -> Result<Vec<Package>> {
    serde_json::from_str(BUNDLED_CATALOG).context("bundled catalog is not valid JSON")
}

/// Inserts the bundled catalog when the packages table is empty.
/// Returns the number of packages inserted.
pub async fn seed_if_empty(pool: &PgPool) -> Result<usize> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM packages")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let packages = bundled_packages()?;
    let mut tx = pool.begin().await?;

    for package in &packages {
        sqlx::query("INSERT INTO packages (id, name, description) VALUES ($1, $2, $3)")
            .bind(&package.id)
            .bind(&package.name)
            .bind(&package.description)
            .execute(&mut *tx)
            .await?;

        for (position, q) in package.questions.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO questions
                    (id, package_id, position, enabler, indicator, question_text,
                     kind, contribution_max, options)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&q.id)
            .bind(&package.id)
            .bind(position as i32 + 1)
            .bind(&q.enabler)
            .bind(&q.indicator)
            .bind(&q.text)
            .bind(q.kind.as_str())
            .bind(q.contribution_max)
            .bind(serde_json::to_value(&q.options)?)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!("Seeded {} question packages", packages.len());
    Ok(packages.len())
}
