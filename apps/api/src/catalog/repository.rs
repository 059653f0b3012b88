use anyhow::{anyhow, Context, Result};
use sqlx::PgPool;

use crate::catalog::models::{Package, PackageSummary, Question, QuestionKind};
use crate::models::catalog::{PackageRow, QuestionRow};

impl TryFrom<QuestionRow> for Question {
    type Error = anyhow::Error;

    fn try_from(row: QuestionRow) -> Result<Self> {
        let kind = QuestionKind::parse(&row.kind)
            .ok_or_else(|| anyhow!("question {} has unknown kind '{}'", row.id, row.kind))?;
        let options: Vec<i64> = serde_json::from_value(row.options)
            .with_context(|| format!("question {} has malformed options", row.id))?;
        Ok(Question {
            id: row.id,
            enabler: row.enabler,
            indicator: row.indicator,
            text: row.question_text,
            kind,
            contribution_max: row.contribution_max,
            options,
        })
    }
}

/// Lists all packages without their questions.
pub async fn list_packages(pool: &PgPool) -> Result<Vec<PackageSummary>> {
    let rows = sqlx::query_as::<_, PackageRow>("SELECT * FROM packages ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| PackageSummary {
            id: r.id,
            name: r.name,
            description: r.description,
        })
        .collect())
}

/// Loads a package with its questions in position order.
pub async fn get_package(pool: &PgPool, package_id: &str) -> Result<Option<Package>> {
    let row = sqlx::query_as::<_, PackageRow>("SELECT * FROM packages WHERE id = $1")
        .bind(package_id)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let questions = sqlx::query_as::<_, QuestionRow>(
        "SELECT * FROM questions WHERE package_id = $1 ORDER BY position ASC",
    )
    .bind(package_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(Question::try_from)
    .collect::<Result<Vec<_>>>()?;

    Ok(Some(Package {
        id: row.id,
        name: row.name,
        description: row.description,
        questions,
    }))
}
