use std::time::Duration;

use sea_orm::sea_query::{Index, IndexOrder, PostgresQueryBuilder, Table};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::entity::submission;

/// Open the process-wide connection pool and bring the schema up to date.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.connection_url());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(opt).await?;
    sync_schema(&db).await?;

    Ok(db)
}

/// Create missing tables from the entity definitions, then the secondary indexes.
pub async fn sync_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.get_schema_registry("mirror_server::entity::*")
        .sync(db)
        .await?;
    ensure_indexes(db).await;
    Ok(())
}

/// Drop every mirrored submission by recreating the table.
pub async fn reset_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Table::drop()
        .table(submission::Entity)
        .if_exists()
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Dropped submission table");

    sync_schema(db).await
}

/// Ensure the indexes backing the ranked search exist.
///
/// Schema sync only creates primary keys, so the ordering index and the
/// per-predicate indexes are created here. Failures are logged, not fatal.
pub async fn ensure_indexes(db: &DatabaseConnection) {
    let rank_order = Index::create()
        .if_not_exists()
        .name("idx_submission_rank_order")
        .table(submission::Entity)
        .col((submission::Column::SubmissionTime, IndexOrder::Desc))
        .col(submission::Column::UserId)
        .col(submission::Column::ProblemId)
        .to_string(PostgresQueryBuilder);

    let mut statements = vec![("idx_submission_rank_order", rank_order)];

    for (name, column) in [
        ("idx_submission_user_id", submission::Column::UserId),
        ("idx_submission_problem_id", submission::Column::ProblemId),
        ("idx_submission_language", submission::Column::Language),
    ] {
        let stmt = Index::create()
            .if_not_exists()
            .name(name)
            .table(submission::Entity)
            .col(column)
            .to_string(PostgresQueryBuilder);
        statements.push((name, stmt));
    }

    for (name, stmt) in statements {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => warn!("Failed to create index {}: {}", name, e),
        }
    }
}
