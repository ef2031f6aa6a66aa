use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Dispute, DisputeId, DisputeImage, ImageId, NewDispute, OrderId},
    traits::DisputeManagementError,
};

pub async fn fetch_dispute(id: &DisputeId, conn: &mut SqliteConnection) -> Result<Option<Dispute>, sqlx::Error> {
    let dispute = sqlx::query_as("SELECT * FROM disputes WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(dispute)
}

pub async fn fetch_dispute_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Dispute>, sqlx::Error> {
    let dispute = sqlx::query_as("SELECT * FROM disputes WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(dispute)
}

pub async fn fetch_images(id: &DisputeId, conn: &mut SqliteConnection) -> Result<Vec<DisputeImage>, sqlx::Error> {
    let images = sqlx::query_as("SELECT * FROM dispute_images WHERE dispute_id = $1 ORDER BY created_at, rowid")
        .bind(id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(images)
}

/// Inserts a new dispute. The id is generated here. A second dispute for the same order is rejected with
/// [`DisputeManagementError::DisputeAlreadyExists`].
pub async fn insert_dispute(
    dispute: NewDispute,
    conn: &mut SqliteConnection,
) -> Result<Dispute, DisputeManagementError> {
    let id = DisputeId::random();
    let result: Result<Dispute, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO disputes (id, order_id, description) VALUES ($1, $2, $3)
        RETURNING *;
        "#,
    )
    .bind(id.as_str())
    .bind(dispute.order_id.as_str())
    .bind(dispute.description)
    .fetch_one(conn)
    .await;
    match result {
        Ok(dispute) => {
            debug!("🗃️ Dispute {id} created for order {}", dispute.order_id);
            Ok(dispute)
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(DisputeManagementError::DisputeAlreadyExists(dispute.order_id))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn insert_image(
    id: &DisputeId,
    image_url: &str,
    conn: &mut SqliteConnection,
) -> Result<DisputeImage, DisputeManagementError> {
    let image_id = ImageId::random();
    let result: Result<DisputeImage, sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO dispute_images (id, dispute_id, image_url) VALUES ($1, $2, $3)
        RETURNING *;
        "#,
    )
    .bind(image_id.as_str())
    .bind(id.as_str())
    .bind(image_url)
    .fetch_one(conn)
    .await;
    match result {
        Ok(image) => {
            trace!("🗃️ Evidence image {image_id} attached to dispute {id}");
            Ok(image)
        },
        Err(sqlx::Error::Database(de)) if de.is_foreign_key_violation() => {
            Err(DisputeManagementError::DisputeNotFound(id.clone()))
        },
        Err(e) => Err(e.into()),
    }
}

/// Sets the resolved flag. Returns `true` if a row was updated, i.e. the dispute was open before this call.
pub async fn mark_resolved(id: &DisputeId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE disputes SET resolved = TRUE, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND resolved = FALSE",
    )
    .bind(id.as_str())
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
