//! Ownership-chain lookups backing the access gate.
//!
//! Both queries resolve the caller's role in SQL, in one round trip, so that the answer reflects the state of the
//! dispute at the moment of the call.
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{DisputeId, OrderId, ParticipantRole, UserId},
    traits::AccessManagementError,
};

/// Resolves the role of `user` in the dispute. The resolved flag wins over every other role. Returns `None` if the
/// dispute (or any link in its ownership chain) does not exist.
pub async fn role_for_dispute(
    dispute_id: &DisputeId,
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<ParticipantRole>, AccessManagementError> {
    let role: Option<String> = sqlx::query_scalar(
        r#"
        SELECT
            CASE
                WHEN disputes.resolved = TRUE THEN 'resolved'
                WHEN orders.buyer_id = $1 THEN 'buyer'
                WHEN stores.owner_id = $1 THEN 'seller'
                ELSE 'unrelated'
            END AS role
        FROM disputes
        JOIN orders ON disputes.order_id = orders.id
        JOIN products ON orders.product_id = products.id
        JOIN stores ON products.store_id = stores.id
        WHERE disputes.id = $2;
        "#,
    )
    .bind(user.as_str())
    .bind(dispute_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Role of {user} in dispute {dispute_id}: {role:?}");
    role.map(|r| parse_role(&r)).transpose()
}

/// Resolves the role of `user` for the order. Returns `None` if the order does not exist.
pub async fn role_for_order(
    order_id: &OrderId,
    user: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<ParticipantRole>, AccessManagementError> {
    let role: Option<String> = sqlx::query_scalar(
        r#"
        SELECT
            CASE
                WHEN orders.buyer_id = $1 THEN 'buyer'
                WHEN stores.owner_id = $1 THEN 'seller'
                ELSE 'unrelated'
            END AS role
        FROM orders
        JOIN products ON orders.product_id = products.id
        JOIN stores ON products.store_id = stores.id
        WHERE orders.id = $2;
        "#,
    )
    .bind(user.as_str())
    .bind(order_id.as_str())
    .fetch_optional(conn)
    .await?;
    trace!("🗃️ Role of {user} for order {order_id}: {role:?}");
    role.map(|r| parse_role(&r)).transpose()
}

fn parse_role(role: &str) -> Result<ParticipantRole, AccessManagementError> {
    role.parse::<ParticipantRole>().map_err(|e| AccessManagementError::InvalidRole(e.to_string()))
}
