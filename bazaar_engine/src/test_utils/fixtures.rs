use sqlx::SqlitePool;

use crate::db_types::{OrderId, UserId};

/// The cast of a dispute test. `buyer` bought `product` from `seller`'s store in `order`. `stranger` has nothing to do
/// with any of it.
#[derive(Debug, Clone)]
pub struct Marketplace {
    pub buyer: UserId,
    pub seller: UserId,
    pub stranger: UserId,
    pub store_id: String,
    pub product_id: String,
    pub order: OrderId,
}

/// Seeds a buyer, a seller with one store and product, a bystander, and one order.
pub async fn seed_marketplace(pool: &SqlitePool) -> Marketplace {
    let buyer = insert_user(pool, "Bea", "Buyer", "customer").await;
    let seller = insert_user(pool, "Sam", "Seller", "seller").await;
    let stranger = insert_user(pool, "Stan", "Stranger", "customer").await;
    let store_id = insert_store(pool, "Sam's Surplus", &seller).await;
    let product_id = insert_product(pool, "Rubber duck", 2.5, &store_id).await;
    let order = insert_order(pool, &product_id, &buyer, 4).await;
    Marketplace { buyer, seller, stranger, store_id, product_id, order }
}

/// Adds another order for an existing product, e.g. to raise a second, independent dispute.
pub async fn insert_order(pool: &SqlitePool, product_id: &str, buyer: &UserId, quantity: i64) -> OrderId {
    let id = OrderId::random();
    sqlx::query("INSERT INTO orders (id, product_id, buyer_id, quantity, total) VALUES ($1, $2, $3, $4, $5)")
        .bind(id.as_str())
        .bind(product_id)
        .bind(buyer.as_str())
        .bind(quantity)
        .bind(quantity as f64 * 2.5)
        .execute(pool)
        .await
        .expect("Error inserting order");
    id
}

pub async fn insert_user(pool: &SqlitePool, first_name: &str, last_name: &str, role: &str) -> UserId {
    let id = UserId::random();
    let email = format!("{}.{}@{}.example", first_name.to_lowercase(), last_name.to_lowercase(), &id.as_str()[..8]);
    sqlx::query("INSERT INTO users (id, first_name, last_name, email, role) VALUES ($1, $2, $3, $4, $5)")
        .bind(id.as_str())
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(role)
        .execute(pool)
        .await
        .expect("Error inserting user");
    id
}

async fn insert_store(pool: &SqlitePool, name: &str, owner: &UserId) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO stores (id, name, owner_id) VALUES ($1, $2, $3)")
        .bind(&id)
        .bind(name)
        .bind(owner.as_str())
        .execute(pool)
        .await
        .expect("Error inserting store");
    id
}

async fn insert_product(pool: &SqlitePool, name: &str, price: f64, store_id: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO products (id, name, price, store_id) VALUES ($1, $2, $3, $4)")
        .bind(&id)
        .bind(name)
        .bind(price)
        .bind(store_id)
        .execute(pool)
        .await
        .expect("Error inserting product");
    id
}
