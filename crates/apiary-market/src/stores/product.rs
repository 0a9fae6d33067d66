use apiary_common::error::{AppError, AppResult};
use apiary_common::pricing::{CommissionKind, PricingBreakdown, StoredBreakdown};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};
use uuid::Uuid;

/// One attempt with the full column set, then one retry per droppable column.
const MAX_WRITE_ATTEMPTS: usize = 10;

/// Columns the schema-tolerant writer must never drop. Everything else in a
/// breakdown is reconstructable from these two plus the commission fields.
const PRIMARY_COLUMNS: [&str; 2] = ["seller_amount_cents", "price_cents"];

#[derive(Clone)]
pub struct ProductStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: Option<String>,
    pub breakdown: PricingBreakdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub product_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub stored: StoredBreakdown,
    pub created_at: Option<DateTime<Utc>>,
}

enum ColumnValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl ProductStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a product, negotiating with the schema: when the database
    /// rejects an unknown column, drop that column from the payload and
    /// retry. The primary pricing columns are never dropped; a schema that
    /// cannot hold them fails the write.
    pub async fn create(&self, input: NewProduct) -> AppResult<Uuid> {
        let product_id = Uuid::new_v4();
        let mut columns = insert_columns(product_id, &input);

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let sql = insert_sql(&columns);
            let mut query = sqlx::query(&sql);
            for (_, value) in &columns {
                query = match value {
                    ColumnValue::Text(v) => query.bind(v.clone()),
                    ColumnValue::Integer(v) => query.bind(*v),
                    ColumnValue::Real(v) => query.bind(*v),
                };
            }

            match query.execute(&self.pool).await {
                Ok(_) => {
                    info!(
                        %product_id,
                        title = %input.title,
                        price_cents = input.breakdown.listing_price_cents,
                        "product created"
                    );
                    return Ok(product_id);
                }
                Err(err) => {
                    let message = err.to_string();
                    let Some(missing) = missing_column_name(&message) else {
                        return Err(AppError::External(format!(
                            "failed to create product: {err}"
                        )));
                    };
                    if PRIMARY_COLUMNS.contains(&missing.as_str()) {
                        return Err(AppError::External(format!(
                            "schema is missing primary pricing column {missing}"
                        )));
                    }
                    let before = columns.len();
                    columns.retain(|(name, _)| *name != missing);
                    if columns.len() == before {
                        return Err(AppError::External(format!(
                            "failed to create product: {err}"
                        )));
                    }
                    warn!(column = %missing, "schema rejected column, retrying without it");
                }
            }
        }

        Err(AppError::External(
            "product insert exhausted schema-tolerant retries".to_string(),
        ))
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<Option<ProductRecord>> {
        // SELECT * so a partially migrated schema still returns a row; absent
        // fee columns read as None and flow to the reconciler.
        let row = sqlx::query("SELECT * FROM products WHERE product_id = ?1")
            .bind(product_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::External(format!("failed to fetch product: {e}")))?;

        row.map(row_to_product).transpose()
    }
}

fn insert_columns(product_id: Uuid, input: &NewProduct) -> Vec<(&'static str, ColumnValue)> {
    let b = &input.breakdown;
    let mut columns = vec![
        ("product_id", ColumnValue::Text(product_id.to_string())),
        ("title", ColumnValue::Text(input.title.clone())),
        ("seller_amount_cents", ColumnValue::Integer(b.seller_cents)),
        ("affiliate_cents", ColumnValue::Integer(b.affiliate_cents)),
        (
            "commission_type",
            ColumnValue::Text(kind_to_db(b.commission_kind).to_string()),
        ),
        ("stripe_fee_cents", ColumnValue::Integer(b.stripe_fee_cents)),
        (
            "platform_fee_cents",
            ColumnValue::Integer(b.platform_fee_cents),
        ),
        ("price_cents", ColumnValue::Integer(b.listing_price_cents)),
        ("created_at", ColumnValue::Text(Utc::now().to_rfc3339())),
    ];
    if let Some(description) = &input.description {
        columns.push(("description", ColumnValue::Text(description.clone())));
    }
    if let Some(rate) = b.commission_rate {
        columns.push(("commission_rate", ColumnValue::Real(rate)));
    }
    if let Some(flat) = b.flat_commission_cents {
        columns.push(("flat_commission_cents", ColumnValue::Integer(flat)));
    }
    columns
}

fn insert_sql(columns: &[(&'static str, ColumnValue)]) -> String {
    let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO products ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}

/// Pull the offending column name out of a sqlite "unknown column" error.
fn missing_column_name(message: &str) -> Option<String> {
    let needle = "has no column named ";
    let pos = message.find(needle)?;
    let name: String = message[pos + needle.len()..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

fn row_to_product(row: SqliteRow) -> AppResult<ProductRecord> {
    let product_id: String = row
        .try_get("product_id")
        .map_err(|e| AppError::External(format!("read product_id failed: {e}")))?;
    let title: String = row
        .try_get("title")
        .map_err(|e| AppError::External(format!("read title failed: {e}")))?;

    let stored = StoredBreakdown {
        seller_cents: opt_i64(&row, "seller_amount_cents"),
        affiliate_cents: opt_i64(&row, "affiliate_cents"),
        stripe_fee_cents: opt_i64(&row, "stripe_fee_cents"),
        platform_fee_cents: opt_i64(&row, "platform_fee_cents"),
        listing_price_cents: opt_i64(&row, "price_cents"),
        commission_kind: row
            .try_get::<Option<String>, _>("commission_type")
            .ok()
            .flatten()
            .as_deref()
            .and_then(kind_from_db),
        commission_rate: opt_f64(&row, "commission_rate"),
        flat_commission_cents: opt_i64(&row, "flat_commission_cents"),
    };

    Ok(ProductRecord {
        product_id: Uuid::parse_str(&product_id)
            .map_err(|e| AppError::External(format!("invalid product_id uuid: {e}")))?,
        title,
        description: row.try_get("description").ok().flatten(),
        stored,
        created_at: row
            .try_get::<Option<DateTime<Utc>>, _>("created_at")
            .ok()
            .flatten(),
    })
}

fn opt_i64(row: &SqliteRow, column: &str) -> Option<i64> {
    row.try_get::<Option<i64>, _>(column).ok().flatten()
}

fn opt_f64(row: &SqliteRow, column: &str) -> Option<f64> {
    row.try_get::<Option<f64>, _>(column).ok().flatten()
}

fn kind_to_db(kind: CommissionKind) -> &'static str {
    match kind {
        CommissionKind::Percentage => "percentage",
        CommissionKind::FlatRate => "flat_rate",
    }
}

fn kind_from_db(raw: &str) -> Option<CommissionKind> {
    match raw {
        "percentage" => Some(CommissionKind::Percentage),
        "flat_rate" => Some(CommissionKind::FlatRate),
        _ => None,
    }
}
