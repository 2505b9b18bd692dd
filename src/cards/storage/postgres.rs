use super::StorageError;
use crate::cards::model::{Card, CardRequest};
use sqlx::{Connection, PgPool, Row, migrate::MigrateError, postgres::PgRow};
use tracing::{Instrument, debug, info_span};

const INSERT_CARD: &str = r"
    INSERT INTO credit_cards (number, expiration_date, cvv, holder_name)
    VALUES ($1, $2, $3, $4)
    RETURNING id, number, expiration_date, cvv, holder_name
";

const SELECT_CARDS: &str = r"
    SELECT id, number, expiration_date, cvv, holder_name
    FROM credit_cards
    ORDER BY id
";

// strpos keeps `%` and `_` in the filter literal, unlike LIKE
const SELECT_CARDS_BY_HOLDER: &str = r"
    SELECT id, number, expiration_date, cvv, holder_name
    FROM credit_cards
    WHERE strpos(lower(holder_name), lower($1)) > 0
    ORDER BY id
";

const UPDATE_CARD: &str = r"
    UPDATE credit_cards
    SET number = $1, expiration_date = $2, cvv = $3, holder_name = $4
    WHERE id = $5
";

const DELETE_CARD: &str = "DELETE FROM credit_cards WHERE id = $1";

/// Apply the embedded `migrations/` to `pool`. Already applied migrations are skipped.
///
/// # Errors
/// Returns an error if a migration fails or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Cards persisted in the `credit_cards` table.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn save(&self, card: CardRequest) -> Result<Card, StorageError> {
        let cvv = i32::try_from(card.cvv).map_err(|err| sqlx::Error::Encode(Box::new(err)))?;

        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = INSERT_CARD
        );
        let row = sqlx::query(INSERT_CARD)
            .bind(&card.number)
            .bind(&card.expiration_date)
            .bind(cvv)
            .bind(&card.holder)
            .fetch_one(&self.pool)
            .instrument(span)
            .await?;

        Ok(card_from_row(&row)?)
    }

    /// # Errors
    /// Returns an error if the select fails or a row cannot be decoded.
    pub async fn list(&self, holder: &str) -> Result<Vec<Card>, StorageError> {
        let (query, statement) = if holder.is_empty() {
            (sqlx::query(SELECT_CARDS), SELECT_CARDS)
        } else {
            (
                sqlx::query(SELECT_CARDS_BY_HOLDER).bind(holder),
                SELECT_CARDS_BY_HOLDER,
            )
        };

        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = statement
        );
        let rows = query.fetch_all(&self.pool).instrument(span).await?;

        Ok(rows
            .iter()
            .map(card_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    /// # Errors
    /// Returns [`StorageError::NotFound`] unless exactly one row was updated.
    pub async fn update(&self, card: Card) -> Result<Card, StorageError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = UPDATE_CARD
        );
        let result = sqlx::query(UPDATE_CARD)
            .bind(&card.number)
            .bind(&card.expiration_date)
            .bind(card.cvv)
            .bind(&card.holder)
            .bind(card.id)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        if result.rows_affected() == 1 {
            Ok(card)
        } else {
            debug!(id = card.id, rows = result.rows_affected(), "update matched no card");
            Err(StorageError::NotFound)
        }
    }

    /// # Errors
    /// Returns an error if the delete statement fails.
    pub async fn delete(&self, id: i32) -> Result<(), StorageError> {
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = DELETE_CARD
        );
        sqlx::query(DELETE_CARD)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await?;

        Ok(())
    }

    /// # Errors
    /// Returns an error if no connection can be acquired or the ping fails.
    pub async fn ping(&self) -> Result<(), StorageError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;

        Ok(())
    }
}

fn card_from_row(row: &PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.try_get("id")?,
        number: row.try_get("number")?,
        expiration_date: row.try_get("expiration_date")?,
        cvv: row.try_get("cvv")?,
        holder: row.try_get("holder_name")?,
    })
}
