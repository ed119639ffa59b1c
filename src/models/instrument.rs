use sqlx::{PgConnection, PgPool};

use crate::errors::AppError;
use crate::forms::Choice;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Instrument {
    pub id: i64,
    pub name: String,
}

pub async fn find_all(pool: &PgPool) -> Result<Vec<Instrument>, AppError> {
    let instruments =
        sqlx::query_as::<_, Instrument>("SELECT id, name FROM instruments ORDER BY name")
            .fetch_all(pool)
            .await?;
    Ok(instruments)
}

/// Link instruments to a person inside an open transaction.
pub async fn assign_to_person(
    conn: &mut PgConnection,
    person: i64,
    instruments: &[i64],
) -> Result<(), AppError> {
    for instrument in instruments {
        sqlx::query(
            "INSERT INTO person_instruments (person, instrument) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(person)
        .bind(instrument)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Catalog entries as options of a multi-select, keyed by primary key.
pub fn as_choices(instruments: &[Instrument]) -> Vec<Choice> {
    instruments
        .iter()
        .map(|i| Choice::new(i.id.to_string(), i.name.clone()))
        .collect()
}
