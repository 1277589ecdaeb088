//! Station repository and the title <-> id directory lookup

use sqlx::AnyPool;

use crate::error::{Result, StationError};
use crate::models::{NewStation, SortOrder, Station};

pub struct StationRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> StationRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, sort: SortOrder) -> Result<Vec<Station>> {
        let sql = match sort {
            SortOrder::Id => "SELECT id, title, city, address FROM stations ORDER BY id",
            SortOrder::Title => {
                "SELECT id, title, city, address FROM stations ORDER BY title ASC, id ASC"
            }
        };

        sqlx::query_as::<_, Station>(sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StationError::query("list stations", e))
    }

    pub async fn insert(&self, station: &NewStation) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO stations (title, city, address) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&station.title)
        .bind(&station.city)
        .bind(&station.address)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StationError::query(format!("insert station '{}'", station.title), e))?;

        Ok(id)
    }

    /// Resolve a station title to its id
    pub async fn id_by_title(&self, title: &str) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM stations WHERE title = $1")
            .bind(title)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StationError::query(format!("look up station '{}'", title), e))?;

        Ok(row.map(|(id,)| id))
    }

    /// Resolve a station id to its title
    pub async fn title_by_id(&self, id: i64) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT title FROM stations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StationError::query(format!("look up station {}", id), e))?;

        Ok(row.map(|(title,)| title))
    }
}
