use sqlx::AnyPool;

use crate::error::{Result, StationError};
use crate::models::{NewPosition, Position, SortOrder};

pub struct PositionRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> PositionRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, sort: SortOrder) -> Result<Vec<Position>> {
        let sql = match sort {
            SortOrder::Id => "SELECT id, title, add_date, salary FROM positions ORDER BY id",
            SortOrder::Title => {
                "SELECT id, title, add_date, salary FROM positions ORDER BY title ASC, id ASC"
            }
        };

        sqlx::query_as::<_, Position>(sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StationError::query("list positions", e))
    }

    pub async fn insert(&self, position: &NewPosition) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO positions (title, add_date, salary) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&position.title)
        .bind(&position.add_date)
        .bind(position.salary)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StationError::query(format!("insert position '{}'", position.title), e))?;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn insert_and_list_sorted() {
        let store = Store::open_in_memory().await.unwrap();
        let repo = store.positions();

        for (title, salary) in [("Guard", 42_000), ("Dispatcher", 58_000)] {
            repo.insert(&NewPosition {
                title: title.to_string(),
                add_date: "2019-09-01".to_string(),
                salary,
            })
            .await
            .unwrap();
        }

        let positions = repo.list(SortOrder::Title).await.unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].title, "Dispatcher");
        assert_eq!(positions[0].salary, 58_000);
        assert_eq!(positions[1].title, "Guard");
    }
}
