use sqlx::AnyPool;

use crate::error::{Result, StationError};
use crate::models::{Employee, EmployeeView, NewEmployee, SortOrder};

pub struct EmployeeRepo<'a> {
    pool: &'a AnyPool,
}

impl<'a> EmployeeRepo<'a> {
    pub fn new(pool: &'a AnyPool) -> Self {
        Self { pool }
    }

    /// List employees with their position and station titles.
    ///
    /// LEFT JOINs keep employees whose references are dangling visible.
    pub async fn list(&self, sort: SortOrder) -> Result<Vec<EmployeeView>> {
        let order = match sort {
            SortOrder::Id => "e.id",
            SortOrder::Title => "e.full_name ASC, e.id ASC",
        };
        let sql = format!(
            r#"
            SELECT e.id, e.full_name, e.start_date, e.station_id, e.position_id,
                   p.title AS position_title,
                   s.title AS station_title
            FROM employees e
            LEFT JOIN positions p ON p.id = e.position_id
            LEFT JOIN stations s ON s.id = e.station_id
            ORDER BY {order}
            "#
        );

        sqlx::query_as::<_, EmployeeView>(&sql)
            .fetch_all(self.pool)
            .await
            .map_err(|e| StationError::query("list employees", e))
    }

    pub async fn insert(&self, employee: &NewEmployee) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO employees (full_name, start_date, station_id, position_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&employee.full_name)
        .bind(&employee.start_date)
        .bind(employee.station_id)
        .bind(employee.position_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StationError::query(format!("insert employee '{}'", employee.full_name), e))?;

        Ok(id)
    }

    /// Employees currently assigned to a station, by id
    pub async fn list_at_station(&self, station_id: i64) -> Result<Vec<Employee>> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, full_name, start_date, station_id, position_id
            FROM employees
            WHERE station_id = $1
            ORDER BY id
            "#,
        )
        .bind(station_id)
        .fetch_all(self.pool)
        .await
        .map_err(|e| StationError::query(format!("list employees of station {}", station_id), e))
    }

    /// Every employee's current station, by employee id
    pub async fn assignments(&self) -> Result<Vec<(i64, Option<i64>)>> {
        sqlx::query_as("SELECT id, station_id FROM employees ORDER BY id")
            .fetch_all(self.pool)
            .await
            .map_err(|e| StationError::query("read station assignments", e))
    }
}
