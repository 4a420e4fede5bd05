use super::{IdRecord, Repository, WriteLock};
use crate::error::DBError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A named http action a sensor exposes
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorMethodDao {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) http_method: String,
    pub(crate) request_body: String,
}

impl SensorMethodDao {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn http_method(&self) -> &String {
        &self.http_method
    }

    pub fn request_body(&self) -> &String {
        &self.request_body
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSensorMethod {
    pub name: String,
    pub http_method: String,
    #[serde(default)]
    pub request_body: String,
}

impl NewSensorMethod {
    pub(crate) fn into_dao(self, id: i32) -> SensorMethodDao {
        SensorMethodDao {
            id,
            name: self.name,
            http_method: self.http_method,
            request_body: self.request_body,
        }
    }
}

pub struct SensorMethodRepository {
    db_conn: sqlx::PgPool,
    write_lock: WriteLock,
}

impl SensorMethodRepository {
    pub fn new(db_conn: &sqlx::PgPool) -> Self {
        SensorMethodRepository {
            db_conn: db_conn.clone(),
            write_lock: WriteLock::new(),
        }
    }
}

#[async_trait]
impl Repository for SensorMethodRepository {
    type Row = SensorMethodDao;
    type CreateParams = NewSensorMethod;

    async fn find(&self, id: i32) -> Result<SensorMethodDao, DBError> {
        sql_stmnt!(
            SensorMethodDao,
            r#"SELECT id, name, http_method, request_body
                FROM sensor_methods WHERE id = $1 LIMIT 1"#,
            id
        )
        .fetch_optional(&self.db_conn)
        .await?
        .ok_or(DBError::SensorMethodNotFound(id))
    }

    /// `None` returns every method, an empty filter returns none
    async fn find_all(&self, ids: Option<&[i32]>) -> Result<Vec<SensorMethodDao>, DBError> {
        let methods = match ids {
            Some(ids) => {
                sql_stmnt!(
                    SensorMethodDao,
                    r#"SELECT id, name, http_method, request_body
                        FROM sensor_methods WHERE id = ANY($1) ORDER BY id ASC"#,
                    ids
                )
                .fetch_all(&self.db_conn)
                .await?
            }
            None => {
                sql_stmnt!(
                    SensorMethodDao,
                    r#"SELECT id, name, http_method, request_body
                        FROM sensor_methods ORDER BY id ASC"#
                )
                .fetch_all(&self.db_conn)
                .await?
            }
        };
        Ok(methods)
    }

    async fn create(&self, params: NewSensorMethod) -> Result<i32, DBError> {
        let _guard = self.write_lock.enter().await;

        let record = sql_stmnt!(
            IdRecord,
            r#"INSERT INTO sensor_methods (name, http_method, request_body)
                VALUES ($1, $2, $3) RETURNING id"#,
            &params.name,
            &params.http_method,
            &params.request_body
        )
        .fetch_one(&self.db_conn)
        .await?;
        Ok(record.id)
    }

    async fn delete(&self, remove_id: i32) -> Result<(), DBError> {
        let _guard = self.write_lock.enter().await;

        sql_stmnt!("DELETE FROM sensor_methods WHERE id = $1", remove_id)
            .execute(&self.db_conn)
            .await?;
        Ok(())
    }
}
