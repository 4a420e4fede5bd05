use super::{IdRecord, Repository, WriteLock};
use crate::error::DBError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorDao {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) sensor_type: String,
    pub(crate) chip: String,
    pub(crate) board: String,
    pub(crate) ip: String,
    #[serde(
        rename = "sensorMethodIDs",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub(crate) sensor_method_ids: Vec<i32>,
}

impl SensorDao {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &String {
        &self.name
    }

    /// Network address of the device, used verbatim as request target
    pub fn ip(&self) -> &String {
        &self.ip
    }

    pub fn sensor_method_ids(&self) -> &[i32] {
        &self.sensor_method_ids
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewSensor {
    pub name: String,
    pub sensor_type: String,
    pub chip: String,
    pub board: String,
    pub ip: String,
    #[serde(rename = "sensorMethodIDs", default)]
    pub sensor_method_ids: Vec<i32>,
}

impl NewSensor {
    pub(crate) fn into_dao(self, id: i32) -> SensorDao {
        SensorDao {
            id,
            name: self.name,
            sensor_type: self.sensor_type,
            chip: self.chip,
            board: self.board,
            ip: self.ip,
            sensor_method_ids: self.sensor_method_ids,
        }
    }
}

pub struct SensorRepository {
    db_conn: sqlx::PgPool,
    write_lock: WriteLock,
}

impl SensorRepository {
    pub fn new(db_conn: &sqlx::PgPool) -> Self {
        SensorRepository {
            db_conn: db_conn.clone(),
            write_lock: WriteLock::new(),
        }
    }
}

#[async_trait]
impl Repository for SensorRepository {
    type Row = SensorDao;
    type CreateParams = NewSensor;

    async fn find(&self, id: i32) -> Result<SensorDao, DBError> {
        sql_stmnt!(
            SensorDao,
            r#"SELECT id, name, sensor_type, chip, board, ip, sensor_method_ids
                FROM sensors WHERE id = $1 LIMIT 1"#,
            id
        )
        .fetch_optional(&self.db_conn)
        .await?
        .ok_or(DBError::SensorNotFound(id))
    }

    /// An absent or empty filter returns every sensor
    async fn find_all(&self, ids: Option<&[i32]>) -> Result<Vec<SensorDao>, DBError> {
        let sensors = match ids {
            Some(ids) if !ids.is_empty() => {
                sql_stmnt!(
                    SensorDao,
                    r#"SELECT id, name, sensor_type, chip, board, ip, sensor_method_ids
                        FROM sensors WHERE id = ANY($1) ORDER BY id ASC"#,
                    ids
                )
                .fetch_all(&self.db_conn)
                .await?
            }
            _ => {
                sql_stmnt!(
                    SensorDao,
                    r#"SELECT id, name, sensor_type, chip, board, ip, sensor_method_ids
                        FROM sensors ORDER BY id ASC"#
                )
                .fetch_all(&self.db_conn)
                .await?
            }
        };
        Ok(sensors)
    }

    async fn create(&self, params: NewSensor) -> Result<i32, DBError> {
        let _guard = self.write_lock.enter().await;

        let record = sql_stmnt!(
            IdRecord,
            r#"INSERT INTO sensors (name, sensor_type, chip, board, ip, sensor_method_ids)
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING id"#,
            &params.name,
            &params.sensor_type,
            &params.chip,
            &params.board,
            &params.ip,
            &params.sensor_method_ids
        )
        .fetch_one(&self.db_conn)
        .await?;
        Ok(record.id)
    }

    async fn delete(&self, remove_id: i32) -> Result<(), DBError> {
        let _guard = self.write_lock.enter().await;

        sql_stmnt!("DELETE FROM sensors WHERE id = $1", remove_id)
            .execute(&self.db_conn)
            .await?;
        Ok(())
    }
}
