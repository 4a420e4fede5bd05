use super::sensor::{NewSensor, SensorDao};
use super::sensor_method::{NewSensorMethod, SensorMethodDao};
use super::{Repository, WriteLock};
use crate::error::DBError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Mutex;

pub trait MemoryRow: Clone + Send + Sync + 'static {
    type Params: Send + 'static;
    /// Whether `find_all(Some(&[]))` returns every row
    const EMPTY_FILTER_IS_ALL: bool;

    fn build(id: i32, params: Self::Params) -> Self;
    fn row_id(&self) -> i32;
    fn not_found(id: i32) -> DBError;
}

impl MemoryRow for SensorDao {
    type Params = NewSensor;
    const EMPTY_FILTER_IS_ALL: bool = true;

    fn build(id: i32, params: NewSensor) -> Self {
        params.into_dao(id)
    }

    fn row_id(&self) -> i32 {
        self.id()
    }

    fn not_found(id: i32) -> DBError {
        DBError::SensorNotFound(id)
    }
}

impl MemoryRow for SensorMethodDao {
    type Params = NewSensorMethod;
    const EMPTY_FILTER_IS_ALL: bool = false;

    fn build(id: i32, params: NewSensorMethod) -> Self {
        params.into_dao(id)
    }

    fn row_id(&self) -> i32 {
        self.id()
    }

    fn not_found(id: i32) -> DBError {
        DBError::SensorMethodNotFound(id)
    }
}

/// Table kept in memory, with the same contract as the postgres repositories
pub struct MemoryRepository<T: MemoryRow> {
    rows: Mutex<BTreeMap<i32, T>>,
    last_id: AtomicI32,
    write_lock: WriteLock,
    failing: AtomicBool,
}

impl<T: MemoryRow> MemoryRepository<T> {
    pub fn new() -> Self {
        MemoryRepository {
            rows: Mutex::new(BTreeMap::new()),
            last_id: AtomicI32::new(0),
            write_lock: WriteLock::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_rows(rows: Vec<T>) -> Self {
        let repo = MemoryRepository::new();
        {
            let mut table = repo.rows.lock().unwrap();
            for row in rows {
                repo.last_id.fetch_max(row.row_id(), Ordering::SeqCst);
                table.insert(row.row_id(), row);
            }
        }
        repo
    }

    /// Every following call fails like a broken store connection
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), DBError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DBError::SQLError(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: MemoryRow> Repository for MemoryRepository<T> {
    type Row = T;
    type CreateParams = T::Params;

    async fn find(&self, id: i32) -> Result<T, DBError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        rows.get(&id).cloned().ok_or_else(|| T::not_found(id))
    }

    async fn find_all(&self, ids: Option<&[i32]>) -> Result<Vec<T>, DBError> {
        self.check()?;
        let rows = self.rows.lock().unwrap();
        let all = match ids {
            None => true,
            Some(ids) => ids.is_empty() && T::EMPTY_FILTER_IS_ALL,
        };
        Ok(rows
            .values()
            .filter(|row| all || ids.map_or(false, |ids| ids.contains(&row.row_id())))
            .cloned()
            .collect())
    }

    async fn create(&self, params: T::Params) -> Result<i32, DBError> {
        let _guard = self.write_lock.enter().await;
        self.check()?;

        let id = self.last_id.load(Ordering::SeqCst) + 1;
        // a writer slipping in here would read the same id
        tokio::task::yield_now().await;
        self.last_id.store(id, Ordering::SeqCst);
        self.rows.lock().unwrap().insert(id, T::build(id, params));
        Ok(id)
    }

    async fn delete(&self, id: i32) -> Result<(), DBError> {
        let _guard = self.write_lock.enter().await;
        self.check()?;

        self.rows.lock().unwrap().remove(&id);
        Ok(())
    }
}

pub type MemorySensorRepository = MemoryRepository<SensorDao>;
pub type MemorySensorMethodRepository = MemoryRepository<SensorMethodDao>;

pub fn sensor(id: i32, ip: &str, sensor_method_ids: Vec<i32>) -> SensorDao {
    SensorDao {
        id,
        name: format!("Sensor {}", id),
        sensor_type: "soil_moisture".to_owned(),
        chip: "esp8266".to_owned(),
        board: "nodemcu".to_owned(),
        ip: ip.to_owned(),
        sensor_method_ids,
    }
}

pub fn sensor_method(id: i32, name: &str, http_method: &str, request_body: &str) -> SensorMethodDao {
    SensorMethodDao {
        id,
        name: name.to_owned(),
        http_method: http_method.to_owned(),
        request_body: request_body.to_owned(),
    }
}
