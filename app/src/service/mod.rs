use crate::device::{DeviceRequest, HttpExchange};
use crate::error::{DBError, ServiceError};
use crate::models::sensor::{NewSensor, SensorDao};
use crate::models::sensor_method::{NewSensorMethod, SensorMethodDao};
use crate::models::Repository;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};


pub type SensorStore = dyn Repository<Row = SensorDao, CreateParams = NewSensor>;
pub type SensorMethodStore = dyn Repository<Row = SensorMethodDao, CreateParams = NewSensorMethod>;

/// Single entry point of the handlers into the sensor and method stores
pub struct SensorService {
    sensors: Arc<SensorStore>,
    sensor_methods: Arc<SensorMethodStore>,
    exchange: Arc<dyn HttpExchange>,
}

impl Debug for SensorService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorService").finish()
    }
}

impl SensorService {
    pub fn new(
        sensors: Arc<SensorStore>,
        sensor_methods: Arc<SensorMethodStore>,
        exchange: Arc<dyn HttpExchange>,
    ) -> Arc<Self> {
        Arc::new(SensorService {
            sensors,
            sensor_methods,
            exchange,
        })
    }

    pub async fn list(&self) -> Result<Vec<SensorDao>, DBError> {
        self.sensors.find_all(None).await
    }

    pub async fn list_methods(
        &self,
        sensor_method_ids: Option<&[i32]>,
    ) -> Result<Vec<SensorMethodDao>, DBError> {
        self.sensor_methods.find_all(sensor_method_ids).await
    }

    pub async fn create(&self, sensor: NewSensor) -> Result<i32, DBError> {
        self.sensors.create(sensor).await
    }

    pub async fn create_method(&self, sensor_method: NewSensorMethod) -> Result<i32, DBError> {
        self.sensor_methods.create(sensor_method).await
    }

    pub async fn get(&self, sensor_id: i32) -> Result<SensorDao, DBError> {
        self.sensors.find(sensor_id).await
    }

    pub async fn get_method(&self, sensor_method_id: i32) -> Result<SensorMethodDao, DBError> {
        self.sensor_methods.find(sensor_method_id).await
    }

    pub async fn delete(&self, sensor_id: i32) -> Result<(), DBError> {
        self.sensors.delete(sensor_id).await
    }

    pub async fn delete_method(&self, sensor_method_id: i32) -> Result<(), DBError> {
        self.sensor_methods.delete(sensor_method_id).await
    }

    /// Sends every method of the sensor named `method_name` to the sensor.
    ///
    /// Matches are sent one after another in id order and the first failed
    /// send aborts the rest. Device responses are not inspected, and a name
    /// without any match sends nothing and still succeeds.
    #[tracing::instrument(skip(self))]
    pub async fn execute_method(
        &self,
        sensor_id: i32,
        method_name: &str,
    ) -> Result<(), ServiceError> {
        let sensor = match self.get(sensor_id).await {
            Ok(sensor) => sensor,
            Err(e) if e.is_not_found() => return Err(ServiceError::SensorNotFound(sensor_id, e)),
            Err(e) => return Err(e.into()),
        };

        let sensor_methods = self.list_methods(Some(sensor.sensor_method_ids())).await?;
        if sensor_methods.is_empty() {
            return Err(ServiceError::NoMethods(sensor_id));
        }

        let mut sent = 0;
        for sensor_method in sensor_methods.iter().filter(|m| m.name() == method_name) {
            let request = DeviceRequest::json(
                sensor_method.http_method(),
                sensor.ip(),
                sensor_method.request_body(),
            );
            debug!(
                sensor_method_id = sensor_method.id(),
                "{} {}", request.method, request.url
            );
            self.exchange.exchange(request).await?;
            sent += 1;
        }

        if sent == 0 {
            info!("Sensor {} has no method {}", sensor.name(), method_name);
        }
        Ok(())
    }
}
