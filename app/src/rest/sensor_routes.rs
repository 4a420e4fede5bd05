use super::{build_response, not_found, request_info, RequestInfo};
use crate::error::ApiError;
use crate::models::sensor::NewSensor;
use crate::service::SensorService;
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::Filter;

pub fn routes(
    service: &Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    get_sensor(service.clone())
        .or(execute_method(service.clone()))
        .or(list_sensors(service.clone()))
        .or(create_sensor(service.clone()))
        .or(delete_sensor(service.clone()))
}

/// ANY sensor/:id
///
/// Fetch a sensor
///
/// Returns the sensor as json, 404 if the id is not a number or unknown
fn get_sensor(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("sensor" / String))
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, sensor_id: String, req: RequestInfo| async move {
                let sensor_id = match sensor_id.parse::<i32>() {
                    Ok(sensor_id) => sensor_id,
                    Err(_) => return not_found(),
                };
                let resp = service
                    .get(sensor_id)
                    .await
                    .map(|sensor| warp::reply::json(&sensor))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// ANY sensor/:id/:sensor_method
///
/// Sends every method named :sensor_method of the sensor to the device.
/// The name is percent-decoded before matching.
///
/// Returns 200 with an empty body, even if no method matched
fn execute_method(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("sensor" / String / String))
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>,
             sensor_id: String,
             method_name: String,
             req: RequestInfo| async move {
                let sensor_id = match sensor_id.parse::<i32>() {
                    Ok(sensor_id) => sensor_id,
                    Err(_) => return not_found(),
                };
                let method_name = match percent_decode_str(&method_name).decode_utf8() {
                    Ok(method_name) => method_name.into_owned(),
                    Err(_) => return not_found(),
                };
                let resp = service
                    .execute_method(sensor_id, &method_name)
                    .await
                    .map(|_| StatusCode::OK)
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// GET api/sensor
///
/// Returns all sensors ordered by id
fn list_sensors(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "sensor"))
        .and(warp::get())
        .and(request_info())
        .and_then(|service: Arc<SensorService>, req: RequestInfo| async move {
            let resp = service
                .list()
                .await
                .map(|sensors| warp::reply::json(&sensors))
                .map_err(ApiError::from);
            build_response(&req, resp)
        })
        .boxed()
}

/// POST api/sensor
///
/// Register a new sensor
///
/// Returns an `IdDto` with the assigned id
fn create_sensor(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "sensor"))
        .and(warp::post())
        .and(warp::body::content_length_limit(dto::MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, body: NewSensor, req: RequestInfo| async move {
                let resp = service
                    .create(body)
                    .await
                    .map(|id| warp::reply::json(&dto::IdDto { id }))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// DELETE api/sensor/:id
///
/// Unregister a sensor
///
/// Returns 200 whether or not the sensor existed
fn delete_sensor(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "sensor" / String))
        .and(warp::delete())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, sensor_id: String, req: RequestInfo| async move {
                let sensor_id = match sensor_id.parse::<i32>() {
                    Ok(sensor_id) => sensor_id,
                    Err(_) => return not_found(),
                };
                let resp = service
                    .delete(sensor_id)
                    .await
                    .map(|_| warp::reply::json(&dto::IdDto { id: sensor_id }))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

///
/// DTO
///
pub mod dto {
    use serde::{Deserialize, Serialize};

    pub const MAX_BODY_BYTES: u64 = 16 * 1024;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct IdDto {
        pub id: i32,
    }
}
