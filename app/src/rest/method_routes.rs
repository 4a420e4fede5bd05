use super::sensor_routes::dto::{IdDto, MAX_BODY_BYTES};
use super::{build_response, not_found, request_info, RequestInfo};
use crate::error::ApiError;
use crate::models::sensor_method::NewSensorMethod;
use crate::service::SensorService;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    service: &Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    list_methods(service.clone())
        .or(get_method(service.clone()))
        .or(create_method(service.clone()))
        .or(delete_method(service.clone()))
}

/// GET api/method?ids=1,2
///
/// Returns the sensor methods ordered by id, limited to `ids` if given.
/// Unknown ids are skipped.
fn list_methods(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "method"))
        .and(warp::get())
        .and(warp::query::<dto::MethodQuery>())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, query: dto::MethodQuery, req: RequestInfo| async move {
                let ids = match query.ids() {
                    Ok(ids) => ids,
                    Err(e) => return build_response::<warp::reply::Json>(&req, Err(e)),
                };
                let resp = service
                    .list_methods(ids.as_deref())
                    .await
                    .map(|methods| warp::reply::json(&methods))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// GET api/method/:id
fn get_method(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "method" / String))
        .and(warp::get())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, method_id: String, req: RequestInfo| async move {
                let method_id = match method_id.parse::<i32>() {
                    Ok(method_id) => method_id,
                    Err(_) => return not_found(),
                };
                let resp = service
                    .get_method(method_id)
                    .await
                    .map(|method| warp::reply::json(&method))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// POST api/method
///
/// Stores a new sensor method, assign it to sensors by id
///
/// Returns an `IdDto` with the assigned id
fn create_method(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "method"))
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, body: NewSensorMethod, req: RequestInfo| async move {
                let resp = service
                    .create_method(body)
                    .await
                    .map(|id| warp::reply::json(&IdDto { id }))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

/// DELETE api/method/:id
///
/// Sensors still referencing the method are left untouched
fn delete_method(
    service: Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || service.clone())
        .and(warp::path!("api" / "method" / String))
        .and(warp::delete())
        .and(request_info())
        .and_then(
            |service: Arc<SensorService>, method_id: String, req: RequestInfo| async move {
                let method_id = match method_id.parse::<i32>() {
                    Ok(method_id) => method_id,
                    Err(_) => return not_found(),
                };
                let resp = service
                    .delete_method(method_id)
                    .await
                    .map(|_| warp::reply::json(&IdDto { id: method_id }))
                    .map_err(ApiError::from);
                build_response(&req, resp)
            },
        )
        .boxed()
}

mod dto {
    use crate::error::ApiError;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct MethodQuery {
        ids: Option<String>,
    }

    impl MethodQuery {
        /// Comma separated ids, `None` if the filter is absent
        pub fn ids(&self) -> Result<Option<Vec<i32>>, ApiError> {
            let ids = match &self.ids {
                Some(ids) => ids,
                None => return Ok(None),
            };
            ids.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| id.parse::<i32>())
                .collect::<Result<Vec<i32>, _>>()
                .map(Some)
                .map_err(|e| ApiError::BadRequest(Box::from(e)))
        }
    }

}
