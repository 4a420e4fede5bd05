use crate::error::ApiError;
use crate::service::SensorService;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warp::filters::BoxedFilter;
use warp::http::{Method, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

mod method_routes;
mod sensor_routes;


/// Method and uri of the request, for error logs
#[derive(Debug, Clone)]
pub(crate) struct RequestInfo {
    method: Method,
    uri: String,
}

pub(crate) fn request_info() -> BoxedFilter<(RequestInfo,)> {
    warp::method()
        .and(warp::path::full())
        .and(
            warp::query::raw()
                .map(Some)
                .or(warp::any().map(|| None))
                .unify(),
        )
        .map(
            |method: Method, path: warp::path::FullPath, query: Option<String>| {
                let uri = match query {
                    Some(query) if !query.is_empty() => format!("{}?{}", path.as_str(), query),
                    _ => path.as_str().to_owned(),
                };
                RequestInfo { method, uri }
            },
        )
        .boxed()
}

pub fn routes(
    service: &Arc<SensorService>,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    sensor_routes::routes(service)
        .or(method_routes::routes(service))
        .recover(handle_rejection)
}

/// Plain status response, the body is the canonical reason phrase
pub(crate) fn status_reply(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or_default();
    warp::reply::with_status(reason, status).into_response()
}

pub(crate) fn not_found() -> Result<Response, Rejection> {
    Ok(status_reply(StatusCode::NOT_FOUND))
}

pub(crate) fn build_response<R: Reply>(
    req: &RequestInfo,
    resp: Result<R, ApiError>,
) -> Result<Response, Rejection> {
    match resp {
        Ok(reply) => Ok(reply.into_response()),
        Err(ApiError::NotFound(err)) => {
            debug!(method = %req.method, uri = %req.uri, "{}", err);
            not_found()
        }
        Err(ApiError::BadRequest(err)) => {
            debug!(method = %req.method, uri = %req.uri, "{}", err);
            Ok(status_reply(StatusCode::BAD_REQUEST))
        }
        Err(ApiError::Internal(err)) => {
            error!(method = %req.method, uri = %req.uri, "{}", err);
            Ok(status_reply(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::InvalidQuery>().is_some()
    {
        StatusCode::BAD_REQUEST
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        StatusCode::UNSUPPORTED_MEDIA_TYPE
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        // only reached once no route with a matching verb rejected
        StatusCode::METHOD_NOT_ALLOWED
    } else {
        warn!("Unhandled rejection: {:?}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok(status_reply(status))
}

/// Serves until ctrl-c, then drains open connections
pub async fn dispatch_server(
    addr: SocketAddr,
    service: Arc<SensorService>,
) -> Result<(), warp::Error> {
    let request_log = warp::log::custom(|info| {
        let ip = info
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        info!(
            ip = %ip,
            proto = ?info.version(),
            method = %info.method(),
            uri = %info.path(),
            status = info.status().as_u16(),
            "received request"
        );
    });
    let routes = routes(&service).with(request_log);
    let (bound_addr, server) = warp::serve(routes).try_bind_with_graceful_shutdown(addr, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed listening for ctrl-c: {}", e);
        }
        info!("Shutting down webserver");
    })?;

    info!("Starting webserver at: {}", bound_addr);
    server.await;
    Ok(())
}
