use super::{DeviceRequest, HttpExchange};
use crate::error::SendError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every request instead of sending it
#[derive(Default)]
pub struct RecordingExchange {
    requests: Mutex<Vec<DeviceRequest>>,
    unreachable: Option<String>,
}

impl RecordingExchange {
    pub fn new() -> Self {
        RecordingExchange::default()
    }

    /// Requests to `url` fail, like a device that is offline
    pub fn unreachable(url: &str) -> Self {
        RecordingExchange {
            requests: Mutex::new(Vec::new()),
            unreachable: Some(url.to_owned()),
        }
    }

    pub fn requests(&self) -> Vec<DeviceRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpExchange for RecordingExchange {
    async fn exchange(&self, request: DeviceRequest) -> Result<(), SendError> {
        let offline = self.unreachable.as_deref() == Some(request.url.as_str());
        self.requests.lock().unwrap().push(request.clone());
        if offline {
            return Err(SendError::InvalidUrl(
                request.url,
                "device unreachable".to_owned(),
            ));
        }
        Ok(())
    }
}
