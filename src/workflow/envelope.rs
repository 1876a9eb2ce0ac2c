use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};

pub const NOT_CONFIGURED: &str = "NOT_CONFIGURED";
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
pub const MALFORMED_RESPONSE: &str = "MALFORMED_RESPONSE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowError {
    pub code: String,
    pub message: String,
}

impl WorkflowError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_configured() -> Self {
        Self::new(
            NOT_CONFIGURED,
            "workflow backend is not configured. Set N8N_BACKEND_URL and N8N_API_KEY",
        )
    }

    pub fn network(cause: impl Into<String>) -> Self {
        Self::new(NETWORK_ERROR, cause)
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN_ERROR, "An error occurred")
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::new(MALFORMED_RESPONSE, detail)
    }
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub timestamp: String,
    pub workflow_id: String,
    pub execution_time_ms: u64,
}

/// 工作流调用结果。成功时必有数据，失败时必有错误。
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success {
        data: T,
        metadata: Option<WorkflowMetadata>,
    },
    Failure(WorkflowError),
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success { data, .. } => Some(data),
            Envelope::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<T, WorkflowError> {
        match self {
            Envelope::Success { data, .. } => Ok(data),
            Envelope::Failure(err) => Err(err),
        }
    }
}

/// 线上格式，字段全部可选，由 [`Envelope::from_wire`] 校验
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct WireEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<WorkflowError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<WorkflowMetadata>,
}

/// 非 2xx 响应只关心 error 字段
#[derive(Debug, Deserialize)]
pub(crate) struct WireErrorBody {
    pub error: Option<PartialError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PartialError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// 解析 2xx 响应体
    pub fn from_wire(body: &[u8]) -> Self {
        let wire: WireEnvelope<serde_json::Value> = match serde_json::from_slice(body) {
            Ok(wire) => wire,
            Err(e) => return Envelope::Failure(WorkflowError::malformed(e.to_string())),
        };

        match (wire.success, wire.data, wire.error) {
            (true, _, Some(_)) => {
                Envelope::Failure(WorkflowError::malformed("success response carries an error"))
            }
            (true, Some(data), None) => match serde_json::from_value::<T>(data) {
                Ok(data) => Envelope::Success {
                    data,
                    metadata: wire.metadata,
                },
                Err(e) => Envelope::Failure(WorkflowError::malformed(format!(
                    "unexpected data shape: {}",
                    e
                ))),
            },
            (true, None, None) => {
                Envelope::Failure(WorkflowError::malformed("success response without data"))
            }
            (false, _, Some(err)) => Envelope::Failure(err),
            (false, _, None) => {
                Envelope::Failure(WorkflowError::malformed("failure response without error"))
            }
        }
    }

    /// 解析非 2xx 响应体，取不到错误时为 UNKNOWN_ERROR
    pub fn from_error_body(body: &[u8]) -> Self {
        let error = serde_json::from_slice::<WireErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        let fallback = WorkflowError::unknown();
        Envelope::Failure(match error {
            Some(err) => WorkflowError {
                code: err.code.unwrap_or(fallback.code),
                message: err.message.unwrap_or(fallback.message),
            },
            None => fallback,
        })
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Envelope::Success { data, metadata } => WireEnvelope {
                success: true,
                data: Some(data),
                error: None,
                metadata: metadata.clone(),
            },
            Envelope::Failure(err) => WireEnvelope {
                success: false,
                data: None,
                error: Some(err.clone()),
                metadata: None,
            },
        };
        wire.serialize(serializer)
    }
}
