use std::convert::Infallible;

use serde::Serialize;
use warp::{http::StatusCode, reject::Rejection, reply::Reply};

/// Outward error carried through every action. The code is the
/// HTTP-equivalent status the boundary replies with.
#[derive(Debug, Clone, thiserror::Error)]
#[error("error {code}: {info:?}")]
pub struct Error {
    pub code: u16,
    pub info: Option<String>,
}

impl warp::reject::Reject for Error {}

#[derive(Debug, Clone, Copy)]
pub enum HttpError {
    InvalidRequest,
    Unauthorized,
    NotFound,
    InvalidSession,
    InternalServerError,
}

impl HttpError {
    fn code(self) -> u16 {
        match self {
            HttpError::InvalidRequest => 400,
            HttpError::Unauthorized => 401,
            HttpError::NotFound => 404,
            HttpError::InvalidSession => 401,
            HttpError::InternalServerError => 500,
        }
    }

    pub fn new(self, info: &str) -> Error {
        Error {
            code: self.code(),
            info: Some(info.to_string()),
        }
    }

    pub fn default(self) -> Error {
        let info = match self {
            HttpError::InvalidRequest => "Invalid request",
            HttpError::Unauthorized => "Unauthorized",
            HttpError::NotFound => "Not found",
            HttpError::InvalidSession => "Invalid session",
            HttpError::InternalServerError => "Internal server error",
        };

        Error {
            code: self.code(),
            info: Some(info.to_string()),
        }
    }
}

pub struct QueryError {
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Configuration(e) => Self::new(format!("{e}")),
            sqlx::Error::Database(e) => Self::new(format!("{e}")),
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Tls(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(format!("{e}")),
            sqlx::Error::RowNotFound => Self::new(format!("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(format!("{e}")),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::AnyDriverError(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(format!("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(format!("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(format!("Worker crashed")),
            sqlx::Error::Migrate(e) => Self::new(format!("{e}")),
            _ => Self::new(format!("Unknown error")),
        }
    }
}

impl From<QueryError> for Error {
    fn from(value: QueryError) -> Error {
        Error {
            code: 500,
            info: Some(value.info),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("({info})")]
pub struct TypeError {
    info: String,
}

impl TypeError {
    pub fn new(info: &str) -> Self {
        Self {
            info: info.to_string(),
        }
    }
}

impl From<TypeError> for Error {
    fn from(value: TypeError) -> Self {
        HttpError::InvalidRequest.new(&value.info)
    }
}

impl From<TypeError> for Rejection {
    fn from(value: TypeError) -> Self {
        warp::reject::custom(HttpError::InvalidRequest.new(&value.info))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    error: String,
}

/// Recovery handler for the consuming server: turns rejections into JSON
/// replies carrying the taxonomy code.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, error) = if err.is_not_found() {
        (404, String::from("Not found"))
    } else if let Some(e) = err.find::<Error>() {
        (
            e.code,
            e.info.clone().unwrap_or_else(|| String::from("Error")),
        )
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (400, format!("{e}"))
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (405, String::from("Method not allowed"))
    } else {
        log::error!("Unhandled rejection: {err:?}");
        (500, String::from("Internal server error"))
    };

    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { code, error }),
        status,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_codes() {
        assert_eq!(HttpError::InvalidRequest.default().code, 400);
        assert_eq!(HttpError::Unauthorized.default().code, 401);
        assert_eq!(HttpError::InvalidSession.default().code, 401);
        assert_eq!(HttpError::NotFound.default().code, 404);
        assert_eq!(HttpError::InternalServerError.default().code, 500);
    }

    #[test]
    fn query_errors_are_fatal() {
        let error: Error = QueryError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(error.code, 500);
        assert_eq!(error.info.as_deref(), Some("RowNotFound"));
    }

    #[test]
    fn type_errors_are_validation_errors() {
        let error: Error = TypeError::new("Missing title").into();
        assert_eq!(error.code, 400);
        assert_eq!(error.info.as_deref(), Some("Missing title"));
    }
}
