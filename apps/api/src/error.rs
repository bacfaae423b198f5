//! # API Error Types
//!
//! Every handler returns `Result<_, ApiError>`; the error renders itself as
//! a JSON body with the matching status code.
//!
//! ## Mapping
//! ```text
//! ┌──────────────────────────────────┬────────┬──────────────────────────┐
//! │ Source                           │ Status │ code                     │
//! ├──────────────────────────────────┼────────┼──────────────────────────┤
//! │ ValidationError / validator      │  400   │ VALIDATION_ERROR         │
//! │ malformed JSON, missing param    │  400   │ BAD_REQUEST              │
//! │ missing / invalid token          │  401   │ UNAUTHORIZED             │
//! │ StoreError::NotFound             │  404   │ NOT_FOUND                │
//! │ StoreError::Duplicate / Conflict │  409   │ CONFLICT                 │
//! │ backend down (health)            │  503   │ UNAVAILABLE              │
//! │ everything else                  │  500   │ INTERNAL_ERROR           │
//! └──────────────────────────────────┴────────┴──────────────────────────┘
//! ```
//!
//! Body shape: `{"error": "...", "code": "...", "details": [{"campo", "mensaje"}]}`.
//! Internal messages are logged, never sent to the client.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use vending_core::{CoreError, ValidationError};
use vending_store::StoreError;

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetalleError {
    pub campo: String,
    pub mensaje: String,
}

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Datos inválidos")]
    Validation(Vec<DetalleError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unavailable(_) => "UNAVAILABLE",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 401 with the message every protected route uses.
    pub fn unauthenticated() -> Self {
        ApiError::Unauthorized("Usuario no autenticado".to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [DetalleError]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Error interno del servidor".to_string()
            }
            other => other.to_string(),
        };

        let details = match &self {
            ApiError::Validation(details) => Some(details.as_slice()),
            _ => None,
        };

        let body = ErrorBody {
            error: message,
            code: self.code(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Conversions
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} no encontrado: {id}"))
            }
            StoreError::Duplicate { field, .. } if field == "email" => {
                ApiError::Conflict("Este email ya está registrado".to_string())
            }
            StoreError::Duplicate { field, value } => {
                ApiError::Conflict(format!("{field} '{value}' ya existe"))
            }
            StoreError::Conflict { .. } => ApiError::Conflict(
                "Los datos cambiaron mientras se guardaban, intenta de nuevo".to_string(),
            ),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MachineNotFound(id) => {
                ApiError::NotFound(format!("Máquina no encontrada: {id}"))
            }
            CoreError::PlaceNotFound(id) => ApiError::NotFound(format!("Lugar no encontrado: {id}")),
            e @ CoreError::UnknownCompartment { .. } => ApiError::BadRequest(e.to_string()),
            CoreError::Validation(v) => v.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(vec![detalle(&err)])
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errs: Vec<ValidationError>) -> Self {
        ApiError::Validation(errs.iter().map(detalle).collect())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errs: ValidationErrors) -> Self {
        let mut details = Vec::new();
        flatten(&errs, "", &mut details);
        details.sort_by(|a, b| a.campo.cmp(&b.campo));
        ApiError::Validation(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Datos inválidos: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn detalle(err: &ValidationError) -> DetalleError {
    DetalleError {
        campo: err.field().to_string(),
        mensaje: err.to_string(),
    }
}

/// Walks nested validator errors, producing `campo` paths in the client's
/// camelCase spelling (`rellenos[0].compartimentoId`).
fn flatten(errs: &ValidationErrors, prefix: &str, out: &mut Vec<DetalleError>) {
    for (field, kind) in errs.errors() {
        let campo = format!("{prefix}{}", camel_case(&field.to_string()));
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let mensaje = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{campo} no es válido ({})", e.code));
                    out.push(DetalleError {
                        campo: campo.clone(),
                        mensaje,
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                flatten(inner, &format!("{campo}."), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(inner, &format!("{campo}[{index}]."), out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::unauthenticated().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(StoreError::not_found("Maquina", "m1")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StoreError::duplicate("email", "a@b.c")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StoreError::Backend("boom".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_details() {
        let err: ApiError = vec![
            ValidationError::Required {
                field: "nombre".to_string(),
            },
            ValidationError::Negative {
                field: "ingresos".to_string(),
            },
        ]
        .into();

        match err {
            ApiError::Validation(details) => {
                assert_eq!(details.len(), 2);
                assert_eq!(details[0].campo, "nombre");
                assert_eq!(details[1].campo, "ingresos");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("compartimento_id"), "compartimentoId");
        assert_eq!(camel_case("email"), "email");
    }
}
