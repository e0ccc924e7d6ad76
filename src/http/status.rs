//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Tabla fija código → reason phrase. Es una tabla constante del proceso:
//! se resuelve con un `match`, sin estado compartido ni locks.
//!
//! - **2xx**: Éxito (200, 201, 204)
//! - **4xx**: Error del cliente (400, 403, 404, 405, 413)
//! - **5xx**: Error del servidor (500, 503)
//!
//! El servidor solo emite 200, 400, 403, 404, 405 y 500; el resto queda
//! disponible en la tabla.

/// Códigos de estado que conoce el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Archivo servido
    Ok = 200,

    /// 201 Created
    Created = 201,

    /// 204 No Content
    NoContent = 204,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 403 Forbidden - El path escapa del webroot
    Forbidden = 403,

    /// 404 Not Found - No hay archivo regular en el path resuelto
    NotFound = 404,

    /// 405 Method Not Allowed - Método válido pero distinto de GET
    MethodNotAllowed = 405,

    /// 413 Payload Too Large
    PayloadTooLarge = 413,

    /// 500 Internal Server Error - Falla al abrir/leer un archivo
    InternalServerError = 500,

    /// 503 Service Unavailable
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use static_http_server::http::StatusCode;
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Busca el código en la tabla. `None` si no está.
    ///
    /// # Ejemplo
    /// ```
    /// use static_http_server::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(405), Some(StatusCode::MethodNotAllowed));
    /// assert_eq!(StatusCode::from_u16(418), None);
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            200 => StatusCode::Ok,
            201 => StatusCode::Created,
            204 => StatusCode::NoContent,
            400 => StatusCode::BadRequest,
            403 => StatusCode::Forbidden,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            413 => StatusCode::PayloadTooLarge,
            500 => StatusCode::InternalServerError,
            503 => StatusCode::ServiceUnavailable,
            _ => return None,
        };
        Some(status)
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use static_http_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
