/// Production API host.
pub const PRODUCTION_URL: &str = "https://www.flow.cl/api";

/// Sandbox API host.
pub const SANDBOX_URL: &str = "https://sandbox.flow.cl/api";

/// Request parameter carrying the merchant's identity key.
pub const API_KEY_FIELD: &str = "apiKey";

/// Request parameter carrying the signature. Computed over every other
/// parameter, never over itself.
pub const SIGNATURE_FIELD: &str = "s";

/// Form field carrying the resource token in confirmation notifications.
pub const TOKEN_FIELD: &str = "token";
