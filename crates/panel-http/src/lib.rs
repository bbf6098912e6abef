//! HTTP transport for the control-panel APIs.
//!
//! Implements the [`panel_api::ApiGateway`] trait over HTTPS with reqwest.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL layout, authentication headers, timeouts, TLS
//! settings and the response-size ceiling all live here. The [`panel_api`]
//! crate sees only [`panel_api::ApiGateway`].
//!
//! ## Endpoints
//!
//! | Generation | Request |
//! |------------|---------|
//! | UAPI | `GET /execute/{module}/{function}?{args}` |
//! | API2 | `GET /json-api/cpanel?cpanel_jsonapi_apiversion=2&...&{args}` |
//! | API1 | `GET /json-api/cpanel?cpanel_jsonapi_apiversion=1&...&{positional args}` |
//!
//! Every request carries `Authorization: cpanel {user}:{token}`.

pub mod config;
pub mod gateway;

pub use config::{ConfigError, HttpGatewayConfig};
pub use gateway::HttpGateway;
