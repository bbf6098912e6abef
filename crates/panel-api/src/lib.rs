//! Protocol normalization for the control-panel remote call APIs.
//!
//! The control panel serves functions over three protocol generations (API1,
//! API2 and UAPI), each with its own argument encoding and its own response
//! envelope. This crate reduces them to one calling convention: a caller
//! names a module, a function and some [`Args`], and gets back a decoded
//! value or a single [`GatewayError`], whichever generation served the call.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no network I/O. It
//! defines *what* a gateway must do ([`ApiGateway`]); transport crates such as
//! `panel-http` define *how*.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | [`ProtocolGeneration`], [`ArgValue`] |
//! | [`identifiers`] | [`ModuleName`], [`FunctionName`] newtypes |
//! | [`args`] | [`Args`] and per-generation encoding |
//! | [`envelope`] | Response envelopes and the error unifier |
//! | [`errors`] | [`RemoteCallFailure`], [`GatewayError`], size limit |
//! | [`response`] | [`decode_response`], the shared decoding path |
//! | [`gateway`] | The [`ApiGateway`] port trait |
//! | [`api`] | The [`Api`] facade |

pub mod api;
pub mod args;
pub mod envelope;
pub mod errors;
pub mod gateway;
pub mod identifiers;
pub mod response;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use api::{Api, Response};
pub use args::{encode_positional, Args, EncodedArgs};
pub use envelope::{
    unify, Api1Data, Api1Response, Api2Envelope, Api2Response, Envelope, EventRecord,
    UapiEnvelope, UapiResponse,
};
pub use errors::{GatewayError, RemoteCallFailure, RESPONSE_SIZE_LIMIT};
pub use gateway::ApiGateway;
pub use identifiers::{FunctionName, ModuleName};
pub use response::{decode_response, CallOutput};
pub use types::{ArgValue, ProtocolGeneration};
