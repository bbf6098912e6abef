//! [`HttpGateway`]: the reqwest-backed [`ApiGateway`].

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use panel_api::{
    decode_response, encode_positional, ApiGateway, Args, CallOutput, EncodedArgs, FunctionName,
    GatewayError, ModuleName, ProtocolGeneration, RESPONSE_SIZE_LIMIT,
};
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ConfigError, HttpGatewayConfig};

/// Path of the legacy JSON endpoint that serves API1 and API2.
const JSON_API_PATH: [&str; 2] = ["json-api", "cpanel"];

/// Talks to one control-panel account over HTTPS with token authentication.
///
/// UAPI calls go to `/execute/{module}/{function}`; API1 and API2 calls go to
/// `/json-api/cpanel` with the `cpanel_jsonapi_*` routing parameters. The
/// HTTP client is dropped on [`ApiGateway::close`]; later calls fail with
/// [`GatewayError::Closed`].
pub struct HttpGateway {
    base_url: Url,
    username: String,
    authorization: String,
    client: Mutex<Option<Client>>,
}

impl HttpGateway {
    /// Builds the gateway and its HTTP client from `config`.
    pub fn new(config: HttpGatewayConfig) -> Result<Self, ConfigError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ConfigError::UnusableBaseUrl(config.base_url));
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        debug!(base_url = %config.base_url, username = %config.username, "http gateway ready");

        Ok(Self {
            authorization: format!("cpanel {}:{}", config.username, config.api_token),
            base_url: config.base_url,
            username: config.username,
            client: Mutex::new(Some(client)),
        })
    }

    /// Returns the base URL requests are issued against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns `true` once [`ApiGateway::close`] has run.
    pub fn is_closed(&self) -> bool {
        self.lock_client().is_none()
    }

    fn lock_client(&self) -> std::sync::MutexGuard<'_, Option<Client>> {
        self.client.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn endpoint<'a, I>(&self, segments: I) -> Result<Url, GatewayError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Transport {
                message: format!("base URL {} cannot carry a path", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Routing parameters for the legacy JSON endpoint.
    fn json_api_query(
        &self,
        generation: ProtocolGeneration,
        module: &ModuleName,
        function: &FunctionName,
    ) -> EncodedArgs {
        let mut query = EncodedArgs::new();
        query.push("cpanel_jsonapi_user", self.username.as_str());
        query.push(
            "cpanel_jsonapi_apiversion",
            generation.api_version().to_string(),
        );
        query.push("cpanel_jsonapi_module", module.as_str());
        query.push("cpanel_jsonapi_func", function.as_str());
        query
    }

    async fn execute(
        &self,
        generation: ProtocolGeneration,
        url: Url,
        query: &EncodedArgs,
    ) -> Result<CallOutput, GatewayError> {
        let client = self.lock_client().clone().ok_or(GatewayError::Closed)?;

        debug!(%url, params = query.len(), "sending request");
        let mut response = client
            .get(url)
            .query(query)
            .header(AUTHORIZATION, self.authorization.as_str())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Transport {
                message: format!("HTTP status {status}"),
            });
        }

        if let Some(length) = response.content_length() {
            if length > RESPONSE_SIZE_LIMIT as u64 {
                return Err(GatewayError::ResponseTooLarge {
                    limit: RESPONSE_SIZE_LIMIT,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if body.len() + chunk.len() > RESPONSE_SIZE_LIMIT {
                return Err(GatewayError::ResponseTooLarge {
                    limit: RESPONSE_SIZE_LIMIT,
                });
            }
            body.extend_from_slice(&chunk);
        }
        debug!(bytes = body.len(), "response received");

        decode_response(generation, &body)
    }
}

fn transport(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport {
        message: err.to_string(),
    }
}

#[async_trait]
impl ApiGateway for HttpGateway {
    #[instrument(skip_all, fields(generation = "UAPI", module = %module, function = %function))]
    async fn uapi(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        let url = self.endpoint(["execute", module.as_str(), function.as_str()])?;
        let query = args.encode(ProtocolGeneration::Uapi);
        self.execute(ProtocolGeneration::Uapi, url, &query).await
    }

    #[instrument(skip_all, fields(generation = "API2", module = %module, function = %function))]
    async fn api2(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        let url = self.endpoint(JSON_API_PATH)?;
        let mut query = self.json_api_query(ProtocolGeneration::Api2, module, function);
        query.extend(args.encode(ProtocolGeneration::Api2));
        self.execute(ProtocolGeneration::Api2, url, &query).await
    }

    #[instrument(skip_all, fields(generation = "API1", module = %module, function = %function))]
    async fn api1(
        &self,
        module: &ModuleName,
        function: &FunctionName,
        args: &[String],
    ) -> Result<CallOutput, GatewayError> {
        let url = self.endpoint(JSON_API_PATH)?;
        let mut query = self.json_api_query(ProtocolGeneration::Api1, module, function);
        query.extend(encode_positional(args));
        self.execute(ProtocolGeneration::Api1, url, &query).await
    }

    async fn close(&self) -> Result<(), GatewayError> {
        match self.lock_client().take() {
            Some(_) => debug!(base_url = %self.base_url, "http gateway closed"),
            None => debug!("http gateway already closed"),
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("closed", &self.is_closed())
            .finish()
    }
}
