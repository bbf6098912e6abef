use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use panel_api::{
    decode_response, encode_positional, Api, ApiGateway, Args, CallOutput, EncodedArgs,
    FunctionName, GatewayError, ModuleName, ProtocolGeneration, Response,
};
use serde::Deserialize;
use serde_json::Value;

/// In-memory gateway that answers from canned response bodies.
#[derive(Default)]
struct FakeGateway {
    bodies: HashMap<(ProtocolGeneration, String), Vec<u8>>,
    calls: Mutex<Vec<(ProtocolGeneration, String, EncodedArgs)>>,
    closes: AtomicUsize,
    closed: AtomicBool,
}

impl FakeGateway {
    fn respond(mut self, generation: ProtocolGeneration, function: &str, body: &str) -> Self {
        self.bodies
            .insert((generation, function.to_owned()), body.as_bytes().to_vec());
        self
    }

    fn answer(
        &self,
        generation: ProtocolGeneration,
        function: &FunctionName,
        encoded: EncodedArgs,
    ) -> Result<CallOutput, GatewayError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(GatewayError::Closed);
        }
        self.calls
            .lock()
            .unwrap()
            .push((generation, function.to_string(), encoded));
        let body = self
            .bodies
            .get(&(generation, function.to_string()))
            .ok_or_else(|| GatewayError::Transport {
                message: format!("no canned response for {function}"),
            })?;
        decode_response(generation, body)
    }
}

#[async_trait]
impl ApiGateway for FakeGateway {
    async fn uapi(
        &self,
        _module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        self.answer(
            ProtocolGeneration::Uapi,
            function,
            args.encode(ProtocolGeneration::Uapi),
        )
    }

    async fn api2(
        &self,
        _module: &ModuleName,
        function: &FunctionName,
        args: &Args,
    ) -> Result<CallOutput, GatewayError> {
        self.answer(
            ProtocolGeneration::Api2,
            function,
            args.encode(ProtocolGeneration::Api2),
        )
    }

    async fn api1(
        &self,
        _module: &ModuleName,
        function: &FunctionName,
        args: &[String],
    ) -> Result<CallOutput, GatewayError> {
        self.answer(ProtocolGeneration::Api1, function, encode_positional(args))
    }

    async fn close(&self) -> Result<(), GatewayError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct Pop {
    email: String,
}

#[tokio::test]
async fn uapi_payload_decodes_into_caller_type() {
    let gateway = FakeGateway::default().respond(
        ProtocolGeneration::Uapi,
        "list_pops",
        r#"{"result":{"status":1,"errors":null,"data":[{"email":"a@b.test"}]}}"#,
    );
    let api = Api::new(gateway);

    let pops: Vec<Pop> = api
        .uapi("Email", "list_pops", &Args::new().with("regex", "b.test"))
        .await
        .unwrap();

    assert_eq!(
        pops,
        vec![Pop {
            email: "a@b.test".to_owned()
        }]
    );
}

#[tokio::test]
async fn uapi_messages_reach_the_caller() {
    let gateway = FakeGateway::default().respond(
        ProtocolGeneration::Uapi,
        "add_pop",
        r#"{"result":{"status":1,"errors":[],"messages":["ok"],"data":null}}"#,
    );
    let api = Api::new(gateway);

    let response: Response<Value> = api
        .uapi_with_messages("Email", "add_pop", &Args::new().with("email", "a"))
        .await
        .unwrap();

    assert_eq!(
        response,
        Response {
            data: Value::Null,
            messages: Some("ok".to_owned()),
        }
    );
}

#[tokio::test]
async fn uapi_failure_still_carries_messages() {
    let gateway = FakeGateway::default().respond(
        ProtocolGeneration::Uapi,
        "add_pop",
        r#"{"result":{"status":0,"errors":["quota"],"messages":["try later"]}}"#,
    );
    let api = Api::new(gateway);

    let err = api
        .uapi_with_messages::<Value>("Email", "add_pop", &Args::new())
        .await
        .unwrap_err();

    assert_eq!(err.remote_reason(), Some("quota"));
    assert_eq!(err.remote_messages(), Some("try later"));
}

#[tokio::test]
async fn every_generation_reports_failure_the_same_way() {
    let gateway = FakeGateway::default()
        .respond(
            ProtocolGeneration::Uapi,
            "add_pop",
            r#"{"result":{"status":0,"errors":["bad user"]}}"#,
        )
        .respond(
            ProtocolGeneration::Api2,
            "addpop",
            r#"{"cpanelresult":{"event":{"result":0,"reason":"bad user"}}}"#,
        )
        .respond(
            ProtocolGeneration::Api1,
            "addpop",
            r#"{"error":"bad user","event":{"result":0,"reason":"ignored"}}"#,
        );
    let api = Api::new(gateway);

    let uapi = api.uapi::<Value>("Email", "add_pop", &Args::new()).await;
    let api2 = api.api2::<Value>("Email", "addpop", &Args::new()).await;
    let api1 = api.api1::<Value, &str>("Email", "addpop", &[]).await;

    for result in [uapi, api2, api1] {
        let err = result.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.to_string(), "bad user");
    }
}

#[tokio::test]
async fn api1_positional_args_use_key_splitting() {
    let gateway = Arc::new(FakeGateway::default().respond(
        ProtocolGeneration::Api1,
        "servicestatus",
        r#"{"error":"","event":{"result":1},"data":{"result":"ok"}}"#,
    ));
    let api = Api::new(Arc::clone(&gateway));

    let status: String = api
        .api1("Serverinfo", "servicestatus", &["service=httpd", "verbose"])
        .await
        .unwrap();

    assert_eq!(status, "ok");
    let calls = gateway.calls.lock().unwrap();
    let (_, _, encoded) = &calls[0];
    assert_eq!(encoded.get("service"), Some("httpd"));
    assert_eq!(encoded.get("verbose"), Some(""));
}

#[tokio::test]
async fn close_is_idempotent() {
    let gateway = Arc::new(FakeGateway::default());
    let api = Api::new(Arc::clone(&gateway));

    api.close().await.unwrap();
    api.close().await.unwrap();

    assert_eq!(gateway.closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn calls_after_close_fail_as_closed() {
    let api = Api::new(FakeGateway::default());
    api.close().await.unwrap();

    let err = api
        .uapi::<Value>("Email", "list_pops", &Args::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Closed));
}

#[tokio::test]
async fn detached_facade_closes_trivially() {
    let api = Api::detached();

    assert!(api.gateway().is_none());
    api.close().await.unwrap();
    api.close().await.unwrap();

    let err = api
        .api2::<Value>("Email", "listpops", &Args::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Closed));
}

#[tokio::test]
async fn empty_names_never_reach_the_gateway() {
    let gateway = Arc::new(FakeGateway::default());
    let api = Api::new(Arc::clone(&gateway));

    let err = api
        .uapi::<Value>("", "list_pops", &Args::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidCall { .. }));

    let err = api
        .api2::<Value>("Email", "", &Args::new())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidCall { .. }));

    assert!(gateway.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn mismatched_payload_type_is_a_decode_error() {
    let gateway = FakeGateway::default().respond(
        ProtocolGeneration::Api2,
        "listpops",
        r#"{"cpanelresult":{"event":{"result":1},"data":"not a list"}}"#,
    );
    let api = Api::new(gateway);

    let err = api
        .api2::<Vec<Pop>>("Email", "listpops", &Args::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Decode { .. }));
}

#[tokio::test]
async fn concurrent_calls_share_one_facade() {
    let gateway = FakeGateway::default().respond(
        ProtocolGeneration::Uapi,
        "get_quota",
        r#"{"result":{"status":1,"data":{"used":3}}}"#,
    );
    let api = Arc::new(Api::new(gateway));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let api = Arc::clone(&api);
            tokio::spawn(async move {
                api.uapi::<Value>("Quota", "get_quota", &Args::new().with("n", i))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value["used"], 3);
    }
}
