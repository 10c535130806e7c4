use super::*;
use crate::config::ServerConfig;
use linekv_pipeline::{Mode, Pipeline, PipelineConfig, PipelineError};
use linekv_protocol::KeyValue;
use linekv_store::{ConnectOptions, KvStore, RemoteStore, StoreError};
use std::io::Cursor;
use std::net::SocketAddr;

fn test_state() -> ServerState {
    ServerState::new(ServerConfig {
        listen: SocketAddr::from(([127, 0, 0, 1], 0)),
        user: "linekv".into(),
        password: "secret".into(),
        databases: vec!["defaultdb".into(), "other".into()],
    })
}

fn open_request(password: &str, database: &str) -> StoreRequest {
    StoreRequest::OpenSession {
        user: "linekv".into(),
        password: password.into(),
        database: database.into(),
    }
}

#[test]
fn requests_before_open_session_are_refused() {
    let state = test_state();

    let cases = [
        StoreRequest::SetAll {
            kvs: vec![KeyValue::new("K", "V")],
        },
        StoreRequest::GetAll {
            keys: vec![b"K".to_vec()],
        },
        StoreRequest::CloseSession,
    ];

    for request in cases {
        let name = request.name();
        let mut session = None;
        let (response, keep_open) = dispatch(&state, &mut session, request);

        assert!(
            matches!(response, StoreResponse::Error(ref m) if m.contains("requires an open session")),
            "{name}: got {response:?}"
        );
        assert!(!keep_open, "{name}: connection must close");
    }
}

#[test]
fn ping_works_without_session() {
    let state = test_state();
    let mut session = None;

    assert_eq!(
        dispatch(&state, &mut session, StoreRequest::Ping),
        (StoreResponse::Pong, true)
    );
}

#[test]
fn open_session_checks_credentials_and_database() {
    let state = test_state();

    let cases = [
        ("wrong password", open_request("nope", "defaultdb"), "password"),
        ("unknown database", open_request("secret", "missing"), "does not exist"),
    ];

    for (name, request, needle) in cases {
        let mut session = None;
        let (response, keep_open) = dispatch(&state, &mut session, request);

        assert!(
            matches!(response, StoreResponse::Error(ref m) if m.contains(needle)),
            "{name}: got {response:?}"
        );
        assert!(!keep_open, "{name}");
        assert!(session.is_none(), "{name}: no session may be bound");
    }
}

#[test]
fn session_lifecycle() {
    let state = test_state();
    let mut session = None;

    let (opened, _) = dispatch(&state, &mut session, open_request("secret", "defaultdb"));
    assert!(matches!(opened, StoreResponse::SessionOpened { .. }), "got {opened:?}");

    let (again, keep_open) = dispatch(&state, &mut session, open_request("secret", "other"));
    assert!(matches!(again, StoreResponse::Error(_)), "got {again:?}");
    assert!(keep_open, "a second open is refused but keeps the session");

    let (written, _) = dispatch(
        &state,
        &mut session,
        StoreRequest::SetAll {
            kvs: vec![KeyValue::new("A", "1"), KeyValue::new("B", "2")],
        },
    );
    assert_eq!(written, StoreResponse::Written { tx_id: 1, count: 2 });

    let (values, _) = dispatch(
        &state,
        &mut session,
        StoreRequest::GetAll {
            keys: vec![b"B".to_vec(), b"Z".to_vec(), b"A".to_vec()],
        },
    );
    assert_eq!(
        values,
        StoreResponse::Values {
            entries: vec![Some(b"2".to_vec()), None, Some(b"1".to_vec())]
        }
    );

    let (closed, keep_open) = dispatch(&state, &mut session, StoreRequest::CloseSession);
    assert_eq!(closed, StoreResponse::Closed);
    assert!(!keep_open);
    assert!(session.is_none());
}

#[test]
fn rejected_batch_keeps_session_open() {
    let state = test_state();
    let mut session = None;
    dispatch(&state, &mut session, open_request("secret", "defaultdb"));

    let (response, keep_open) = dispatch(&state, &mut session, StoreRequest::SetAll { kvs: vec![] });

    assert!(matches!(response, StoreResponse::Error(_)), "got {response:?}");
    assert!(keep_open);
}

#[test]
fn databases_are_isolated() {
    let state = test_state();

    let mut a = None;
    dispatch(&state, &mut a, open_request("secret", "defaultdb"));
    dispatch(
        &state,
        &mut a,
        StoreRequest::SetAll {
            kvs: vec![KeyValue::new("K", "in-default")],
        },
    );

    let mut b = None;
    dispatch(&state, &mut b, open_request("secret", "other"));
    let (values, _) = dispatch(
        &state,
        &mut b,
        StoreRequest::GetAll {
            keys: vec![b"K".to_vec()],
        },
    );

    assert_eq!(values, StoreResponse::Values { entries: vec![None] });
}

/// A server running on an ephemeral port for the duration of a test.
struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = Arc::new(AtomicBool::new(false));
        let state = Arc::new(test_state());

        let handle = {
            let shutdown = Arc::clone(&shutdown);
            thread::spawn(move || serve(listener, state, shutdown))
        };

        Self {
            addr,
            shutdown,
            handle: Some(handle),
        }
    }

    fn options(&self, password: &str) -> ConnectOptions {
        ConnectOptions {
            addr: self.addr.ip().to_string(),
            port: self.addr.port(),
            user: "linekv".into(),
            password: password.into(),
            database: "defaultdb".into(),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[test]
fn remote_store_talks_to_server() {
    let server = TestServer::start();
    let mut store = RemoteStore::connect(&server.options("secret")).expect("connect");

    store.ping().expect("ping");
    let receipt = store
        .write_batch(&[KeyValue::new("LINE000000000", "hello")])
        .expect("write");
    let values = store
        .read_batch(&[b"LINE000000000".to_vec(), b"LINE000000001".to_vec()])
        .expect("read");
    store.close().expect("close");

    assert_eq!(receipt.count, 1);
    assert_eq!(values, vec![Some(b"hello".to_vec()), None]);
    assert!(matches!(store.ping(), Err(StoreError::Closed)));
}

#[test]
fn remote_store_reports_bad_credentials() {
    let server = TestServer::start();

    let err = RemoteStore::connect(&server.options("wrong")).expect_err("auth must fail");

    assert!(matches!(err, StoreError::Auth(_)), "got {err:?}");
}

#[test]
fn remote_store_surfaces_rejected_batch() {
    let server = TestServer::start();
    let mut store = RemoteStore::connect(&server.options("secret")).expect("connect");

    let err = store
        .write_batch(&[KeyValue::new("K", "1"), KeyValue::new("K", "2")])
        .expect_err("duplicate keys are rejected");

    assert!(matches!(err, StoreError::Rejected(_)), "got {err:?}");
    store.ping().expect("session survives a rejected batch");
}

fn pipeline_run(
    server: &TestServer,
    mode: Mode,
    input: &str,
) -> Result<linekv_pipeline::RunStats, PipelineError> {
    let opts = server.options("secret");
    let cfg = PipelineConfig {
        mode,
        batch_size: 100,
        ..PipelineConfig::default()
    };

    Pipeline::new(cfg)?
        .connect(|| RemoteStore::connect(&opts))?
        .run(Cursor::new(input.as_bytes().to_vec()))
}

#[test]
fn pipeline_round_trip_over_tcp() {
    let server = TestServer::start();
    let input: String = (0..1050).map(|i| format!("record-{i}\n")).collect();

    let written = pipeline_run(&server, Mode::Write, &input).expect("write run");
    let verified = pipeline_run(&server, Mode::Verify, &input).expect("verify run");

    assert_eq!(written.lines, 1050);
    assert_eq!(written.batches, 11);
    assert_eq!(verified.lines, 1050);

    let altered = input.replace("record-1049", "record-XXXX");
    let err = pipeline_run(&server, Mode::Verify, &altered).expect_err("altered input");
    assert!(matches!(err, PipelineError::Mismatch { .. }), "got {err:?}");
}
