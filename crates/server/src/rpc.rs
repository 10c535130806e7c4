use std::io;
use std::net::{TcpListener, TcpStream};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use linekv_protocol::codec::{read_message_opt, write_message};
use linekv_protocol::{StoreRequest, StoreResponse};
use linekv_store::Table;
use log::{debug, error, info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

use crate::state::{ServerState, Session};

/// How often the accept loop checks for shutdown while idle.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

pub fn run_rpc_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));

    // Register signal handlers. They only set the atomic flag
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, Arc::clone(&shutdown))
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }

    let listen = state.config.listen;
    let listener =
        TcpListener::bind(listen).with_context(|| format!("Failed to bind {listen}"))?;

    serve(listener, state, shutdown)
}

/// Accept connections on `listener` until `shutdown` is set.
pub fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    shutdown: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    listener
        .set_nonblocking(true)
        .context("Failed to make listener non-blocking")?;

    info!("linekv server listening on {}", listener.local_addr()?);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Shutdown signal observed; stopping RPC server.");
            break;
        }

        match listener.accept() {
            Ok((stream, addr)) => {
                debug!("Accepted connection from {addr}");
                let state = state.clone();
                thread::spawn(move || {
                    if let Err(err) = handle_client(stream, state) {
                        error!("Error while handling client {addr}: {err:#}");
                    }
                });
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                error!("Accept error: {err}");
                thread::sleep(ACCEPT_POLL);
            }
        }
    }

    info!("RPC server shutdown complete.");
    Ok(())
}

fn handle_client(mut stream: TcpStream, state: Arc<ServerState>) -> anyhow::Result<()> {
    // Accepted sockets inherit the listener's non-blocking mode on some platforms.
    stream.set_nonblocking(false)?;
    stream.set_nodelay(true)?;

    let mut session: Option<Session> = None;

    loop {
        let Some(request) = read_message_opt::<_, StoreRequest>(&mut stream)
            .context("Failed to read StoreRequest")?
        else {
            debug!("Client disconnected");
            return Ok(());
        };

        debug!("Received {} request", request.name());

        let (response, keep_open) = dispatch(&state, &mut session, request);

        write_message(&mut stream, &response).context("Failed to write StoreResponse")?;

        if !keep_open {
            return Ok(());
        }
    }
}

/// Answer one request. The second value is false when the connection should
/// be closed after the response is sent.
pub fn dispatch(
    state: &ServerState,
    session: &mut Option<Session>,
    request: StoreRequest,
) -> (StoreResponse, bool) {
    let Some(open) = session.as_ref() else {
        return dispatch_unbound(state, session, request);
    };

    match request {
        StoreRequest::OpenSession { .. } => (
            StoreResponse::Error("session already open on this connection".into()),
            true,
        ),
        StoreRequest::Ping => (StoreResponse::Pong, true),
        StoreRequest::CloseSession => {
            debug!("Session {} closed", open.id);
            *session = None;
            (StoreResponse::Closed, false)
        }
        StoreRequest::SetAll { kvs } => with_table(open, |table| match table.set_all(&kvs) {
            Ok(receipt) => StoreResponse::Written {
                tx_id: receipt.tx_id,
                count: u32::try_from(receipt.count).unwrap_or(u32::MAX),
            },
            Err(err) => StoreResponse::Error(err.to_string()),
        }),
        StoreRequest::GetAll { keys } => with_table(open, |table| StoreResponse::Values {
            entries: table.get_all(&keys),
        }),
    }
}

/// Requests on a connection without a session: only opening one (or a ping)
/// is allowed.
fn dispatch_unbound(
    state: &ServerState,
    session: &mut Option<Session>,
    request: StoreRequest,
) -> (StoreResponse, bool) {
    match request {
        StoreRequest::OpenSession {
            user,
            password,
            database,
        } => match state.open_session(&user, &password, &database) {
            Ok(opened) => {
                let session_id = opened.id;
                *session = Some(opened);
                (StoreResponse::SessionOpened { session_id }, true)
            }
            Err(msg) => {
                warn!("Refused session for {user:?} on {database:?}: {msg}");
                (StoreResponse::Error(msg), false)
            }
        },
        StoreRequest::Ping => (StoreResponse::Pong, true),
        other => (
            StoreResponse::Error(format!("{} requires an open session", other.name())),
            false,
        ),
    }
}

fn with_table<F>(session: &Session, f: F) -> (StoreResponse, bool)
where
    F: FnOnce(&mut Table) -> StoreResponse,
{
    match session.table.lock() {
        Ok(mut table) => (f(&mut table), true),
        Err(_) => (
            StoreResponse::Error(format!("database {} is unavailable", session.database)),
            false,
        ),
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
