use std::net::TcpStream;

use linekv_protocol::{
    KeyValue, StoreRequest, StoreResponse,
    codec::{read_message, write_message},
};
use log::{debug, info};

use crate::{KvStore, Result, StoreError, WriteReceipt};

/// Where and as whom to open a store session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub addr: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// A store session over TCP.
///
/// The session is bound to the connection: it is opened by [`connect`] and
/// ends with [`close`] or when the value is dropped.
///
/// [`connect`]: RemoteStore::connect
/// [`close`]: RemoteStore::close
#[derive(Debug)]
pub struct RemoteStore {
    stream: Option<TcpStream>,
    session_id: u64,
}

impl RemoteStore {
    /// Dial the server and open a session on `opts.database`.
    pub fn connect(opts: &ConnectOptions) -> Result<Self> {
        debug!("Connecting to {}:{}", opts.addr, opts.port);
        let stream = TcpStream::connect((opts.addr.as_str(), opts.port))?;
        stream.set_nodelay(true)?;

        let mut store = Self {
            stream: Some(stream),
            session_id: 0,
        };

        let open = StoreRequest::OpenSession {
            user: opts.user.clone(),
            password: opts.password.clone(),
            database: opts.database.clone(),
        };

        match store.exchange(&open)? {
            StoreResponse::SessionOpened { session_id } => {
                store.session_id = session_id;
                info!(
                    "Opened session {session_id} on {}:{}/{}",
                    opts.addr, opts.port, opts.database
                );
                Ok(store)
            }
            StoreResponse::Error(msg) => Err(StoreError::Auth(msg)),
            other => Err(unexpected(&open, &other)),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        let req = StoreRequest::Ping;
        match self.call(&req)? {
            StoreResponse::Pong => Ok(()),
            other => Err(unexpected(&req, &other)),
        }
    }

    /// End the session. Further requests fail with [`StoreError::Closed`].
    pub fn close(&mut self) -> Result<()> {
        if self.stream.is_none() {
            return Ok(());
        }

        let req = StoreRequest::CloseSession;
        let res = self.call(&req);
        self.stream = None;

        match res? {
            StoreResponse::Closed => {
                debug!("Closed session {}", self.session_id);
                Ok(())
            }
            other => Err(unexpected(&req, &other)),
        }
    }

    /// Send one request and wait for its response, translating server-side
    /// errors into [`StoreError::Rejected`].
    fn call(&mut self, req: &StoreRequest) -> Result<StoreResponse> {
        match self.exchange(req)? {
            StoreResponse::Error(msg) => Err(StoreError::Rejected(msg)),
            resp => Ok(resp),
        }
    }

    fn exchange(&mut self, req: &StoreRequest) -> Result<StoreResponse> {
        let stream = self.stream.as_mut().ok_or(StoreError::Closed)?;
        write_message(stream, req)?;
        Ok(read_message(stream)?)
    }
}

impl KvStore for RemoteStore {
    fn write_batch(&mut self, kvs: &[KeyValue]) -> Result<WriteReceipt> {
        let req = StoreRequest::SetAll { kvs: kvs.to_vec() };
        match self.call(&req)? {
            StoreResponse::Written { tx_id, count } => Ok(WriteReceipt {
                tx_id,
                count: count as usize,
            }),
            other => Err(unexpected(&req, &other)),
        }
    }

    fn read_batch(&mut self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>> {
        let req = StoreRequest::GetAll {
            keys: keys.to_vec(),
        };
        match self.call(&req)? {
            StoreResponse::Values { entries } => Ok(entries),
            other => Err(unexpected(&req, &other)),
        }
    }
}

impl Drop for RemoteStore {
    fn drop(&mut self) {
        if self.stream.is_some()
            && let Err(err) = self.close()
        {
            debug!("Failed to close session {} on drop: {err}", self.session_id);
        }
    }
}

fn unexpected(req: &StoreRequest, resp: &StoreResponse) -> StoreError {
    StoreError::Unexpected {
        request: req.name(),
        response: resp.name().to_string(),
    }
}
