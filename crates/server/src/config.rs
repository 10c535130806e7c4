use std::net::SocketAddr;

use anyhow::{Result, bail};
use clap::Parser;
use linekv_runtime::{DEFAULT_DATABASE, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_USER};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub user: String,
    pub password: String,
    /// Databases clients may open. Each starts empty.
    pub databases: Vec<String>,
}

#[derive(Debug, Parser)]
#[command(name = "linekv-server", about = "In-memory key-value store for linekv")]
pub struct Cli {
    /// Address to listen on [default: 127.0.0.1:3322]
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// User name clients must present
    #[arg(long, default_value = DEFAULT_USER)]
    pub user: String,

    /// Password clients must present
    #[arg(long = "pass", env = "LINEKV_SERVER_PASSWORD", hide_env_values = true, default_value = DEFAULT_PASSWORD)]
    pub password: String,

    /// Database to serve (repeatable) [default: defaultdb]
    #[arg(long = "db")]
    pub databases: Vec<String>,
}

impl ServerConfig {
    pub fn from_args(args: &Cli) -> Result<Self> {
        let listen = args
            .listen
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)));

        let mut databases = args.databases.clone();
        if databases.is_empty() {
            databases.push(DEFAULT_DATABASE.to_string());
        }
        if let Some(blank) = databases.iter().find(|d| d.trim().is_empty()) {
            bail!("invalid database name {blank:?}");
        }

        Ok(Self {
            listen,
            user: args.user.clone(),
            password: args.password.clone(),
            databases,
        })
    }

    pub fn from_env() -> Result<Self> {
        let args = Cli::parse();
        Self::from_args(&args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("linekv-server").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn defaults() {
        let cfg = ServerConfig::from_args(&parse(&[])).expect("config");

        assert_eq!(cfg.listen, "127.0.0.1:3322".parse::<SocketAddr>().expect("addr"));
        assert_eq!(cfg.user, "linekv");
        assert_eq!(cfg.databases, vec!["defaultdb".to_string()]);
    }

    #[test]
    fn repeated_db_flags_collect() {
        let cfg = ServerConfig::from_args(&parse(&[
            "--listen", "0.0.0.0:4000", "--db", "a", "--db", "b",
        ]))
        .expect("config");

        assert_eq!(cfg.listen.port(), 4000);
        assert_eq!(cfg.databases, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn blank_database_is_rejected() {
        assert!(ServerConfig::from_args(&parse(&["--db", " "])).is_err());
    }
}
