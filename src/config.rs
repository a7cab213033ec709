use std::env;
use std::io;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Self::from_vars(
            env::var("SPLITBOOK_HOST").ok(),
            env::var("SPLITBOOK_PORT").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>) -> io::Result<Self> {
        let host = host
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match port {
            Some(port) => port.trim().parse().map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("SPLITBOOK_PORT {port:?} is not a valid port: {err}"),
                )
            })?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }
}
