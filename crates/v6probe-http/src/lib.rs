// # reqwest HTTP Probe
//
// This crate provides the `HttpProbe` implementation used by the v6probe
// binary.
//
// ## IPv6 Constraint
//
// The client's sockets are bound to `::`. Such a client cannot complete a
// connection to an IPv4 peer, so a hostname that only resolves to A records
// fails instead of silently succeeding over IPv4.
//
// ## Request Shape
//
// - `HEAD`, so no body is transferred
// - No redirects: any response, a 3xx included, proves reachability
// - One fixed deadline for the whole request
// - No connection pooling: the socket is closed once the response arrives
//
// ## Error Classification
//
// Failures are reduced to short codes (`TIMEOUT`, `ECONNREFUSED`, `ETLS`,
// ...) by walking the error's source chain.

use std::error::Error as StdError;
use std::io;
use std::net::{IpAddr, Ipv6Addr};

use async_trait::async_trait;
use reqwest::{Client, redirect};
use tracing::debug;

use v6probe_core::config::ProbeConfig;
use v6probe_core::traits::{HttpOutcome, HttpProbe, TIMEOUT_ERROR};
use v6probe_core::{Error, Result};

/// Failure codes besides [`TIMEOUT_ERROR`]
pub mod codes {
    pub const CONNECTION_REFUSED: &str = "ECONNREFUSED";
    pub const CONNECTION_RESET: &str = "ECONNRESET";
    pub const CONNECTION_ABORTED: &str = "ECONNABORTED";
    pub const NETWORK_UNREACHABLE: &str = "ENETUNREACH";
    pub const HOST_UNREACHABLE: &str = "EHOSTUNREACH";
    pub const ADDRESS_NOT_AVAILABLE: &str = "EADDRNOTAVAIL";
    pub const TLS: &str = "ETLS";
    /// Connection failed for a reason not listed above
    pub const CONNECT: &str = "ECONNECT";
    /// The request failed before or after connecting
    pub const REQUEST: &str = "EREQUEST";
}

/// HTTP probe backed by reqwest
pub struct ReqwestHttpProbe {
    client: Client,
}

impl ReqwestHttpProbe {
    /// Create a probe from the probe settings
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }
}

fn build_client(config: &ProbeConfig) -> Result<Client> {
    Client::builder()
        .local_address(IpAddr::V6(Ipv6Addr::UNSPECIFIED))
        .pool_max_idle_per_host(0)
        .timeout(config.http_timeout())
        .redirect(redirect::Policy::none())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))
}

#[async_trait]
impl HttpProbe for ReqwestHttpProbe {
    async fn probe(&self, url: &str) -> HttpOutcome {
        match self.client.head(url).send().await {
            Ok(response) => HttpOutcome::responded(response.status().as_u16()),
            Err(e) => {
                let code = classify(&e);
                debug!(url, code, error = %e, "request failed");
                HttpOutcome::failed(code)
            }
        }
    }

    fn probe_name(&self) -> &'static str {
        "reqwest"
    }
}

/// Reduce a request error to a short failure code
pub fn classify(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        return TIMEOUT_ERROR;
    }
    // reqwest's own message embeds the URL, so only its causes are inspected
    if let Some(code) = error.source().and_then(classify_source) {
        return code;
    }
    if error.is_connect() {
        codes::CONNECT
    } else {
        codes::REQUEST
    }
}

/// Find the first recognisable error in the chain starting at `error`
fn classify_source(error: &(dyn StdError + 'static)) -> Option<&'static str> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(error);

    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>()
            && let Some(code) = io_code(io_err.kind())
        {
            return Some(code);
        }
        if looks_like_tls(err) {
            return Some(codes::TLS);
        }
        current = err.source();
    }

    None
}

fn io_code(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::TimedOut => Some(TIMEOUT_ERROR),
        io::ErrorKind::ConnectionRefused => Some(codes::CONNECTION_REFUSED),
        io::ErrorKind::ConnectionReset => Some(codes::CONNECTION_RESET),
        io::ErrorKind::ConnectionAborted => Some(codes::CONNECTION_ABORTED),
        io::ErrorKind::NetworkUnreachable => Some(codes::NETWORK_UNREACHABLE),
        io::ErrorKind::HostUnreachable => Some(codes::HOST_UNREACHABLE),
        io::ErrorKind::AddrNotAvailable => Some(codes::ADDRESS_NOT_AVAILABLE),
        _ => None,
    }
}

fn looks_like_tls(error: &dyn StdError) -> bool {
    let message = error.to_string().to_ascii_lowercase();
    ["certificate", "tls", "handshake"]
        .iter()
        .any(|needle| message.contains(needle))
}
