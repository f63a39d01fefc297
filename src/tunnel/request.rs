//! CONNECT request accumulation and parsing.

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Blank line terminating an HTTP request header.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Upper bound on the accumulated request header.
pub const MAX_REQUEST_LEN: usize = 16 * 1024;

/// Port assumed when the CONNECT target carries none.
pub const DEFAULT_PORT: u16 = 443;

/// Ways a CONNECT request can fail before a tunnel exists.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Peer closed before completing the header. Answered with silence.
    #[error("connection closed before request was complete")]
    Incomplete,

    /// Peer sent nothing for the whole handshake deadline.
    #[error("timed out waiting for request")]
    TimedOut,

    #[error("request header exceeds {MAX_REQUEST_LEN} bytes")]
    TooLarge,

    #[error("request line is empty")]
    Empty,

    #[error("method {0:?} is not supported, only CONNECT")]
    BadMethod(String),

    #[error("missing target address")]
    MissingTarget,

    #[error("target host is empty")]
    MissingHost,

    #[error("target port {0:?} is not a valid port")]
    BadPort(String),

    #[error("failed reading request: {0}")]
    Io(#[from] std::io::Error),
}

impl RequestError {
    /// Whether the client deserves a 400 response, as opposed to silence.
    pub fn warrants_response(&self) -> bool {
        !matches!(
            self,
            RequestError::Incomplete | RequestError::TimedOut | RequestError::Io(_)
        )
    }
}

/// A validated CONNECT target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub host: String,
    pub port: u16,
}

impl ConnectRequest {
    /// Parse an accumulated request header.
    ///
    /// Invalid byte sequences are replaced rather than fatal; only the
    /// first line matters, the remaining headers and any body are ignored.
    pub fn parse(raw: &[u8]) -> Result<Self, RequestError> {
        let header = String::from_utf8_lossy(raw);
        let first_line = header.split("\r\n").next().unwrap_or_default();

        let mut parts = first_line.split_whitespace();
        let method = parts.next().ok_or(RequestError::Empty)?;
        if method != "CONNECT" {
            return Err(RequestError::BadMethod(method.to_string()));
        }

        let target = parts.next().ok_or(RequestError::MissingTarget)?;
        let (host, port) = match target.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .ok()
                    .filter(|p| *p > 0)
                    .ok_or_else(|| RequestError::BadPort(port.to_string()))?;
                (host, port)
            }
            None => (target, DEFAULT_PORT),
        };

        if host.is_empty() {
            return Err(RequestError::MissingHost);
        }

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl std::fmt::Display for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Accumulate chunked reads until the header terminator appears.
///
/// Returns the raw header bytes, terminator included. A zero-length read
/// before the terminator is [`RequestError::Incomplete`].
pub async fn read_header<R>(stream: &mut R, buffer_size: usize) -> Result<Vec<u8>, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut request = Vec::new();
    let mut chunk = vec![0u8; buffer_size];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(RequestError::Incomplete);
        }
        request.extend_from_slice(&chunk[..n]);

        if request
            .windows(HEADER_TERMINATOR.len())
            .any(|w| w == HEADER_TERMINATOR)
        {
            return Ok(request);
        }
        if request.len() > MAX_REQUEST_LEN {
            return Err(RequestError::TooLarge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let raw = b"CONNECT example.com:8443 HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let request = ConnectRequest::parse(raw).unwrap();
        assert_eq!(request.host, "example.com");
        assert_eq!(request.port, 8443);
    }

    #[test]
    fn missing_port_defaults_to_443() {
        let request = ConnectRequest::parse(b"CONNECT example.com HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.port, DEFAULT_PORT);
    }

    #[test]
    fn rejects_non_connect_method() {
        let err = ConnectRequest::parse(b"GET example.com:443 HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::BadMethod(m) if m == "GET"));
    }

    #[test]
    fn rejects_empty_host() {
        let err = ConnectRequest::parse(b"CONNECT :443 HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::MissingHost));
    }

    #[test]
    fn rejects_bad_port() {
        let err = ConnectRequest::parse(b"CONNECT example.com:https HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::BadPort(p) if p == "https"));

        let err = ConnectRequest::parse(b"CONNECT example.com:0 HTTP/1.1\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::BadPort(_)));
    }

    #[test]
    fn rejects_blank_request() {
        let err = ConnectRequest::parse(b"\r\n\r\n").unwrap_err();
        assert!(matches!(err, RequestError::Empty));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let raw = b"CONNECT example.com:443 HTTP/1.1\r\nX-Junk: \xff\xfe\r\n\r\n";
        let request = ConnectRequest::parse(raw).unwrap();
        assert_eq!(request.host, "example.com");
    }

    #[tokio::test]
    async fn header_accumulates_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(64);

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"CONNECT example.com:443 ").await.unwrap();
            client.write_all(b"HTTP/1.1\r\n").await.unwrap();
            client.write_all(b"\r\n").await.unwrap();
        });

        let raw = read_header(&mut server, 8).await.unwrap();
        assert!(raw.ends_with(HEADER_TERMINATOR));
        assert_eq!(ConnectRequest::parse(&raw).unwrap().host, "example.com");
    }

    #[tokio::test]
    async fn early_close_is_incomplete() {
        let (mut client, mut server) = tokio::io::duplex(64);

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"CONNECT example").await.unwrap();
            client.shutdown().await.unwrap();
        });

        let err = read_header(&mut server, 64).await.unwrap_err();
        assert!(matches!(err, RequestError::Incomplete));
    }

    #[tokio::test]
    async fn oversized_header_rejected() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let filler = vec![b'a'; MAX_REQUEST_LEN + 1024];
            let _ = client.write_all(&filler).await;
        });

        let err = read_header(&mut server, 1024).await.unwrap_err();
        assert!(matches!(err, RequestError::TooLarge));
    }
}
