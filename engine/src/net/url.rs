// Address parsing for the page source.
//
// Accepts `scheme://host[:port][/path]` for http and https, and
// `file://<path>` for local documents.

use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    File,
}

impl Scheme {
    pub fn default_port(self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::File => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
        }
    }
}

/// Represents a parsed URL with its components
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUrl {
    pub scheme: Scheme,
    /// Empty for `file` URLs.
    pub host: String,
    pub port: Option<u16>,
    /// Always starts with `/`.
    pub path: String,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (scheme, rest) = url.split_once("://").ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
            reason: "missing \"://\"".to_string(),
        })?;

        let scheme = match scheme.to_lowercase().as_str() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            "file" => Scheme::File,
            other => return Err(Error::UnsupportedScheme(other.to_string())),
        };

        if scheme == Scheme::File {
            let path = if rest.starts_with('/') { rest.to_string() } else { format!("/{}", rest) };
            return Ok(ParsedUrl { scheme, host: String::new(), port: None, path });
        }

        let (host_port, path) = match rest.find('/') {
            Some(pos) => (&rest[..pos], rest[pos..].to_string()),
            None => (rest, "/".to_string()),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| Error::InvalidUrl {
                    url: url.to_string(),
                    reason: format!("bad port {:?}", port),
                })?;
                (host, Some(port))
            }
            None => (host_port, scheme.default_port()),
        };

        if host.is_empty() {
            return Err(Error::InvalidUrl {
                url: url.to_string(),
                reason: "missing host".to_string(),
            });
        }

        Ok(ParsedUrl {
            scheme,
            host: host.to_lowercase(),
            port,
            path,
        })
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.host)?;
        if let Some(port) = self.port {
            if Some(port) != self.scheme.default_port() {
                write!(f, ":{}", port)?;
            }
        }
        f.write_str(&self.path)
    }
}
