//! Client identity used to key rate limit counters.
//!
//! Forwarding headers are supplied by the caller and can be spoofed unless a
//! trusted reverse proxy overwrites them. Configure `TRUSTED_PROXY_CIDRS` or
//! the `peer` source when the API is reachable directly.

use std::net::IpAddr;
use std::str::FromStr;

use axum::http::HeaderMap;
use ipnet::IpNet;
use visaflow_core::AppError;

/// Identity used when nothing identifies the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const PLATFORM_FORWARDED_FOR: &str = "x-vercel-forwarded-for";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClientIdentitySource {
    /// Forwarding headers, falling back to `unknown`.
    #[default]
    Forwarded,
    /// The TCP peer address.
    Peer,
}

impl FromStr for ClientIdentitySource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "forwarded" => Ok(Self::Forwarded),
            "peer" => Ok(Self::Peer),
            other => Err(AppError::Validation(format!(
                "CLIENT_IDENTITY_SOURCE must be either 'forwarded' or 'peer', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientIdentityResolver {
    source: ClientIdentitySource,
    trusted_proxies: Vec<IpNet>,
}

impl ClientIdentityResolver {
    pub fn new(source: ClientIdentitySource, trusted_proxies: Vec<IpNet>) -> Self {
        Self {
            source,
            trusted_proxies,
        }
    }

    pub fn resolve(&self, headers: &HeaderMap, peer: Option<IpAddr>) -> String {
        let peer_identity = || {
            peer.map(|address| address.to_string())
                .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
        };

        match self.source {
            ClientIdentitySource::Peer => peer_identity(),
            ClientIdentitySource::Forwarded => {
                if !self.trusted_proxies.is_empty() && !self.is_trusted_peer(peer) {
                    return peer_identity();
                }

                forwarded_identity(headers).unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
            }
        }
    }

    fn is_trusted_peer(&self, peer: Option<IpAddr>) -> bool {
        peer.is_some_and(|address| {
            self.trusted_proxies
                .iter()
                .any(|network| network.contains(&address))
        })
    }
}

fn forwarded_identity(headers: &HeaderMap) -> Option<String> {
    header_str(headers, FORWARDED_FOR)
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| header_str(headers, REAL_IP).map(str::trim).filter(|value| !value.is_empty()))
        .or_else(|| {
            header_str(headers, PLATFORM_FORWARDED_FOR)
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
        .map(ToOwned::to_owned)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    use axum::http::{HeaderMap, HeaderValue};
    use ipnet::IpNet;

    use super::{ClientIdentityResolver, ClientIdentitySource, UNKNOWN_CLIENT};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(*value));
        }
        headers
    }

    const PEER: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3));

    #[test]
    fn forwarded_for_first_entry_wins() {
        let resolver = ClientIdentityResolver::default();
        let identity = resolver.resolve(
            &headers(&[
                ("x-forwarded-for", " 203.0.113.7 , 10.0.0.1"),
                ("x-real-ip", "198.51.100.1"),
            ]),
            Some(PEER),
        );

        assert_eq!(identity, "203.0.113.7");
    }

    #[test]
    fn falls_back_through_real_ip_and_platform_header() {
        let resolver = ClientIdentityResolver::default();

        assert_eq!(
            resolver.resolve(&headers(&[("x-real-ip", "198.51.100.1")]), None),
            "198.51.100.1"
        );
        assert_eq!(
            resolver.resolve(
                &headers(&[
                    ("x-forwarded-for", " "),
                    ("x-vercel-forwarded-for", "192.0.2.44")
                ]),
                None
            ),
            "192.0.2.44"
        );
        assert_eq!(resolver.resolve(&HeaderMap::new(), Some(PEER)), UNKNOWN_CLIENT);
    }

    #[test]
    fn untrusted_peer_cannot_choose_its_identity() {
        let Ok(network) = IpNet::from_str("172.16.0.0/12") else {
            panic!("cidr should parse");
        };
        let resolver = ClientIdentityResolver::new(ClientIdentitySource::Forwarded, vec![network]);
        let spoofed = headers(&[("x-forwarded-for", "203.0.113.7")]);

        assert_eq!(resolver.resolve(&spoofed, Some(PEER)), "10.1.2.3");

        let proxy = IpAddr::V4(Ipv4Addr::new(172, 16, 0, 5));
        assert_eq!(resolver.resolve(&spoofed, Some(proxy)), "203.0.113.7");
    }

    #[test]
    fn peer_source_ignores_headers() {
        let resolver = ClientIdentityResolver::new(ClientIdentitySource::Peer, Vec::new());
        let spoofed = headers(&[("x-forwarded-for", "203.0.113.7")]);

        assert_eq!(resolver.resolve(&spoofed, Some(PEER)), "10.1.2.3");
        assert_eq!(resolver.resolve(&spoofed, None), UNKNOWN_CLIENT);
    }
}
