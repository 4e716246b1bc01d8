//! Domain variant derivation
//!
//! Every endpoint is probed on its apex hostname and, where one plausibly
//! exists, on the `www.` sibling. Service-specific subdomains such as
//! `store.example.com` have no meaningful bare/www pair and are probed on
//! the given hostname alone.

use url::{Host, Url};

/// Which shape of hostname the endpoint URL was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvidedForm {
    /// `example.com`
    Apex,
    /// `www.example.com`
    Www,
    /// `store.example.com`
    Subdomain,
}

/// Hostnames to probe for one endpoint
///
/// A malformed URL yields a variant with every field absent; probes for
/// such a variant short-circuit to failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainVariant {
    pub apex: Option<String>,
    pub www: Option<String>,
    pub provided_form: Option<ProvidedForm>,
    scheme: String,
    port: Option<u16>,
}

impl DomainVariant {
    /// Derive the variant for an endpoint URL
    pub fn resolve(url: &str) -> Self {
        let Some((hostname, scheme, port)) = parse_hostname(url) else {
            return Self::default();
        };

        if let Some(apex) = hostname.strip_prefix("www.") {
            return Self {
                apex: Some(apex.to_string()),
                www: Some(hostname.clone()),
                provided_form: Some(ProvidedForm::Www),
                scheme,
                port,
            };
        }

        if hostname.split('.').count() > 2 {
            return Self {
                apex: Some(hostname),
                www: None,
                provided_form: Some(ProvidedForm::Subdomain),
                scheme,
                port,
            };
        }

        Self {
            www: Some(format!("www.{hostname}")),
            apex: Some(hostname),
            provided_form: Some(ProvidedForm::Apex),
            scheme,
            port,
        }
    }

    /// Whether the URL could not be turned into a hostname
    pub fn is_malformed(&self) -> bool {
        self.apex.is_none()
    }

    /// Whether a `www.` sibling should be probed
    pub fn has_www(&self) -> bool {
        self.www.is_some()
    }

    /// URL to issue the reachability request against for `hostname`
    ///
    /// Keeps the scheme and explicit port of the endpoint URL.
    pub fn probe_url(&self, hostname: &str) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}/", self.scheme, hostname, port),
            None => format!("{}://{}/", self.scheme, hostname),
        }
    }
}

fn parse_hostname(raw: &str) -> Option<(String, String, Option<u16>)> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let hostname = match url.host()? {
        Host::Domain(domain) => domain.trim_end_matches('.').to_ascii_lowercase(),
        // IP literals have no DNS records to look at
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };

    if hostname.is_empty() || hostname.split('.').any(str::is_empty) {
        return None;
    }

    Some((hostname, url.scheme().to_string(), url.port()))
}
