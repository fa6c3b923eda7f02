use std::collections::HashSet;
use std::path::Path;
use url::{Host, Url};

/// Registrable domain of `url` (public suffix plus one label), e.g.
/// `shop.example.co.uk` → `example.co.uk`.
///
/// Returns `None` when there is no URL, it does not parse, the host is an IP
/// address, or the host is itself a public suffix. `None` never matches an
/// [`IgnoreList`].
pub fn registrable_domain(url: Option<&str>) -> Option<String> {
    let parsed = Url::parse(url?).ok()?;
    let host = match parsed.host()? {
        Host::Domain(d) => d.trim_end_matches('.').to_string(),
        Host::Ipv4(_) | Host::Ipv6(_) => return None,
    };
    psl::domain_str(&host).map(str::to_string)
}

/// Domains whose links are never republished.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    domains: HashSet<String>,
}

impl IgnoreList {
    /// One domain per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        let domains = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { domains }
    }

    /// Load the list from `path`. A missing file is an empty list.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let list = Self::parse(&text);
                tracing::debug!(path = %path.display(), domains = list.len(), "Loaded ignore list");
                Ok(list)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No ignore list found, ignoring nothing");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_ignored(&self, domain: Option<&str>) -> bool {
        domain.is_some_and(|d| self.domains.contains(d))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}
