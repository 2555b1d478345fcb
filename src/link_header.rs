//! Parsing of the `Link` response header used for pagination.
//!
//! GitHub Link headers look like:
//! `<https://api.github.com/repositories/1/stargazers?per_page=100&page=2>; rel="next", <...&page=9>; rel="last"`

/// One `<url>; rel="name"` entry of a Link header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRelation {
    pub url: String,
    pub rel: String,
}

impl LinkRelation {
    /// Value of the `page` query parameter, if it is a positive integer.
    pub fn page(&self) -> Option<u32> {
        let query = self.url.split_once('?')?.1;
        let query = query.split('#').next().unwrap_or_default();
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.trim().parse::<u32>().ok())
            .filter(|page| *page > 0)
    }

    fn has_rel(&self, name: &str) -> bool {
        self.rel.split_whitespace().any(|r| r.eq_ignore_ascii_case(name))
    }
}

/// Split a Link header into its relations. Malformed entries are skipped.
pub fn parse_links(link_header: &str) -> Vec<LinkRelation> {
    link_header.split(',').filter_map(parse_entry).collect()
}

fn parse_entry(entry: &str) -> Option<LinkRelation> {
    let mut segments = entry.split(';').map(str::trim);

    let target = segments.next()?;
    let url = target.strip_prefix('<')?.strip_suffix('>')?.trim();
    if url.is_empty() {
        return None;
    }

    let rel = segments.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("rel") {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })?;

    Some(LinkRelation {
        url: url.to_string(),
        rel,
    })
}

/// Total number of pages advertised by the `rel="last"` link.
///
/// Absent or empty headers mean a single page. A header without a usable
/// `last` relation (we are already on the last page) also yields 1.
pub fn parse_last_page(link_header: Option<&str>) -> u32 {
    let Some(header) = link_header.filter(|h| !h.trim().is_empty()) else {
        return 1;
    };

    parse_links(header)
        .iter()
        .filter(|link| link.has_rel("last"))
        .find_map(LinkRelation::page)
        .unwrap_or(1)
}
