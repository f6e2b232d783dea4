// src/github/link.rs
// =============================================================================
// This module parses the `Link` response header that GitHub uses for
// pagination.
//
// A typical header value looks like:
//   <https://api.github.com/search/issues?q=x&page=2>; rel="next",
//   <https://api.github.com/search/issues?q=x&page=5>; rel="last"
//
// Grammar we accept:
//   links  = entry *( "," entry )
//   entry  = "<" url ">" *( ";" param )
//   param  = name "=" ( token | quoted-string )
//
// Commas inside the angle brackets or inside quotes do not split entries,
// and any amount of whitespace is allowed between the pieces.
// =============================================================================

use std::collections::BTreeMap;

// Relation name -> URL for every usable entry of a Link header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Links {
    by_rel: BTreeMap<String, String>,
}

impl Links {
    /// Parses a `Link` header value.
    ///
    /// Entries without a URL or without a `rel` parameter are skipped, so a
    /// malformed header gives a partial (possibly empty) mapping rather than
    /// an error.
    pub fn parse(value: &str) -> Self {
        let mut by_rel = BTreeMap::new();

        for entry in split_outside(value, ',') {
            let Some((url, params)) = split_entry(entry) else {
                continue;
            };

            for param in split_outside(params, ';') {
                let Some((name, value)) = param.split_once('=') else {
                    continue;
                };
                if !name.trim().eq_ignore_ascii_case("rel") {
                    continue;
                }

                // rel="next last" names two relations for one URL
                for rel in unquote(value.trim()).split_whitespace() {
                    by_rel.insert(rel.to_string(), url.to_string());
                }
            }
        }

        Self { by_rel }
    }

    /// Finds the `link:` line in raw response header text and parses it.
    ///
    /// For callers holding a whole header block as text (a saved response, a
    /// curl dump) rather than a parsed header map. Header names are matched
    /// case-insensitively. Text without a `link:` line yields an empty mapping.
    pub fn from_header_text(headers: &str) -> Self {
        headers
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim().eq_ignore_ascii_case("link").then_some(value)
            })
            .map(Self::parse)
            .unwrap_or_default()
    }

    /// URL for `rel`, keyed as written in the header.
    ///
    /// Relation names are case-insensitive, so an exact match wins and any
    /// other casing falls back to a case-insensitive scan.
    pub fn get(&self, rel: &str) -> Option<&str> {
        self.by_rel
            .get(rel)
            .or_else(|| {
                self.by_rel
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(rel))
                    .map(|(_, url)| url)
            })
            .map(String::as_str)
    }

    /// The URL of the following page, if the server announced one.
    pub fn next(&self) -> Option<&str> {
        self.get("next")
    }

    pub fn is_empty(&self) -> bool {
        self.by_rel.is_empty()
    }

    pub fn rels(&self) -> impl Iterator<Item = &str> {
        self.by_rel.keys().map(String::as_str)
    }
}

// Splits `<url> ; params...` into the URL and the parameter text after it
fn split_entry(entry: &str) -> Option<(&str, &str)> {
    let entry = entry.trim();
    let rest = entry.strip_prefix('<')?;
    let close = rest.find('>')?;
    let url = rest[..close].trim();
    if url.is_empty() {
        return None;
    }
    Some((url, &rest[close + 1..]))
}

// Splits on `sep`, ignoring separators inside <...> or "..."
fn split_outside(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_angle = false;
    let mut in_quote = false;
    let mut start = 0;

    for (index, c) in text.char_indices() {
        match c {
            '<' if !in_quote => in_angle = true,
            '>' if !in_quote => in_angle = false,
            '"' if !in_angle => in_quote = !in_quote,
            c if c == sep && !in_angle && !in_quote => {
                parts.push(&text[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not split on spaces?
//    - Positional splitting breaks as soon as a server adds or drops a space
//    - Scanning characters and tracking <...> and "..." handles both
//
// 2. let-else
//    - `let Some(x) = ... else { continue; };` binds x or leaves the loop body
//    - It keeps the happy path unindented
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const GITHUB_STYLE: &str = "<https://api.github.com/search/issues?q=repo%3Ax&page=2>; rel=\"next\", \
                                <https://api.github.com/search/issues?q=repo%3Ax&page=4>; rel=\"last\"";

    #[test]
    fn test_parse_next_and_last() {
        let links = Links::parse(GITHUB_STYLE);
        assert_eq!(
            links.next(),
            Some("https://api.github.com/search/issues?q=repo%3Ax&page=2")
        );
        assert_eq!(
            links.get("last"),
            Some("https://api.github.com/search/issues?q=repo%3Ax&page=4")
        );
        assert_eq!(links.rels().collect::<Vec<_>>(), vec!["last", "next"]);
    }

    #[test]
    fn test_parse_tolerates_spacing_variants() {
        let links = Links::parse("<https://a.test/2>;rel=\"next\",<https://a.test/9>  ;  rel = last");
        assert_eq!(links.next(), Some("https://a.test/2"));
        assert_eq!(links.get("last"), Some("https://a.test/9"));
    }

    #[test]
    fn test_parse_comma_inside_url_does_not_split() {
        let links = Links::parse("<https://a.test/?q=a,b&page=2>; rel=\"next\"");
        assert_eq!(links.next(), Some("https://a.test/?q=a,b&page=2"));
    }

    #[test]
    fn test_parse_multi_valued_rel() {
        let links = Links::parse("<https://a.test/5>; rel=\"next last\"");
        assert_eq!(links.next(), Some("https://a.test/5"));
        assert_eq!(links.get("last"), Some("https://a.test/5"));
    }

    #[test]
    fn test_parse_keeps_rel_case_as_written() {
        let links = Links::parse("<https://a.test/2>; rel=\"Next\", <https://a.test/8>; rel=\"LAST\"");
        assert_eq!(links.rels().collect::<Vec<_>>(), vec!["LAST", "Next"]);
        assert_eq!(links.get("Next"), Some("https://a.test/2"));
        assert_eq!(links.get("LAST"), Some("https://a.test/8"));
        // Lookups ignore case, so pagination still finds it
        assert_eq!(links.next(), Some("https://a.test/2"));
        assert_eq!(links.get("last"), Some("https://a.test/8"));
    }

    #[test]
    fn test_parse_skips_incomplete_entries() {
        let links = Links::parse(
            "https://no-brackets.test; rel=\"prev\", <https://a.test/1>; title=\"x\", <https://a.test/3>; rel=\"next\"",
        );
        assert_eq!(links.rels().collect::<Vec<_>>(), vec!["next"]);
        assert_eq!(links.next(), Some("https://a.test/3"));
    }

    #[test]
    fn test_parse_empty_value() {
        assert!(Links::parse("").is_empty());
        assert!(Links::parse("garbage").is_empty());
    }

    #[test]
    fn test_from_header_text_finds_link_line() {
        let raw = format!(
            "content-type: application/json\r\nLink: {GITHUB_STYLE}\r\nx-ratelimit-remaining: 9\r\n"
        );
        let links = Links::from_header_text(&raw);
        assert_eq!(
            links.next(),
            Some("https://api.github.com/search/issues?q=repo%3Ax&page=2")
        );
    }

    #[test]
    fn test_from_header_text_without_link_is_empty() {
        let raw = "content-type: application/json\r\nserver: GitHub.com\r\n";
        assert!(Links::from_header_text(raw).is_empty());
        assert!(Links::from_header_text("").is_empty());
    }

    #[test]
    fn test_every_rel_maps_to_its_url() {
        let rels = ["first", "prev", "next", "last"];
        let value = rels
            .iter()
            .enumerate()
            .map(|(i, rel)| format!("<https://a.test/{i}>; rel=\"{rel}\""))
            .collect::<Vec<_>>()
            .join(", ");

        let links = Links::parse(&value);
        for (i, rel) in rels.iter().enumerate() {
            assert_eq!(links.get(rel), Some(format!("https://a.test/{i}").as_str()));
        }
    }
}
