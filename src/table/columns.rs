//! Column name resolution against live dataset headers.
//!
//! Crawl exports name their columns in tool-specific ways ("Address",
//! "Title 1", "H1-1"); queries use plain words. Resolution runs four tiers,
//! first hit wins: direct aliases, exact match, bidirectional substring,
//! then coarse concept groups.

/// Plain-word aliases for canonical audit columns. A hit counts only when
/// the target header actually exists in the dataset.
const DIRECT_ALIASES: &[(&str, &str)] = &[
    ("url", "Address"),
    ("address", "Address"),
    ("title", "Title 1"),
    ("title tag", "Title 1"),
    ("meta description", "Meta Description 1"),
    ("meta", "Meta Description 1"),
    ("status", "Status Code"),
    ("status code", "Status Code"),
    ("indexability", "Indexability"),
    ("indexable", "Indexability"),
    ("content type", "Content Type"),
    ("word count", "Word Count"),
    ("h1", "H1-1"),
];

/// Coarse concepts and the header fragments that realize them.
const CONCEPT_ALIASES: &[(&str, &[&str])] = &[
    ("url", &["address", "url"]),
    ("title", &["title 1", "title", "title tag"]),
    ("meta description", &["meta description 1", "meta description"]),
    ("status", &["status code"]),
    ("indexability", &["indexability", "indexable"]),
    ("content", &["content type"]),
    ("word count", &["word count"]),
    ("h1", &["h1-1", "h1"]),
];

/// Find the best matching header for a requested column name.
pub fn resolve_column<'a>(headers: &'a [String], search: &str) -> Option<&'a str> {
    let search_lower = search.trim().to_lowercase();
    if search_lower.is_empty() {
        return None;
    }

    // Tier 1: direct alias onto an existing header
    for (alias, target) in DIRECT_ALIASES {
        if *alias == search_lower {
            if let Some(header) = headers.iter().find(|h| h.eq_ignore_ascii_case(target)) {
                return Some(header);
            }
        }
    }

    // Tier 2: exact match
    for header in headers {
        if header.to_lowercase() == search_lower {
            return Some(header);
        }
    }

    // Tier 3: bidirectional substring
    for header in headers {
        let header_lower = header.to_lowercase();
        if header_lower.contains(&search_lower) || search_lower.contains(&header_lower) {
            return Some(header);
        }
    }

    // Tier 4: concept groups
    for (concept, fragments) in CONCEPT_ALIASES {
        if concept.contains(&search_lower) || search_lower.contains(concept) {
            for fragment in *fragments {
                for header in headers {
                    if header.to_lowercase().contains(fragment) {
                        return Some(header);
                    }
                }
            }
        }
    }

    None
}
