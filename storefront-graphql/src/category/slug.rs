//! Url slugs for catalog paths.

const ACCENTED: &str = "ÁÄÂÀÃÅČÇĆĎÉĚËÈÊẼĔȆÍÌÎÏŇÑÓÖÒÔÕØŘŔŠŤÚŮÜÙÛÝŸŽáäâàãåčçćďéěëèêẽĕȇíìîïňñóöòôõøðřŕšťúůüùûýÿžþÞĐđßÆ";
const UNACCENTED: &str = "AAAAAACCCDEEEEEEEEIIIINNOOOOOORRSTUUUUUYYZaaaaaacccdeeeeeeeeiiiinnoooooodrrstuuuuuyyzbBDdsA";

fn fold_accent(c: char) -> char {
    ACCENTED
        .chars()
        .position(|accented| accented == c)
        .and_then(|index| UNACCENTED.chars().nth(index))
        .unwrap_or(c)
}

fn slugify_segment(segment: &str) -> String {
    let mut slug = String::with_capacity(segment.len());
    for c in segment.chars().map(fold_accent) {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if c == ',' {
            // Dropped rather than replaced.
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slugifies every segment of a `/` separated path.
///
/// Empty segments are dropped, so leading and trailing slashes disappear:
/// `/Calçados Femininos/Botas` becomes `calcados-femininos/botas`.
pub fn slugify(path: &str) -> String {
    path.split('/')
        .map(slugify_segment)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
