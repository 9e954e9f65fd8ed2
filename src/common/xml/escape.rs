use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;

const RAW: [&str; 5] = ["&", "<", ">", "\"", "'"];
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

static ESCAPER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(RAW).expect("static escape patterns are valid"));

// LeftmostLongest so `&amp;lt;` decodes to `&lt;` and not `<`.
static UNESCAPER: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(ENTITIES)
        .expect("static unescape patterns are valid")
});

/// Escape text for use in element content or attribute values.
///
/// # Examples
///
/// ```
/// use signdeck::common::xml::escape_xml;
/// assert_eq!(escape_xml("Tom & Jerry's <party>"), "Tom &amp; Jerry&apos;s &lt;party&gt;");
/// ```
#[inline]
pub fn escape_xml(s: &str) -> String {
    ESCAPER.replace_all(s, &ENTITIES)
}

/// Decode the five predefined XML entities.
///
/// Numeric character references and unknown entities are left unchanged.
#[inline]
pub fn unescape_xml(s: &str) -> String {
    UNESCAPER.replace_all(s, &RAW)
}
