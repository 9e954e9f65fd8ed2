//! Part names inside an OPC package.
//!
//! A part name always begins with a forward slash and uses forward slashes
//! as separators, e.g. `/ppt/slides/slide8.xml`. The ZIP member name is the
//! same string without the leading slash.
use std::fmt;

/// Name of the package itself; its relationships live in `/_rels/.rels`.
pub const PACKAGE_URI: &str = "/";

pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    uri: String,
}

impl PackURI {
    /// Create a new PackURI, rejecting strings without the leading slash.
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri: String = uri.into();
        if uri.starts_with('/') {
            Ok(Self { uri })
        } else {
            Err(format!("part name without leading slash: {uri}"))
        }
    }

    /// Build a PackURI from a ZIP member name such as `ppt/slides/slide1.xml`.
    pub fn from_membername(name: &str) -> Self {
        PackURI {
            uri: format!("/{}", name.trim_start_matches('/')),
        }
    }

    /// Resolve a relationship target against the directory of its source.
    ///
    /// `("/ppt/slides", "../media/image1.png")` gives `/ppt/media/image1.png`.
    /// Absolute targets (leading slash) ignore the base.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let joined = if relative_ref.starts_with('/') {
            relative_ref.to_string()
        } else if base_uri.ends_with('/') {
            format!("{}{}", base_uri, relative_ref)
        } else {
            format!("{}/{}", base_uri, relative_ref)
        };
        Self::new(normalize_path(&joined))
    }

    /// Directory portion, e.g. `/ppt/slides` for `/ppt/slides/slide1.xml`.
    pub fn base_uri(&self) -> &str {
        match self.uri.rsplit_once('/') {
            Some((dir, _)) if !dir.is_empty() => dir,
            _ => "/",
        }
    }

    /// File name portion, empty for the package itself.
    pub fn filename(&self) -> &str {
        self.uri.rsplit_once('/').map_or("", |(_, name)| name)
    }

    /// Extension without the leading period.
    pub fn ext(&self) -> &str {
        self.filename().rsplit_once('.').map_or("", |(_, ext)| ext)
    }

    /// ZIP member name (URI with the leading slash stripped).
    pub fn membername(&self) -> &str {
        self.uri.strip_prefix('/').unwrap_or(&self.uri)
    }

    /// Relative reference from `base_uri` to this part.
    ///
    /// `/ppt/media/image1.png` seen from `/ppt/slides` is `../media/image1.png`.
    pub fn relative_ref(&self, base_uri: &str) -> String {
        let dir = segments(base_uri);
        let target = segments(&self.uri);
        let shared = dir.iter().zip(&target).take_while(|(d, t)| d == t).count();

        std::iter::repeat_n("..", dir.len() - shared)
            .chain(target[shared..].iter().copied())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// The `.rels` part holding this part's relationships.
    ///
    /// `/ppt/slides/_rels/slide1.xml.rels` for `/ppt/slides/slide1.xml`,
    /// `/_rels/.rels` for the package itself.
    pub fn rels_uri(&self) -> PackURI {
        let rels_filename = format!("{}.rels", self.filename());
        let uri = match self.base_uri() {
            "/" => format!("/_rels/{}", rels_filename),
            base => format!("{}/_rels/{}", base, rels_filename),
        };
        PackURI { uri }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.uri
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Resolve `.` and `..` segments, keeping the leading slash.
fn normalize_path(path: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for segment in segments(path) {
        if segment == ".." {
            kept.pop();
        } else if segment != "." {
            kept.push(segment);
        }
    }
    format!("/{}", kept.join("/"))
}

impl fmt::Display for PackURI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_relative_names() {
        assert!(PackURI::new("/ppt/presentation.xml").is_ok());
        assert!(PackURI::new("ppt/presentation.xml").is_err());
    }

    #[test]
    fn test_from_rel_ref() {
        let uri = PackURI::from_rel_ref("/ppt/slides", "../media/image3.png").unwrap();
        assert_eq!(uri.as_str(), "/ppt/media/image3.png");

        let uri = PackURI::from_rel_ref("/ppt", "slides/slide8.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/slides/slide8.xml");

        let uri = PackURI::from_rel_ref("/", "ppt/presentation.xml").unwrap();
        assert_eq!(uri.as_str(), "/ppt/presentation.xml");

        let uri = PackURI::from_rel_ref("/ppt/slides", "/ppt/media/a.png").unwrap();
        assert_eq!(uri.as_str(), "/ppt/media/a.png");
    }

    #[test]
    fn test_components() {
        let slide = PackURI::new("/ppt/slides/slide9.xml").unwrap();
        assert_eq!(slide.base_uri(), "/ppt/slides");
        assert_eq!(slide.filename(), "slide9.xml");
        assert_eq!(slide.ext(), "xml");
        assert_eq!(slide.membername(), "ppt/slides/slide9.xml");

        let package = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(package.base_uri(), "/");
        assert_eq!(package.filename(), "");
        assert_eq!(package.membername(), "");

        let top = PackURI::new(CONTENT_TYPES_URI).unwrap();
        assert_eq!(top.base_uri(), "/");
        assert_eq!(top.ext(), "xml");
    }

    #[test]
    fn test_relative_ref() {
        let media = PackURI::new("/ppt/media/image2.jpeg").unwrap();
        assert_eq!(media.relative_ref("/ppt/slides"), "../media/image2.jpeg");

        let slide = PackURI::new("/ppt/slides/slide2.xml").unwrap();
        assert_eq!(slide.relative_ref("/ppt"), "slides/slide2.xml");
        assert_eq!(slide.relative_ref("/"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_rels_uri() {
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert_eq!(slide.rels_uri().as_str(), "/ppt/slides/_rels/slide1.xml.rels");

        let pkg = PackURI::new(PACKAGE_URI).unwrap();
        assert_eq!(pkg.rels_uri().as_str(), "/_rels/.rels");
    }

    #[test]
    fn test_from_membername() {
        let uri = PackURI::from_membername("ppt/media/image1.png");
        assert_eq!(uri.as_str(), "/ppt/media/image1.png");
    }
}
