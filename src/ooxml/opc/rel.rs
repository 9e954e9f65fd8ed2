//! Relationships between parts of an OPC package.
//!
//! A `.rels` part lists the relationships of one source part. Order of
//! the entries is preserved on write so an untouched `.rels` round-trips.
use crate::common::xml::{escape_xml, unescape_xml};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fmt::Write;

/// One `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    r_id: String,
    reltype: String,
    /// Relative part reference, or a URL when external
    target_ref: String,
    is_external: bool,
}

impl Relationship {
    pub fn new(r_id: String, reltype: String, target_ref: String, is_external: bool) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

/// Relationships of a single source part.
#[derive(Debug, Clone)]
pub struct Relationships {
    /// Directory of the source part, used to resolve relative targets
    base_uri: String,
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            rels: Vec::new(),
        }
    }

    /// Parse the XML of a `.rels` part.
    ///
    /// # Arguments
    /// * `base_uri` - Directory of the source part (e.g. `/ppt/slides`)
    /// * `xml` - Raw bytes of the `.rels` part
    pub fn from_xml(base_uri: impl Into<String>, xml: &[u8]) -> Result<Self> {
        let mut rels = Self::new(base_uri);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target = None;
                    let mut is_external = false;

                    for attr in e.attributes() {
                        let attr = attr?;
                        let value = unescape_xml(std::str::from_utf8(&attr.value)?);
                        match attr.key.local_name().as_ref() {
                            b"Id" => r_id = Some(value),
                            b"Type" => reltype = Some(value),
                            b"Target" => target = Some(value),
                            b"TargetMode" => is_external = value == "External",
                            _ => {},
                        }
                    }

                    match (r_id, reltype, target) {
                        (Some(r_id), Some(reltype), Some(target)) => {
                            rels.rels
                                .push(Relationship::new(r_id, reltype, target, is_external));
                        },
                        _ => {
                            return Err(OpcError::InvalidRelationship(
                                "relationship without Id, Type or Target".to_string(),
                            ));
                        },
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(rels)
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|rel| rel.r_id == r_id)
    }

    /// The single relationship of a type, e.g. the package's officeDocument.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.iter().filter(|rel| rel.reltype == reltype);
        let first = matching
            .next()
            .ok_or_else(|| OpcError::RelationshipNotFound(reltype.to_string()))?;
        if matching.next().is_some() {
            return Err(OpcError::InvalidRelationship(format!("{} appears twice", reltype)));
        }
        Ok(first)
    }

    /// Absolute part name targeted by an internal relationship.
    pub fn target_partname(&self, rel: &Relationship) -> Result<PackURI> {
        if rel.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external",
                rel.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &rel.target_ref).map_err(OpcError::InvalidPackUri)
    }

    /// Add an internal relationship to `target` and return its new rId.
    pub fn add(&mut self, reltype: &str, target: &PackURI) -> String {
        let r_id = self.next_r_id();
        self.rels.push(Relationship::new(
            r_id.clone(),
            reltype.to_string(),
            target.relative_ref(&self.base_uri),
            false,
        ));
        r_id
    }

    /// Lowest unused `rIdN`.
    fn next_r_id(&self) -> String {
        let taken: std::collections::BTreeSet<u32> = self
            .rels
            .iter()
            .filter_map(|rel| rel.r_id.strip_prefix("rId"))
            .filter_map(|digits| atoi_simd::parse::<u32, false, false>(digits.as_bytes()).ok())
            .collect();
        let free = (1u32..).find(|n| !taken.contains(n)).unwrap_or(u32::MAX);
        format!("rId{free}")
    }

    pub fn remove(&mut self, r_id: &str) -> Option<Relationship> {
        let pos = self.rels.iter().position(|rel| rel.r_id == r_id)?;
        Some(self.rels.remove(pos))
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize to the XML of a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(128 + self.rels.len() * 160);
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<Relationships xmlns=\"{}\">",
            namespace::OPC_RELATIONSHIPS
        );
        for rel in &self.rels {
            let _ = write!(
                out,
                "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"",
                escape_xml(&rel.r_id),
                escape_xml(&rel.reltype),
                escape_xml(&rel.target_ref),
            );
            if rel.is_external {
                out.push_str(" TargetMode=\"External\"");
            }
            out.push_str("/>");
        }
        out.push_str("</Relationships>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::relationship_type as rt;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/>
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
  <Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_rels() {
        let rels = Relationships::from_xml("/ppt/slides", SLIDE_RELS.as_bytes()).unwrap();
        assert_eq!(rels.len(), 3);

        let image = rels.get("rId3").unwrap();
        assert_eq!(image.reltype(), rt::IMAGE);
        assert_eq!(
            rels.target_partname(image).unwrap().as_str(),
            "/ppt/media/image1.png"
        );

        let link = rels.get("rId4").unwrap();
        assert!(link.is_external());
        assert_eq!(link.target_ref(), "https://example.com/?a=1&b=2");
        assert!(rels.target_partname(link).is_err());
    }

    #[test]
    fn test_next_r_id_fills_gaps() {
        let mut rels = Relationships::from_xml("/ppt/slides", SLIDE_RELS.as_bytes()).unwrap();
        let media = PackURI::new("/ppt/media/image7.png").unwrap();

        let r_id = rels.add(rt::IMAGE, &media);
        assert_eq!(r_id, "rId2");
        assert_eq!(rels.get("rId2").unwrap().target_ref(), "../media/image7.png");

        let r_id = rels.add(rt::IMAGE, &media);
        assert_eq!(r_id, "rId5");
    }

    #[test]
    fn test_remove_and_serialize() {
        let mut rels = Relationships::from_xml("/ppt/slides", SLIDE_RELS.as_bytes()).unwrap();
        assert!(rels.remove("rId3").is_some());
        assert!(rels.remove("rId3").is_none());

        let xml = rels.to_xml();
        assert!(!xml.contains("image1.png"));
        assert!(xml.contains(r#"Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#));

        let reparsed = Relationships::from_xml("/ppt/slides", xml.as_bytes()).unwrap();
        assert_eq!(reparsed.len(), 2);
        assert_eq!(reparsed.iter().next().unwrap().r_id(), "rId1");
    }

    #[test]
    fn test_part_with_reltype() {
        let rels = Relationships::from_xml("/ppt/slides", SLIDE_RELS.as_bytes()).unwrap();
        assert!(rels.part_with_reltype(rt::IMAGE).is_ok());
        assert!(rels.part_with_reltype(rt::OFFICE_DOCUMENT).is_err());
    }
}
