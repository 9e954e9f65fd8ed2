//! The `[Content_Types].xml` part.
//!
//! Maps extensions (`Default`) and individual part names (`Override`) to
//! content types. Entries keep their original order when written back.

use crate::common::xml::{escape_xml, unescape_xml};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    /// (lower-case extension, content type)
    defaults: Vec<(String, String)>,
    /// (part name, content type)
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut types = Self::default();
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) => {
                    let local = e.local_name();
                    let is_default = local.as_ref() == b"Default";
                    let is_override = local.as_ref() == b"Override";
                    if is_default || is_override {
                        types.push_entry(is_default, &e)?;
                    }
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(types)
    }

    fn push_entry(&mut self, is_default: bool, e: &quick_xml::events::BytesStart<'_>) -> Result<()> {
        let mut key = None;
        let mut content_type = None;
        for attr in e.attributes() {
            let attr = attr?;
            let value = unescape_xml(std::str::from_utf8(&attr.value)?);
            match attr.key.local_name().as_ref() {
                b"Extension" | b"PartName" => key = Some(value),
                b"ContentType" => content_type = Some(value),
                _ => {},
            }
        }

        if let (Some(key), Some(content_type)) = (key, content_type) {
            if is_default {
                self.defaults.push((key.to_ascii_lowercase(), content_type));
            } else {
                self.overrides.push((key, content_type));
            }
        }
        Ok(())
    }

    /// Content type of a part: its override, else the default for its extension.
    pub fn content_type_for(&self, partname: &PackURI) -> Option<&str> {
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(partname.as_str()))
        {
            return Some(ct);
        }

        let ext = partname.ext().to_ascii_lowercase();
        self.defaults
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, ct)| ct.as_str())
    }

    /// Register a `Default` for `ext` unless one already exists.
    pub fn ensure_default(&mut self, ext: &str, content_type: &str) {
        let ext = ext.to_ascii_lowercase();
        if !self.defaults.iter().any(|(e, _)| *e == ext) {
            self.defaults.push((ext, content_type.to_string()));
        }
    }

    pub fn remove_override(&mut self, partname: &PackURI) {
        self.overrides
            .retain(|(name, _)| !name.eq_ignore_ascii_case(partname.as_str()));
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + (self.defaults.len() + self.overrides.len()) * 140);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES));

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(ct)
            ));
        }
        for (name, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(name),
                escape_xml(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::opc::constants::content_type as ct;

    const TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
  <Override PartName="/ppt/slides/slide1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>
</Types>"#;

    #[test]
    fn test_lookup() {
        let types = ContentTypes::from_xml(TYPES.as_bytes()).unwrap();
        let pres = PackURI::new("/ppt/presentation.xml").unwrap();
        assert_eq!(types.content_type_for(&pres), Some(ct::PML_PRESENTATION_MAIN));

        let other = PackURI::new("/docProps/app.xml").unwrap();
        assert_eq!(types.content_type_for(&other), Some(ct::XML));

        let image = PackURI::new("/ppt/media/image1.PNG").unwrap();
        assert_eq!(types.content_type_for(&image), None);
    }

    #[test]
    fn test_ensure_default_is_idempotent() {
        let mut types = ContentTypes::from_xml(TYPES.as_bytes()).unwrap();
        types.ensure_default("png", ct::PNG);
        types.ensure_default("PNG", ct::PNG);

        let xml = types.to_xml();
        assert_eq!(xml.matches(r#"Extension="png""#).count(), 1);

        let image = PackURI::new("/ppt/media/image1.png").unwrap();
        let reparsed = ContentTypes::from_xml(xml.as_bytes()).unwrap();
        assert_eq!(reparsed.content_type_for(&image), Some(ct::PNG));
    }

    #[test]
    fn test_remove_override() {
        let mut types = ContentTypes::from_xml(TYPES.as_bytes()).unwrap();
        let slide = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        types.remove_override(&slide);
        assert_eq!(types.content_type_for(&slide), Some(ct::XML));
    }
}
