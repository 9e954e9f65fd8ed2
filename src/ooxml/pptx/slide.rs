//! In-place editing of a single slide part.
//!
//! A `SlideMut` borrows the deck's package, edits the slide XML through
//! byte spans and writes the part (and its relationships, when they change)
//! back after every mutation. Shapes are addressed by the `name` attribute
//! of their `cNvPr` element, the name shown in PowerPoint's selection pane.
use crate::common::xml::unescape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::{OpcPackage, PackURI, Relationships};
use crate::ooxml::pptx::format::{Geometry, ImageFormat, TextStyle};
use crate::ooxml::pptx::shapes::ElementTree;
use crate::ooxml::pptx::writer::{paragraph_xml, picture_xml, text_box_xml};
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

pub struct SlideMut<'a> {
    opc: &'a mut OpcPackage,
    partname: PackURI,
    xml: String,
    rels: Relationships,
}

impl<'a> SlideMut<'a> {
    pub(crate) fn load(opc: &'a mut OpcPackage, partname: PackURI) -> Result<Self> {
        let xml = String::from_utf8(opc.blob(&partname)?.to_vec())
            .map_err(|e| OoxmlError::Xml(format!("{}: {}", partname, e)))?;
        let rels = opc.rels_for(&partname)?;
        // Fail early on a slide we could not edit safely
        ElementTree::parse(&xml)?;

        Ok(Self {
            opc,
            partname,
            xml,
            rels,
        })
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    /// Current XML of the slide part.
    #[inline]
    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// Names of every shape on the slide, in document order.
    pub fn shape_names(&self) -> Result<Vec<String>> {
        let tree = ElementTree::parse(&self.xml)?;
        Ok(tree
            .shapes()
            .into_iter()
            .map(|(_, name)| name.to_string())
            .collect())
    }

    /// Text of the first shape named `name`, paragraphs joined by `\n`.
    ///
    /// `None` when there is no such shape or it has no text body.
    pub fn shape_text(&self, name: &str) -> Result<Option<String>> {
        let tree = ElementTree::parse(&self.xml)?;
        let Some(body) = tree
            .shapes()
            .into_iter()
            .filter(|(_, n)| *n == name)
            .find_map(|(idx, _)| tree.first_child_named(idx, "txBody"))
        else {
            return Ok(None);
        };

        let mut paragraphs = Vec::new();
        for p in tree.children(body).filter(|&i| tree.get(i).local_name() == "p") {
            let mut text = String::new();
            for t in tree
                .descendants(p)
                .filter(|&i| tree.get(i).local_name() == "t")
            {
                if let Some(content) = tree.get(t).content.clone() {
                    text.push_str(&unescape_xml(&self.xml[content]));
                }
            }
            paragraphs.push(text);
        }

        Ok(Some(paragraphs.join("\n")))
    }

    /// Replace every paragraph of the shapes named `name` with one centred
    /// paragraph holding `text` in `style`.
    ///
    /// Returns `false` when no shape with a text body carries that name.
    pub fn set_text(&mut self, name: &str, text: &str, style: &TextStyle) -> Result<bool> {
        let tree = ElementTree::parse(&self.xml)?;
        let paragraph = paragraph_xml(text, style);
        let mut edits = Vec::new();

        for (idx, _) in tree.shapes().into_iter().filter(|(_, n)| *n == name) {
            let Some(body) = tree.first_child_named(idx, "txBody") else {
                continue;
            };
            let Some(content) = tree.get(body).content.clone() else {
                continue;
            };

            let paragraphs: Vec<usize> = tree
                .children(body)
                .filter(|&i| tree.get(i).local_name() == "p")
                .collect();
            let range = match (paragraphs.first(), paragraphs.last()) {
                (Some(&first), Some(&last)) => tree.get(first).start..tree.get(last).end,
                _ => content.end..content.end,
            };
            edits.push((range, paragraph.clone()));
        }

        if edits.is_empty() {
            return Ok(false);
        }

        debug!(slide = %self.partname, shape = name, "set text");
        self.splice(edits);
        self.store_xml();
        Ok(true)
    }

    /// Remove every shape named exactly `name`.
    pub fn remove_shapes(&mut self, name: &str) -> Result<usize> {
        self.remove_matching(|n| n == name)
    }

    /// Remove every shape whose name starts with `prefix`.
    pub fn remove_shapes_with_prefix(&mut self, prefix: &str) -> Result<usize> {
        self.remove_matching(|n| n.starts_with(prefix))
    }

    fn remove_matching(&mut self, matches: impl Fn(&str) -> bool) -> Result<usize> {
        let tree = ElementTree::parse(&self.xml)?;
        let mut ranges: Vec<Range<usize>> = Vec::new();
        let mut r_ids = Vec::new();

        for (idx, name) in tree.shapes() {
            if !matches(name) {
                continue;
            }
            let span = tree.get(idx);
            // Members of a group being removed go with the group
            if ranges
                .iter()
                .any(|r| r.start <= span.start && span.end <= r.end)
            {
                continue;
            }
            for i in tree.descendants(idx) {
                for (key, value) in &tree.get(i).attrs {
                    if is_relationship_attr(key) {
                        r_ids.push(value.clone());
                    }
                }
            }
            debug!(slide = %self.partname, shape = name, "remove shape");
            ranges.push(span.range());
        }

        let removed = ranges.len();
        if removed == 0 {
            return Ok(0);
        }

        self.splice(ranges.into_iter().map(|r| (r, String::new())).collect());
        self.store_xml();
        self.prune_relationships(r_ids)?;
        Ok(removed)
    }

    /// Set or clear the `hidden` flag of every shape named `name`.
    pub fn set_hidden(&mut self, name: &str, hidden: bool) -> Result<bool> {
        let tree = ElementTree::parse(&self.xml)?;
        let value = if hidden { "1" } else { "0" };

        let edits: Vec<(Range<usize>, String)> = tree
            .shapes()
            .into_iter()
            .filter(|(_, n)| *n == name)
            .filter_map(|(idx, _)| tree.shape_properties(idx))
            .map(|props| {
                let span = tree.get(props);
                (
                    span.start..span.start_tag_end,
                    span.start_tag_with_attr("hidden", value),
                )
            })
            .collect();

        if edits.is_empty() {
            return Ok(false);
        }

        debug!(slide = %self.partname, shape = name, hidden, "set hidden");
        self.splice(edits);
        self.store_xml();
        Ok(true)
    }

    /// Append a word-wrapped text box to the top of the shape tree.
    pub fn add_text_box(
        &mut self,
        name: &str,
        text: &str,
        style: &TextStyle,
        geometry: Geometry,
    ) -> Result<()> {
        let tree = ElementTree::parse(&self.xml)?;
        let at = shape_tree_end(&tree)?;
        let xml = text_box_xml(tree.free_shape_id(), name, text, style, geometry);

        debug!(slide = %self.partname, shape = name, "add text box");
        self.xml.insert_str(at, &xml);
        self.store_xml();
        Ok(())
    }

    /// Store `image` as a new media part and append a picture showing it.
    pub fn add_picture(&mut self, name: &str, image: &[u8], geometry: Geometry) -> Result<()> {
        let format = ImageFormat::detect_from_bytes(image)
            .ok_or_else(|| OoxmlError::UnsupportedImage(name.to_string()))?;
        let tree = ElementTree::parse(&self.xml)?;
        let at = shape_tree_end(&tree)?;
        let shape_id = tree.free_shape_id();

        let media = self.next_media_partname(format.extension());
        self.opc.set_blob(&media, image.to_vec());
        self.opc
            .content_types_mut()
            .ensure_default(format.extension(), format.mime_type());
        let r_id = self.rels.add(relationship_type::IMAGE, &media);

        debug!(slide = %self.partname, shape = name, media = %media, "add picture");
        self.xml
            .insert_str(at, &picture_xml(shape_id, name, &r_id, geometry));
        self.store_xml();
        self.store_rels();
        Ok(())
    }

    fn next_media_partname(&self, ext: &str) -> PackURI {
        (1u32..)
            .map(|n| PackURI::from_membername(&format!("ppt/media/image{}.{}", n, ext)))
            .find(|uri| !self.opc.contains(uri))
            .unwrap_or_else(|| PackURI::from_membername("ppt/media/image.bin"))
    }

    /// Drop relationships no longer used by the slide, then any media part
    /// nothing else in the package refers to.
    fn prune_relationships(&mut self, r_ids: Vec<String>) -> Result<()> {
        if r_ids.is_empty() {
            return Ok(());
        }

        let tree = ElementTree::parse(&self.xml)?;
        let in_use: HashSet<&str> = tree
            .spans()
            .iter()
            .flat_map(|span| span.attrs.iter())
            .filter(|(key, _)| is_relationship_attr(key))
            .map(|(_, value)| value.as_str())
            .collect();

        let mut orphans = Vec::new();
        for r_id in r_ids {
            if in_use.contains(r_id.as_str()) {
                continue;
            }
            if let Some(rel) = self.rels.remove(&r_id) {
                if !rel.is_external() && rel.reltype() == relationship_type::IMAGE {
                    orphans.push(self.rels.target_partname(&rel)?);
                }
            }
        }
        self.store_rels();

        for part in orphans {
            if !self.opc.is_referenced(&part)? {
                debug!(part = %part, "remove orphaned media");
                self.opc.remove_part(&part);
            }
        }
        Ok(())
    }

    /// Apply non-overlapping replacements, back to front so offsets stay valid.
    fn splice(&mut self, mut edits: Vec<(Range<usize>, String)>) {
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        for (range, replacement) in edits {
            self.xml.replace_range(range, &replacement);
        }
    }

    fn store_xml(&mut self) {
        self.opc
            .set_blob(&self.partname, self.xml.as_bytes().to_vec());
    }

    fn store_rels(&mut self) {
        self.opc.set_rels(&self.partname, &self.rels);
    }
}

/// Attributes holding a relationship id, e.g. `r:embed` or `r:link`.
fn is_relationship_attr(key: &str) -> bool {
    matches!(key.split_once(':'), Some((_, "embed" | "link" | "id" | "pict")))
}

/// Offset of the `</p:spTree>` end tag.
fn shape_tree_end(tree: &ElementTree) -> Result<usize> {
    tree.find("spTree")
        .and_then(|idx| tree.get(idx).content.clone())
        .map(|content| content.end)
        .ok_or_else(|| OoxmlError::InvalidFormat("slide has no shape tree".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RGBColor;
    use crate::ooxml::opc::phys_pkg::PhysPkgWriter;

    const STYLE: TextStyle = TextStyle {
        font_name: "Calibri",
        size_pt: 24.0,
        bold: false,
        italic: false,
        color: RGBColor::BLACK,
    };

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/><p:sp><p:nvSpPr><p:cNvPr id="2" name="TemperatureBox"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:t>old</a:t></a:r></a:p><a:p><a:r><a:t>second</a:t></a:r></a:p></p:txBody></p:sp><p:pic><p:nvPicPr><p:cNvPr id="3" name="CurrentWeatherImage"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId2"/></p:blipFill><p:spPr/></p:pic><p:grpSp><p:nvGrpSpPr><p:cNvPr id="4" name="Day1Group"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:grpSp></p:spTree></p:cSld></p:sld>"#;

    const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/></Relationships>"#;

    fn package() -> OpcPackage {
        let mut writer = PhysPkgWriter::new();
        writer
            .write(
                "[Content_Types].xml",
                br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/></Types>"#,
            )
            .unwrap();
        writer.write("ppt/slides/slide1.xml", SLIDE.as_bytes()).unwrap();
        writer
            .write("ppt/slides/_rels/slide1.xml.rels", SLIDE_RELS.as_bytes())
            .unwrap();
        writer.write("ppt/media/image1.png", PNG).unwrap();
        OpcPackage::from_bytes(&writer.finish().unwrap()).unwrap()
    }

    fn slide_uri() -> PackURI {
        PackURI::new("/ppt/slides/slide1.xml").unwrap()
    }

    #[test]
    fn test_shape_names() {
        let mut opc = package();
        let slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        assert_eq!(
            slide.shape_names().unwrap(),
            ["TemperatureBox", "CurrentWeatherImage", "Day1Group"]
        );
    }

    #[test]
    fn test_set_text_replaces_all_paragraphs() {
        let mut opc = package();
        let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        assert_eq!(
            slide.shape_text("TemperatureBox").unwrap().as_deref(),
            Some("old\nsecond")
        );

        assert!(slide.set_text("TemperatureBox", "72 F", &STYLE).unwrap());
        assert_eq!(
            slide.shape_text("TemperatureBox").unwrap().as_deref(),
            Some("72 F")
        );
        assert!(slide.xml().contains("<a:bodyPr/><a:lstStyle/><a:p>"));

        let once = slide.xml().to_string();
        assert!(slide.set_text("TemperatureBox", "72 F", &STYLE).unwrap());
        assert_eq!(slide.xml(), once);
    }

    #[test]
    fn test_set_text_on_missing_or_textless_shape() {
        let mut opc = package();
        let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        assert!(!slide.set_text("NoSuchBox", "x", &STYLE).unwrap());
        assert!(!slide.set_text("CurrentWeatherImage", "x", &STYLE).unwrap());
        assert!(slide.shape_text("NoSuchBox").unwrap().is_none());
    }

    #[test]
    fn test_remove_picture_prunes_media() {
        let mut opc = package();
        {
            let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
            assert_eq!(slide.remove_shapes("CurrentWeatherImage").unwrap(), 1);
            assert_eq!(slide.remove_shapes("CurrentWeatherImage").unwrap(), 0);
        }

        let media = PackURI::new("/ppt/media/image1.png").unwrap();
        assert!(!opc.contains(&media));
        let rels = opc.rels_for(&slide_uri()).unwrap();
        assert!(rels.get("rId2").is_none());
        assert!(rels.get("rId1").is_some());
    }

    #[test]
    fn test_replace_picture_does_not_grow_package() {
        let mut opc = package();
        let geometry = Geometry::from_inches(5.70, 3.29, 1.93, 2.00);
        for _ in 0..3 {
            let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
            slide.remove_shapes("CurrentWeatherImage").unwrap();
            slide
                .add_picture("CurrentWeatherImage", PNG, geometry)
                .unwrap();
        }

        assert_eq!(opc.partnames().filter(|p| p.ext() == "png").count(), 1);
        let slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        let names = slide.shape_names().unwrap();
        assert_eq!(
            names.iter().filter(|n| *n == "CurrentWeatherImage").count(),
            1
        );
    }

    #[test]
    fn test_add_picture_rejects_unknown_data() {
        let mut opc = package();
        let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        let geometry = Geometry::from_inches(0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            slide.add_picture("FactImage", b"<html></html>", geometry),
            Err(OoxmlError::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_prefix_removal_and_text_boxes() {
        let mut opc = package();
        let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        let geometry = Geometry::from_inches(0.0, 2.01, 6.67, 1.04);
        slide
            .add_text_box("BirthdayBox1", "a", &STYLE, geometry)
            .unwrap();
        slide
            .add_text_box("BirthdayBox2", "b", &STYLE, geometry)
            .unwrap();
        assert!(slide.xml().contains(r#"<p:cNvPr id="6" name="BirthdayBox2"/>"#));

        assert_eq!(slide.remove_shapes_with_prefix("BirthdayBox").unwrap(), 2);
        assert_eq!(
            slide.shape_names().unwrap(),
            ["TemperatureBox", "CurrentWeatherImage", "Day1Group"]
        );
        slide
            .add_text_box("AnniversaryBox1", "c", &STYLE, geometry)
            .unwrap();
        assert!(slide.xml().contains(r#"<p:cNvPr id="5" name="AnniversaryBox1"/>"#));
    }

    #[test]
    fn test_set_hidden() {
        let mut opc = package();
        let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
        assert!(slide.set_hidden("Day1Group", true).unwrap());
        assert!(slide.set_hidden("Day1Group", true).unwrap());
        assert!(slide
            .xml()
            .contains(r#"<p:cNvPr id="4" name="Day1Group" hidden="1"/>"#));
        assert!(!slide.set_hidden("Day2Group", true).unwrap());
    }

    #[test]
    fn test_edits_reach_the_package() {
        let mut opc = package();
        {
            let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
            slide.set_text("TemperatureBox", "new", &STYLE).unwrap();
        }
        let blob = opc.blob(&slide_uri()).unwrap();
        assert!(std::str::from_utf8(blob).unwrap().contains("<a:t>new</a:t>"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn prop_set_text_reads_back(text in "[a-zA-Z0-9 &<>'\"%,.!()]{0,40}") {
                let mut opc = package();
                let mut slide = SlideMut::load(&mut opc, slide_uri()).unwrap();
                prop_assert!(slide.set_text("TemperatureBox", &text, &STYLE).unwrap());
                prop_assert_eq!(slide.shape_text("TemperatureBox").unwrap(), Some(text));
                prop_assert_eq!(
                    slide.shape_names().unwrap(),
                    ["TemperatureBox", "CurrentWeatherImage", "Day1Group"]
                );
            }
        }
    }
}
