//! DrawingML fragments for text bodies, text boxes and pictures.
//!
//! The fragments use the `a:`, `p:` and `r:` prefixes, which every slide
//! part declares on its root element.
use crate::common::unit::pt_to_centipoints;
use crate::common::xml::escape_xml;
use crate::ooxml::pptx::format::{Geometry, TextStyle};
use std::fmt::Write as FmtWrite;

/// One centred paragraph holding a single run.
pub fn paragraph_xml(text: &str, style: &TextStyle) -> String {
    let mut xml = String::with_capacity(256 + text.len());

    xml.push_str(r#"<a:p><a:pPr algn="ctr"/><a:r>"#);
    let _ = write!(
        xml,
        r#"<a:rPr lang="en-US" sz="{}" b="{}" i="{}" dirty="0">"#,
        pt_to_centipoints(style.size_pt),
        u8::from(style.bold),
        u8::from(style.italic)
    );
    // CT_TextCharacterProperties: fill comes before the latin font
    let _ = write!(
        xml,
        r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
        style.color.to_hex()
    );
    let _ = write!(
        xml,
        r#"<a:latin typeface="{}"/><a:cs typeface="{}"/>"#,
        escape_xml(style.font_name),
        escape_xml(style.font_name)
    );
    xml.push_str("</a:rPr>");
    let _ = write!(xml, "<a:t>{}</a:t>", escape_xml(text));
    xml.push_str("</a:r></a:p>");

    xml
}

/// A word-wrapped text box (`p:sp` with `txBox="1"`).
pub fn text_box_xml(
    shape_id: u32,
    name: &str,
    text: &str,
    style: &TextStyle,
    geometry: Geometry,
) -> String {
    let mut xml = String::with_capacity(768 + text.len());

    xml.push_str("<p:sp><p:nvSpPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape_id,
        escape_xml(name)
    );
    xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);

    xml.push_str("<p:spPr>");
    write_xfrm(&mut xml, geometry);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/>"#);
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    xml.push_str(r#"<a:bodyPr wrap="square" rtlCol="0"><a:noAutofit/></a:bodyPr>"#);
    xml.push_str("<a:lstStyle/>");
    xml.push_str(&paragraph_xml(text, style));
    xml.push_str("</p:txBody></p:sp>");

    xml
}

/// A picture (`p:pic`) filled from the image relationship `r_id`.
pub fn picture_xml(shape_id: u32, name: &str, r_id: &str, geometry: Geometry) -> String {
    let mut xml = String::with_capacity(640);

    xml.push_str("<p:pic><p:nvPicPr>");
    let _ = write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape_id,
        escape_xml(name)
    );
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/>"#);
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    let _ = write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(r_id));
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(&mut xml, geometry);
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr></p:pic>");

    xml
}

fn write_xfrm(xml: &mut String, geometry: Geometry) {
    let _ = write!(
        xml,
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        geometry.x, geometry.y, geometry.cx, geometry.cy
    );
}
