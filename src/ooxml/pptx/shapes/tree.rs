//! Byte-span index over a part's XML.
//!
//! Slides are edited as text: the index records where every element starts
//! and ends so a shape, a text body or a single start tag can be replaced
//! without re-serializing the rest of the part. Anything the index does not
//! touch is written back exactly as it was read.
use crate::common::xml::{escape_xml, unescape_xml};
use crate::ooxml::error::Result;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeSet;
use std::ops::Range;

/// Local names of the elements that make up a slide's shape tree.
const SHAPE_ELEMENTS: [&str; 5] = ["sp", "pic", "grpSp", "graphicFrame", "cxnSp"];

/// One element of the document.
#[derive(Debug, Clone)]
pub struct ElementSpan {
    /// Qualified name as written, e.g. `p:cNvPr`
    pub qname: String,
    pub depth: usize,
    pub parent: Option<usize>,
    /// Offset of the `<` of the start tag
    pub start: usize,
    /// Offset just past the start tag (equal to `end` for empty elements)
    pub start_tag_end: usize,
    /// Offset just past the end tag
    pub end: usize,
    /// Content between the tags, `None` for empty elements
    pub content: Option<Range<usize>>,
    /// (qualified name, unescaped value), in document order
    pub attrs: Vec<(String, String)>,
}

impl ElementSpan {
    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.qname.rfind(':') {
            Some(pos) => &self.qname[pos + 1..],
            None => &self.qname,
        }
    }

    pub fn attr(&self, qname: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == qname)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[inline]
    pub fn is_shape(&self) -> bool {
        SHAPE_ELEMENTS.contains(&self.local_name())
    }

    /// Rebuild the start tag with `name` set to `value`.
    ///
    /// Existing attributes keep their order; a new attribute is appended.
    pub fn start_tag_with_attr(&self, name: &str, value: &str) -> String {
        let mut tag = String::with_capacity(self.start_tag_end - self.start + 16);
        tag.push('<');
        tag.push_str(&self.qname);

        let mut replaced = false;
        for (k, v) in &self.attrs {
            let v = if k == name {
                replaced = true;
                value
            } else {
                v.as_str()
            };
            tag.push_str(&format!(r#" {}="{}""#, k, escape_xml(v)));
        }
        if !replaced {
            tag.push_str(&format!(r#" {}="{}""#, name, escape_xml(value)));
        }

        tag.push_str(if self.content.is_some() { ">" } else { "/>" });
        tag
    }
}

/// All elements of a document, in start-tag order.
#[derive(Debug, Clone)]
pub struct ElementTree {
    spans: Vec<ElementSpan>,
}

impl ElementTree {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut spans: Vec<ElementSpan> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            let before = reader.buffer_position() as usize;
            let event = reader.read_event()?;
            let after = reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    let span = new_span(&e, open.len(), open.last().copied(), before, after)?;
                    spans.push(ElementSpan {
                        content: Some(after..after),
                        ..span
                    });
                    open.push(spans.len() - 1);
                },
                Event::Empty(e) => {
                    let span = new_span(&e, open.len(), open.last().copied(), before, after)?;
                    spans.push(ElementSpan { end: after, ..span });
                },
                Event::End(_) => {
                    if let Some(idx) = open.pop() {
                        let span = &mut spans[idx];
                        span.end = after;
                        span.content = Some(span.start_tag_end..before);
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        Ok(Self { spans })
    }

    #[inline]
    pub fn spans(&self) -> &[ElementSpan] {
        &self.spans
    }

    #[inline]
    pub fn get(&self, idx: usize) -> &ElementSpan {
        &self.spans[idx]
    }

    /// Indices of the direct children of `idx`.
    pub fn children(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.spans
            .iter()
            .enumerate()
            .skip(idx + 1)
            .take_while(move |(_, span)| span.start < self.spans[idx].end)
            .filter(move |(_, span)| span.parent == Some(idx))
            .map(|(i, _)| i)
    }

    /// Indices of every element nested inside `idx`.
    pub fn descendants(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let end = self.spans[idx].end;
        (idx + 1..self.spans.len()).take_while(move |&i| self.spans[i].start < end)
    }

    pub fn first_child_named(&self, idx: usize, local: &str) -> Option<usize> {
        self.children(idx)
            .find(|&i| self.spans[i].local_name() == local)
    }

    /// First element with the given local name, anywhere in the document.
    pub fn find(&self, local: &str) -> Option<usize> {
        self.spans.iter().position(|span| span.local_name() == local)
    }

    /// The `cNvPr` element naming a shape (`p:sp/p:nvSpPr/p:cNvPr` and friends).
    pub fn shape_properties(&self, shape: usize) -> Option<usize> {
        self.children(shape)
            .find(|&i| self.spans[i].local_name().starts_with("nv"))
            .and_then(|nv| self.first_child_named(nv, "cNvPr"))
    }

    /// Every shape with its name, in document order (group members included).
    pub fn shapes(&self) -> Vec<(usize, &str)> {
        self.spans
            .iter()
            .enumerate()
            .filter(|(_, span)| span.is_shape())
            .filter_map(|(i, _)| {
                let props = self.shape_properties(i)?;
                Some((i, self.spans[props].attr("name").unwrap_or("")))
            })
            .collect()
    }

    /// Lowest positive `cNvPr/@id` not used in the document.
    ///
    /// Ids freed by removed shapes are handed out again, so rewriting the
    /// same shapes on every run keeps their ids stable.
    pub fn free_shape_id(&self) -> u32 {
        let taken: BTreeSet<u32> = self
            .spans
            .iter()
            .filter(|span| span.local_name() == "cNvPr")
            .filter_map(|span| span.attr("id"))
            .filter_map(|id| atoi_simd::parse::<u32, false, false>(id.as_bytes()).ok())
            .collect();
        (1u32..).find(|id| !taken.contains(id)).unwrap_or(u32::MAX)
    }
}

fn new_span(
    e: &BytesStart<'_>,
    depth: usize,
    parent: Option<usize>,
    start: usize,
    start_tag_end: usize,
) -> Result<ElementSpan> {
    let qname = std::str::from_utf8(e.name().as_ref())?.to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = unescape_xml(std::str::from_utf8(&attr.value)?);
        attrs.push((key, value));
    }

    Ok(ElementSpan {
        qname,
        depth,
        parent,
        start,
        start_tag_end,
        end: start_tag_end,
        content: None,
        attrs,
    })
}
