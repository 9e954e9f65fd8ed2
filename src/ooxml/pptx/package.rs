//! Package implementation for PowerPoint presentations.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::content_type as ct;
use crate::ooxml::opc::{OpcPackage, PackURI};
use crate::ooxml::pptx::shapes::ElementTree;
use crate::ooxml::pptx::slide::SlideMut;
use std::path::Path;

/// An editable PowerPoint (.pptx) deck.
///
/// Wraps an OPC package and resolves slide order from the presentation
/// part's `p:sldIdLst`.
///
/// # Examples
///
/// ```rust,no_run
/// use signdeck::ooxml::pptx::Deck;
///
/// let mut deck = Deck::open("DisplayFinal.pptx")?;
/// println!("Deck has {} slides", deck.slide_count());
///
/// let slide = deck.slide_mut(9)?;
/// println!("{:?}", slide.shape_names()?);
/// deck.save("DisplayFinal.pptx")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Deck {
    /// The underlying OPC package
    opc: OpcPackage,
    /// Slide part names in presentation order
    slides: Vec<PackURI>,
}

impl Deck {
    /// Open a .pptx package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_opc(OpcPackage::open(path)?)
    }

    /// Load a .pptx package from the bytes of its ZIP container.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_opc(OpcPackage::from_bytes(data)?)
    }

    fn from_opc(opc: OpcPackage) -> Result<Self> {
        let main_part = opc
            .main_document_partname()
            .map_err(|e| OoxmlError::PartNotFound(format!("main presentation part: {}", e)))?;

        // Support regular, macro-enabled and slideshow packages
        let content_type = opc
            .content_types()
            .content_type_for(&main_part)
            .unwrap_or_default();
        if content_type != ct::PML_PRESENTATION_MAIN
            && content_type != ct::PML_PRES_MACRO_MAIN
            && content_type != ct::PML_SLIDESHOW_MAIN
        {
            return Err(OoxmlError::InvalidContentType {
                expected: format!(
                    "{} or {}",
                    ct::PML_PRESENTATION_MAIN,
                    ct::PML_PRES_MACRO_MAIN
                ),
                got: content_type.to_string(),
            });
        }

        let slides = slide_partnames(&opc, &main_part)?;
        Ok(Self { opc, slides })
    }

    #[inline]
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Part name of the slide at 1-based position `number`.
    pub fn slide_partname(&self, number: usize) -> Result<&PackURI> {
        number
            .checked_sub(1)
            .and_then(|idx| self.slides.get(idx))
            .ok_or(OoxmlError::SlideOutOfRange {
                index: number,
                count: self.slides.len(),
            })
    }

    /// Edit the slide at 1-based position `number`.
    pub fn slide_mut(&mut self, number: usize) -> Result<SlideMut<'_>> {
        let partname = self.slide_partname(number)?.clone();
        SlideMut::load(&mut self.opc, partname)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.opc.to_bytes()?)
    }

    /// Save atomically: the file at `path` is either fully replaced or untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        Ok(self.opc.save(path)?)
    }

    /// Get the underlying OPC package.
    #[inline]
    pub fn opc_package(&self) -> &OpcPackage {
        &self.opc
    }
}

/// Slide part names listed by `p:sldIdLst`, in order.
fn slide_partnames(opc: &OpcPackage, presentation: &PackURI) -> Result<Vec<PackURI>> {
    let xml = std::str::from_utf8(opc.blob(presentation)?)?;
    let tree = ElementTree::parse(xml)?;
    let rels = opc.rels_for(presentation)?;

    let Some(list) = tree.find("sldIdLst") else {
        return Ok(Vec::new());
    };

    let mut slides = Vec::new();
    for idx in tree.children(list) {
        let span = tree.get(idx);
        if span.local_name() != "sldId" {
            continue;
        }
        // `r:id` (any prefix), not the numeric `id`
        let r_id = span
            .attrs
            .iter()
            .find(|(key, _)| matches!(key.split_once(':'), Some((_, "id"))))
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| OoxmlError::InvalidFormat("sldId without r:id".to_string()))?;
        let rel = rels.get(r_id).ok_or_else(|| {
            OoxmlError::InvalidFormat(format!("slide relationship {} not found", r_id))
        })?;
        slides.push(rels.target_partname(rel)?);
    }

    Ok(slides)
}
