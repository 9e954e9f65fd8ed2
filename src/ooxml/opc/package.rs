//! In-memory OPC package.
//!
//! Every member of the ZIP container is held as raw bytes in archive order.
//! Parts that are not touched are written back byte-for-byte; relationships
//! and content types are parsed on demand.
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::content_types::ContentTypes;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::{PhysPkgWriter, read_members};
use crate::ooxml::opc::rel::Relationships;
use std::path::Path;
use tracing::debug;

pub struct OpcPackage {
    /// (member name, blob) in archive order, `[Content_Types].xml` excluded
    parts: Vec<(String, Vec<u8>)>,
    content_types: ContentTypes,
}

impl OpcPackage {
    /// Open an OPC package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(OpcError::PackageNotFound(path.display().to_string()));
        }
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load an OPC package from the bytes of its ZIP container.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let content_types_name = &CONTENT_TYPES_URI[1..];
        let mut content_types = None;
        let mut parts = Vec::new();

        for (name, blob) in read_members(data)? {
            if name == content_types_name {
                content_types = Some(ContentTypes::from_xml(&blob)?);
            } else {
                parts.push((name, blob));
            }
        }

        let content_types =
            content_types.ok_or_else(|| OpcError::PartNotFound(CONTENT_TYPES_URI.to_string()))?;
        debug!(parts = parts.len(), "loaded OPC package");

        Ok(Self {
            parts,
            content_types,
        })
    }

    /// The main document part named by the package's officeDocument relationship.
    pub fn main_document_partname(&self) -> Result<PackURI> {
        let pkg_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let rels = self.rels_for(&pkg_uri)?;
        let rel = rels.part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        rels.target_partname(rel)
    }

    #[inline]
    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    #[inline]
    pub fn content_types_mut(&mut self) -> &mut ContentTypes {
        &mut self.content_types
    }

    pub fn contains(&self, partname: &PackURI) -> bool {
        self.parts.iter().any(|(name, _)| name == partname.membername())
    }

    pub fn blob(&self, partname: &PackURI) -> Result<&[u8]> {
        self.parts
            .iter()
            .find(|(name, _)| name == partname.membername())
            .map(|(_, blob)| blob.as_slice())
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Replace the blob of a part, appending the part if it is new.
    pub fn set_blob(&mut self, partname: &PackURI, blob: Vec<u8>) {
        match self
            .parts
            .iter_mut()
            .find(|(name, _)| name == partname.membername())
        {
            Some((_, existing)) => *existing = blob,
            None => self.parts.push((partname.membername().to_string(), blob)),
        }
    }

    /// Drop a part together with its own relationships and content-type override.
    pub fn remove_part(&mut self, partname: &PackURI) -> bool {
        let rels_name = partname.rels_uri();
        let before = self.parts.len();
        self.parts.retain(|(name, _)| {
            name != partname.membername() && name != rels_name.membername()
        });
        self.content_types.remove_override(partname);
        self.parts.len() != before
    }

    /// Relationships whose source is `source` (empty if it has no `.rels` part).
    pub fn rels_for(&self, source: &PackURI) -> Result<Relationships> {
        let rels_uri = source.rels_uri();
        match self.blob(&rels_uri) {
            Ok(blob) => Relationships::from_xml(source.base_uri(), blob),
            Err(OpcError::PartNotFound(_)) => Ok(Relationships::new(source.base_uri())),
            Err(e) => Err(e),
        }
    }

    pub fn set_rels(&mut self, source: &PackURI, rels: &Relationships) {
        self.set_blob(&source.rels_uri(), rels.to_xml().into_bytes());
    }

    /// Whether any relationship in the package targets `partname`.
    pub fn is_referenced(&self, partname: &PackURI) -> Result<bool> {
        for (name, blob) in &self.parts {
            if !name.ends_with(".rels") {
                continue;
            }
            let rels_uri = PackURI::from_membername(name);
            let source_dir = source_dir_of_rels(&rels_uri);
            let rels = Relationships::from_xml(source_dir, blob)?;
            for rel in rels.iter().filter(|r| !r.is_external()) {
                if rels.target_partname(rel)? == *partname {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Part names, in archive order.
    pub fn partnames(&self) -> impl Iterator<Item = PackURI> + '_ {
        self.parts.iter().map(|(name, _)| PackURI::from_membername(name))
    }

    /// Serialize to the bytes of a ZIP container.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = PhysPkgWriter::new();
        writer.write(&CONTENT_TYPES_URI[1..], self.content_types.to_xml().as_bytes())?;
        for (name, blob) in &self.parts {
            writer.write(name, blob)?;
        }
        writer.finish()
    }

    /// Save to `path` through a sibling temporary file and an atomic rename.
    ///
    /// The destination is either fully replaced or left as it was.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        std::io::Write::write_all(&mut tmp, &bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| OpcError::Io(e.error))?;

        debug!(path = %path.display(), bytes = bytes.len(), "saved OPC package");
        Ok(())
    }
}

/// `/ppt/slides/_rels/slide1.xml.rels` -> `/ppt/slides`
fn source_dir_of_rels(rels_uri: &PackURI) -> &str {
    let dir = rels_uri.base_uri();
    match dir.strip_suffix("/_rels") {
        Some("") => "/",
        Some(parent) => parent,
        None if dir == "/_rels" => "/",
        None => dir,
    }
}
