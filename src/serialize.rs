//! Serialization of proof objects into PDF chunks.
//!
//! The [`SerializerContext`] hands out monotonically increasing object
//! references, deduplicates cacheable objects by their sip hash (a color
//! space or tint function used on many pages serializes once) and collects
//! the produced chunks in the [`ChunkContainer`], which assembles the final
//! document.

use std::borrow::Cow;
use std::collections::HashMap;

use pdf_writer::{Chunk, Filter, Pdf, Ref};
use tracing::debug;

use crate::chunk_container::ChunkContainer;
use crate::metadata::Metadata;
use crate::object::page::Page;
use crate::util::SipHashable;

/// Settings for how the proof document is written out.
#[derive(Copy, Clone, Debug)]
pub struct SerializeSettings {
    /// Encode binary streams as ASCII hex instead of zlib. Makes the
    /// output inspectable with a text editor, at a size cost.
    pub ascii_compatible: bool,
    /// Compress page content streams.
    pub compress_content_streams: bool,
}

impl Default for SerializeSettings {
    fn default() -> Self {
        Self {
            ascii_compatible: false,
            compress_content_streams: true,
        }
    }
}

impl SerializeSettings {
    #[cfg(test)]
    pub(crate) fn default_test() -> Self {
        Self {
            ascii_compatible: true,
            compress_content_streams: false,
        }
    }
}

/// An object that serializes into its own PDF chunk and is deduplicated
/// by hash.
pub(crate) trait Object: SipHashable + Sized {
    /// The container bucket this object's chunk is filed under.
    fn chunk_container(cc: &mut ChunkContainer) -> &mut Vec<Chunk>;

    fn serialize(self, sc: &mut SerializerContext, root_ref: Ref) -> Chunk;
}

pub(crate) struct SerializerContext {
    cached_mappings: HashMap<u128, Ref>,
    chunk_container: ChunkContainer,
    page_refs: Vec<Ref>,
    page_tree_ref: Option<Ref>,
    cur_ref: Ref,
    pub(crate) serialize_settings: SerializeSettings,
}

impl SerializerContext {
    pub fn new(serialize_settings: SerializeSettings) -> Self {
        Self {
            cached_mappings: HashMap::new(),
            chunk_container: ChunkContainer::new(),
            page_refs: vec![],
            page_tree_ref: None,
            cur_ref: Ref::new(1),
            serialize_settings,
        }
    }

    pub fn new_ref(&mut self) -> Ref {
        self.cur_ref.bump()
    }

    pub fn page_tree_ref(&mut self) -> Ref {
        *self
            .page_tree_ref
            .get_or_insert_with(|| self.cur_ref.bump())
    }

    /// Adds a cacheable object, reusing the existing reference if an equal
    /// object was serialized before.
    pub fn add_object<T: Object>(&mut self, object: T) -> Ref {
        let hash = object.sip_hash();
        if let Some(ref_) = self.cached_mappings.get(&hash) {
            return *ref_;
        }

        let root_ref = self.new_ref();
        self.cached_mappings.insert(hash, root_ref);
        debug!(ref_ = root_ref.get(), "serializing new object");
        let chunk = object.serialize(self, root_ref);
        T::chunk_container(&mut self.chunk_container).push(chunk);

        root_ref
    }

    /// Appends a page to the document. Pages are never deduplicated; their
    /// order here is their order in the page tree.
    pub fn add_page(&mut self, page: Page) {
        let root_ref = self.new_ref();
        let chunk = page.serialize(self, root_ref);
        self.page_refs.push(root_ref);
        self.chunk_container.pages.push(chunk);
    }

    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.chunk_container.metadata = Some(metadata);
    }

    pub fn get_content_stream<'a>(&self, stream: &'a [u8]) -> (Cow<'a, [u8]>, Option<Filter>) {
        if !self.serialize_settings.compress_content_streams {
            (Cow::Borrowed(stream), None)
        } else {
            let (stream, filter) = self.get_binary_stream(stream);
            (Cow::Owned(stream), Some(filter))
        }
    }

    pub fn get_binary_stream(&self, stream: &[u8]) -> (Vec<u8>, Filter) {
        if self.serialize_settings.ascii_compatible {
            (hex_encode(stream), Filter::AsciiHexDecode)
        } else {
            (deflate(stream), Filter::FlateDecode)
        }
    }

    pub fn finish(mut self) -> Pdf {
        // Always write a page tree, even for a document that ended up with
        // zero pages; a catalog without one is not a valid PDF.
        let page_tree_ref = self.page_tree_ref();
        let mut page_tree_chunk = Chunk::new();
        page_tree_chunk
            .pages(page_tree_ref)
            .count(self.page_refs.len() as i32)
            .kids(self.page_refs.iter().copied());
        self.chunk_container.page_tree = Some((page_tree_ref, page_tree_chunk));

        self.chunk_container.finish(self.serialize_settings)
    }
}

/// A color space entry that is either a device color space name or a
/// reference to a Separation/DeviceN array.
#[derive(Copy, Clone)]
pub(crate) enum CSWrapper {
    Ref(Ref),
    Name(pdf_writer::Name<'static>),
}

impl pdf_writer::Primitive for CSWrapper {
    fn write(self, buf: &mut Vec<u8>) {
        match self {
            CSWrapper::Ref(r) => r.write(buf),
            CSWrapper::Name(n) => n.write(buf),
        }
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    const COMPRESSION_LEVEL: u8 = 6;
    miniz_oxide::deflate::compress_to_vec_zlib(data, COMPRESSION_LEVEL)
}

fn hex_encode(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(index, byte)| {
            let mut formatted = format!("{:02X}", byte);
            if index % 35 == 34 {
                formatted.push('\n');
            }
            formatted
        })
        .collect::<String>()
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorant::{Colorant, ProcessColor};
    use crate::object::color_space::SeparationColorSpace;

    #[test]
    fn equal_objects_share_one_reference() {
        let mut sc = SerializerContext::new(SerializeSettings::default_test());

        let first = sc.add_object(SeparationColorSpace::new(Colorant::Process(
            ProcessColor::Cyan,
        )));
        let second = sc.add_object(SeparationColorSpace::new(Colorant::Process(
            ProcessColor::Cyan,
        )));
        let other = sc.add_object(SeparationColorSpace::new(Colorant::Process(
            ProcessColor::Black,
        )));

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn empty_document_is_still_a_pdf() {
        let sc = SerializerContext::new(SerializeSettings::default_test());
        let pdf = sc.finish();

        let bytes = pdf.finish();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF") || bytes.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn hex_encoding_wraps_lines() {
        let encoded = hex_encode(&[0xABu8; 40]);
        let text = String::from_utf8(encoded).unwrap();
        assert!(text.starts_with("ABAB"));
        assert_eq!(text.lines().count(), 2);
    }
}
