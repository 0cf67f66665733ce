//! Collects all chunks created while building the proof and writes them
//! out in an orderly manner.

use std::collections::HashMap;

use pdf_writer::{Chunk, Pdf, Ref};

use crate::metadata::Metadata;
use crate::serialize::SerializeSettings;

pub(crate) struct ChunkContainer {
    pub(crate) page_tree: Option<(Ref, Chunk)>,

    pub(crate) pages: Vec<Chunk>,
    pub(crate) fonts: Vec<Chunk>,
    pub(crate) color_spaces: Vec<Chunk>,
    pub(crate) images: Vec<Chunk>,

    pub(crate) metadata: Option<Metadata>,
}

impl ChunkContainer {
    pub fn new() -> Self {
        Self {
            page_tree: None,

            pages: vec![],
            fonts: vec![],
            color_spaces: vec![],
            images: vec![],

            metadata: None,
        }
    }

    pub fn finish(mut self, serialize_settings: SerializeSettings) -> Pdf {
        let mut remapped_ref = Ref::new(1);
        let mut remapper = HashMap::new();

        // Traverse the fields in the order they will be written and assign
        // new references as we go, so the final document is numbered
        // monotonically regardless of the order the chunks were created in.
        let mut chunks_len = 0;
        macro_rules! remap_field {
            ($remapper:expr, $remapped_ref:expr; $($field:expr),+) => {
                $(
                    if let Some((original_ref, chunk)) = $field {
                        chunks_len += chunk.len();
                        for object_ref in chunk.refs() {
                            debug_assert!(!remapper.contains_key(&object_ref));

                            $remapper.insert(object_ref, $remapped_ref.bump());
                        }

                        *original_ref = *remapper.get(original_ref).unwrap();
                    }
                )+
            };
        }

        macro_rules! remap_fields {
            ($remapper:expr, $remapped_ref:expr; $($field:expr),+) => {
                $(
                    for chunk in $field {
                        chunks_len += chunk.len();
                        for ref_ in chunk.refs() {
                            debug_assert!(!remapper.contains_key(&ref_));

                            $remapper.insert(ref_, $remapped_ref.bump());
                        }
                    }
                )+
            };
        }

        remap_field!(remapper, remapped_ref; &mut self.page_tree);
        remap_fields!(remapper, remapped_ref; &self.pages, &self.fonts, &self.color_spaces, &self.images);

        // The lengths will shift slightly while renumbering, so pad a bit
        // to avoid reallocation in the common case. The 200 covers the
        // document catalog and info dictionary.
        let mut pdf = Pdf::with_capacity((chunks_len as f32 * 1.1 + 200.0) as usize);

        if serialize_settings.ascii_compatible {
            pdf.set_binary_marker(&[b'A', b'A', b'A', b'A'])
        }

        macro_rules! write_field {
            ($remapper:expr, $pdf:expr; $($field:expr),+) => {
                $(
                    if let Some((_, chunk)) = $field {
                        chunk.renumber_into($pdf, |old| *$remapper.get(&old).unwrap());
                    }
                )+
            };
        }

        macro_rules! write_fields {
            ($remapper:expr, $pdf:expr; $($field:expr),+) => {
                $(
                    for chunk in $field {
                        chunk.renumber_into($pdf, |old| *$remapper.get(&old).unwrap());
                    }
                )+
            };
        }

        write_field!(remapper, &mut pdf; &self.page_tree);
        write_fields!(remapper, &mut pdf; &self.pages, &self.fonts, &self.color_spaces, &self.images);

        if let Some(metadata) = &self.metadata {
            metadata.serialize_document_info(&mut remapped_ref, &mut pdf);
        }

        if let Some(page_tree) = &self.page_tree {
            let catalog_ref = remapped_ref.bump();
            pdf.catalog(catalog_ref).pages(page_tree.0);
        }

        pdf
    }
}
