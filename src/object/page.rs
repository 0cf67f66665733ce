//! Proof page objects.

use pdf_writer::{Chunk, Finish, Ref};

use crate::serialize::SerializerContext;
use crate::util::NameExt;

/// One finished proof page: a media box, a content stream and the
/// resources the stream references by name.
#[derive(Debug)]
pub(crate) struct Page {
    pub size: (f32, f32),
    pub content: Vec<u8>,
    pub x_objects: Vec<(String, Ref)>,
    pub fonts: Vec<(String, Ref)>,
}

impl Page {
    pub fn serialize(self, sc: &mut SerializerContext, root_ref: Ref) -> Chunk {
        let stream_ref = sc.new_ref();
        let page_tree_ref = sc.page_tree_ref();

        let mut chunk = Chunk::new();

        let mut page = chunk.page(root_ref);
        page.media_box(pdf_writer::Rect::new(0.0, 0.0, self.size.0, self.size.1));
        page.parent(page_tree_ref);
        page.contents(stream_ref);

        let mut resources = page.resources();
        if !self.x_objects.is_empty() {
            let mut x_objects = resources.x_objects();
            for (name, ref_) in &self.x_objects {
                x_objects.pair(name.to_pdf_name(), *ref_);
            }
        }
        if !self.fonts.is_empty() {
            let mut fonts = resources.fonts();
            for (name, ref_) in &self.fonts {
                fonts.pair(name.to_pdf_name(), *ref_);
            }
        }
        resources.finish();
        page.finish();

        let (stream, filter) = sc.get_content_stream(&self.content);
        let mut stream = chunk.stream(stream_ref, &stream);
        if let Some(filter) = filter {
            stream.filter(filter);
        }
        stream.finish();

        chunk
    }
}
