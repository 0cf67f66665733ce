//! Building proof page content streams.

use pdf_writer::{Chunk, Content, Name, Ref, Str};

use crate::chunk_container::ChunkContainer;
use crate::serialize::{Object, SerializerContext};

/// The standard-14 Helvetica font captions are set in. Not embedded; every
/// caption is WinAnsi-safe ASCII.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) struct CaptionFont;

impl Object for CaptionFont {
    fn chunk_container(cc: &mut ChunkContainer) -> &mut Vec<Chunk> {
        &mut cc.fonts
    }

    fn serialize(self, _: &mut SerializerContext, root_ref: Ref) -> Chunk {
        let mut chunk = Chunk::new();
        chunk
            .type1_font(root_ref)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        chunk
    }
}

/// Builds the content stream of one proof page: images placed via
/// `cm`/`Do` under a saved graphics state, captions as Helvetica text.
pub(crate) struct ContentBuilder {
    content: Content,
}

impl ContentBuilder {
    pub fn new() -> Self {
        Self {
            content: Content::new(),
        }
    }

    /// Draws the XObject `name` into the axis-aligned box with origin
    /// (`x`, `y`) and the given extent. Image space is the unit square, so
    /// the transform carries the whole placement.
    pub fn draw_image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        self.content.save_state();
        self.content.transform([width, 0.0, 0.0, height, x, y]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
    }

    /// Draws one line of caption text with its baseline at (`x`, `y`).
    pub fn draw_text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        self.content.save_state();
        self.content.begin_text();
        self.content.set_font(Name(font.as_bytes()), size);
        self.content.set_fill_gray(0.0);
        self.content.next_line(x, y);
        self.content.show(Str(text.as_bytes()));
        self.content.end_text();
        self.content.restore_state();
    }

    pub fn finish(self) -> Vec<u8> {
        self.content.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_placement_wraps_in_a_state_save() {
        let mut builder = ContentBuilder::new();
        builder.draw_image("Im1", 10.0, 20.0, 100.0, 50.0);

        let stream = String::from_utf8(builder.finish()).unwrap();
        assert_eq!(stream, "q\n100 0 0 50 10 20 cm\n/Im1 Do\nQ");
    }

    #[test]
    fn captions_are_text_objects() {
        let mut builder = ContentBuilder::new();
        builder.draw_text("F1", 9.0, 12.0, 18.0, "Coverage: 12.5%");

        let stream = String::from_utf8(builder.finish()).unwrap();
        assert!(stream.contains("BT"));
        assert!(stream.contains("/F1 9 Tf"));
        assert!(stream.contains("12 18 Td"));
        assert!(stream.contains("(Coverage: 12.5%) Tj"));
        assert!(stream.contains("ET"));
    }
}
