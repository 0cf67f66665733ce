//! Separation and DeviceN color space objects.
//!
//! A plate image is drawn through its colorant's `/Separation` space, so a
//! tint value renders in the colorant's CMYK appearance. Composite DeviceN
//! images carry the whole catalog; the process-only and spot-only views
//! reuse the same channel data through a variant whose unselected colorant
//! names are replaced by `/None`, positions preserved.

use pdf_writer::types::PostScriptOp;
use pdf_writer::writers::ExponentialFunction;
use pdf_writer::{Chunk, Finish, Name, Ref, Writer};

use crate::chunk_container::ChunkContainer;
use crate::colorant::Colorant;
use crate::serialize::{Object, SerializerContext};
use crate::tint::{CompositeTintTransform, TintTransform};
use crate::util::NameExt;

pub(crate) const DEVICE_GRAY: &str = "DeviceGray";
pub(crate) const DEVICE_CMYK: &str = "DeviceCMYK";

/// A `[/Separation name /DeviceCMYK tint]` color space with an inline
/// Type 2 tint function.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) struct SeparationColorSpace {
    colorant: Colorant,
}

impl SeparationColorSpace {
    pub fn new(colorant: Colorant) -> Self {
        Self { colorant }
    }
}

impl Object for SeparationColorSpace {
    fn chunk_container(cc: &mut ChunkContainer) -> &mut Vec<Chunk> {
        &mut cc.color_spaces
    }

    fn serialize(self, _: &mut SerializerContext, root_ref: Ref) -> Chunk {
        let transform = TintTransform::for_colorant(&self.colorant);

        let mut chunk = Chunk::new();

        let mut array = chunk.indirect(root_ref).array();
        array.item(Name(b"Separation"));
        array.item(self.colorant.name().to_pdf_name());
        array.item(DEVICE_CMYK.to_pdf_name());

        // Tint 0 is no ink, which is white in the subtractive alternate
        // space, so C0 stays all-zero.
        ExponentialFunction::start(array.push())
            .domain([0.0, 1.0])
            .range([0.0, 1.0].repeat(4))
            .c0([0.0; 4])
            .c1(transform.full_tint_components())
            .n(1.0);

        array.finish();

        chunk
    }
}

/// A `[/DeviceN names /DeviceCMYK tint]` color space over the catalog's
/// colorants, with a Type 4 calculator as the tint transform.
///
/// `mask` selects which colorants are visible: unselected entries keep
/// their array position but their name becomes `/None` and their weight in
/// the tint transform drops to zero.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) struct DeviceNColorSpace {
    colorants: Vec<Colorant>,
    mask: u32,
}

impl DeviceNColorSpace {
    pub fn new(colorants: Vec<Colorant>, mask: u32) -> Self {
        Self { colorants, mask }
    }
}

impl Object for DeviceNColorSpace {
    fn chunk_container(cc: &mut ChunkContainer) -> &mut Vec<Chunk> {
        &mut cc.color_spaces
    }

    fn serialize(self, sc: &mut SerializerContext, root_ref: Ref) -> Chunk {
        let tint_ref = sc.new_ref();
        let transform = CompositeTintTransform::from_colorants(&self.colorants, self.mask);

        let mut chunk = Chunk::new();

        let mut array = chunk.indirect(root_ref).array();
        array.item(Name(b"DeviceN"));

        let mut names = array.push().array();
        for (i, colorant) in self.colorants.iter().enumerate() {
            if self.mask >> i & 1 == 1 {
                names.item(colorant.name().to_pdf_name());
            } else {
                names.item(Name(b"None"));
            }
        }
        names.finish();

        array.item(DEVICE_CMYK.to_pdf_name());
        array.item(tint_ref);
        array.finish();

        let code = transform.to_postscript();
        let encoded = PostScriptOp::encode(&code);
        let mut function = chunk.post_script_function(tint_ref, &encoded);
        function.domain(transform.domain());
        function.range([0.0, 1.0].repeat(4));
        function.finish();

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorant::{Cmyk, ProcessColor};
    use crate::serialize::SerializeSettings;

    fn serialized(object: impl Object) -> String {
        let mut sc = SerializerContext::new(SerializeSettings::default_test());
        let root_ref = sc.new_ref();
        let chunk = object.serialize(&mut sc, root_ref);
        String::from_utf8_lossy(chunk.as_bytes()).to_string()
    }

    #[test]
    fn separation_array_names_the_colorant() {
        let text = serialized(SeparationColorSpace::new(Colorant::Spot {
            name: "PANTONE 185 C".into(),
            alternate: Cmyk(0, 230, 200, 0),
        }));

        assert!(text.contains("/Separation"));
        // Spaces in a colorant name are hex-escaped in the PDF name.
        assert!(text.contains("/PANTONE#20185#20C"));
        assert!(text.contains("/DeviceCMYK"));
        assert!(text.contains("/FunctionType 2"));
    }

    #[test]
    fn masked_device_n_substitutes_none() {
        let colorants = vec![
            Colorant::Process(ProcessColor::Cyan),
            Colorant::Spot {
                name: "Gold".into(),
                alternate: Cmyk(20, 30, 180, 10),
            },
        ];

        // Only the spot selected; the process slot becomes /None.
        let text = serialized(DeviceNColorSpace::new(colorants, 0b10));
        assert!(text.contains("/DeviceN"));
        assert!(text.contains("/None"));
        assert!(!text.contains("/Cyan"));
        assert!(text.contains("/Gold"));
        assert!(text.contains("/FunctionType 4"));
    }
}
