//! Image XObjects for plates and composites.
//!
//! Plates draw through their colorant's Separation space: 8-bit extracted
//! and screened plates as grayscale-shaped tint data, 1-bit spot plates as
//! bilevel tint data that doubles as its own soft mask. Screened plates
//! carry their presence mask as a 1-bit DeviceGray soft mask so the blank
//! cells of the doubled grid stay transparent. Composites are DeviceCMYK
//! or DeviceN.

use pdf_writer::{Chunk, Finish, Name, Ref};

use crate::chunk_container::ChunkContainer;
use crate::colorant::{Colorant, ColorantCatalog};
use crate::object::color_space::{DeviceNColorSpace, SeparationColorSpace, DEVICE_CMYK, DEVICE_GRAY};
use crate::raster::RasterBuffer;
use crate::separation::{Plate, PlateData};
use crate::serialize::{CSWrapper, Object, SerializerContext};
use crate::util::NameExt;

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
enum ImageColorSpace {
    DeviceCmyk,
    Separation(Colorant),
    DeviceN { colorants: Vec<Colorant>, mask: u32 },
}

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
struct SMask {
    // 1-bpc rows, tightly packed; set bit = opaque.
    data: Vec<u8>,
    width: u32,
    height: u32,
}

#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub(crate) struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    bits_per_component: u8,
    color_space: ImageColorSpace,
    s_mask: Option<SMask>,
}

impl Image {
    /// The image of one plate, in the colorant's Separation space.
    ///
    /// Returns `None` for plates whose buffer was released for absence.
    pub fn from_plate(plate: &Plate) -> Option<Self> {
        let color_space = ImageColorSpace::Separation(plate.colorant().clone());

        let image = match plate.data()? {
            PlateData::Gray(values) => Self {
                data: values.packed_rows(),
                width: values.width(),
                height: values.height(),
                bits_per_component: 8,
                color_space,
                s_mask: None,
            },
            PlateData::Screened { values, mask } => Self {
                data: values.packed_rows(),
                width: values.width(),
                height: values.height(),
                bits_per_component: 8,
                color_space,
                s_mask: Some(SMask {
                    data: mask.data().to_vec(),
                    width: mask.width(),
                    height: mask.height(),
                }),
            },
            // The spot plate doubles as its own mask: unmatched pixels are
            // transparent rather than painted at tint zero.
            PlateData::Bilevel(bits) => Self {
                data: bits.data().to_vec(),
                width: bits.width(),
                height: bits.height(),
                bits_per_component: 1,
                color_space,
                s_mask: Some(SMask {
                    data: bits.data().to_vec(),
                    width: bits.width(),
                    height: bits.height(),
                }),
            },
        };

        Some(image)
    }

    /// A full-page CMYK composite. The raster must have four channels.
    pub fn composite_cmyk(raster: &RasterBuffer) -> Option<Self> {
        if raster.num_channels() != 4 {
            return None;
        }

        Some(Self {
            data: raster.packed_rows(),
            width: raster.width(),
            height: raster.height(),
            bits_per_component: 8,
            color_space: ImageColorSpace::DeviceCmyk,
            s_mask: None,
        })
    }

    /// A DeviceN composite over the catalog; `mask` selects the visible
    /// colorants (unselected channels render as `/None`).
    pub fn composite_device_n(
        raster: &RasterBuffer,
        catalog: &ColorantCatalog,
        mask: u32,
    ) -> Option<Self> {
        if raster.num_channels() as usize != catalog.len() {
            return None;
        }

        Some(Self {
            data: raster.packed_rows(),
            width: raster.width(),
            height: raster.height(),
            bits_per_component: 8,
            color_space: ImageColorSpace::DeviceN {
                colorants: catalog.colorants().to_vec(),
                mask,
            },
            s_mask: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl Object for Image {
    fn chunk_container(cc: &mut ChunkContainer) -> &mut Vec<Chunk> {
        &mut cc.images
    }

    fn serialize(self, sc: &mut SerializerContext, root_ref: Ref) -> Chunk {
        let color_space = match &self.color_space {
            ImageColorSpace::DeviceCmyk => CSWrapper::Name(Name(DEVICE_CMYK.as_bytes())),
            ImageColorSpace::Separation(colorant) => {
                CSWrapper::Ref(sc.add_object(SeparationColorSpace::new(colorant.clone())))
            }
            ImageColorSpace::DeviceN { colorants, mask } => {
                CSWrapper::Ref(sc.add_object(DeviceNColorSpace::new(colorants.clone(), *mask)))
            }
        };

        let mut chunk = Chunk::new();

        let s_mask_ref = self.s_mask.as_ref().map(|s_mask| {
            let s_mask_id = sc.new_ref();
            let (data, filter) = sc.get_binary_stream(&s_mask.data);
            let mut mask_x_object = chunk.image_xobject(s_mask_id, &data);
            mask_x_object.filter(filter);
            mask_x_object.width(s_mask.width as i32);
            mask_x_object.height(s_mask.height as i32);
            // Soft mask color space must be DeviceGray, see Table 145.
            mask_x_object.pair(Name(b"ColorSpace"), DEVICE_GRAY.to_pdf_name());
            mask_x_object.bits_per_component(1);
            s_mask_id
        });

        let (data, filter) = sc.get_binary_stream(&self.data);
        let mut image_x_object = chunk.image_xobject(root_ref, &data);
        image_x_object.filter(filter);
        image_x_object.width(self.width as i32);
        image_x_object.height(self.height as i32);
        image_x_object.pair(Name(b"ColorSpace"), color_space);
        image_x_object.bits_per_component(self.bits_per_component as i32);
        if let Some(s_mask_ref) = s_mask_ref {
            image_x_object.s_mask(s_mask_ref);
        }
        image_x_object.finish();

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colorant::{Cmyk, InkRecord};
    use crate::separation::separate_halftone;
    use crate::serialize::SerializeSettings;

    fn serialized(image: Image) -> String {
        let mut sc = SerializerContext::new(SerializeSettings::default_test());
        let root_ref = sc.new_ref();
        let chunk = image.serialize(&mut sc, root_ref);
        String::from_utf8_lossy(chunk.as_bytes()).to_string()
    }

    fn screened_plates() -> Vec<Plate> {
        let mut catalog = ColorantCatalog::build([InkRecord::spot("Gold", Cmyk(20, 30, 180, 10))]);
        catalog.ensure_process_colorants();

        let mut source = RasterBuffer::new(2, 2, 4).unwrap();
        source.set_sample(0, 0, 0, 255);
        for (ch, v) in [20u8, 30, 180, 10].into_iter().enumerate() {
            source.set_sample(1, 1, ch as u8, v);
        }

        separate_halftone(&mut source, &catalog).unwrap()
    }

    #[test]
    fn screened_plate_carries_a_soft_mask() {
        let plates = screened_plates();
        let cyan = plates.iter().find(|p| p.name() == "Cyan").unwrap();

        let image = Image::from_plate(cyan).unwrap();
        assert_eq!(image.width(), 4);
        assert_eq!(image.height(), 4);

        let text = serialized(image);
        assert!(text.contains("/SMask"));
        assert!(text.contains("/BitsPerComponent 8"));
    }

    #[test]
    fn bilevel_spot_plate_is_its_own_mask() {
        let plates = screened_plates();
        let gold = plates.iter().find(|p| p.name() == "Gold").unwrap();

        let image = Image::from_plate(gold).unwrap();
        assert_eq!(image.bits_per_component, 1);
        let mask = image.s_mask.as_ref().unwrap();
        assert_eq!(mask.data, image.data);
    }

    #[test]
    fn absent_plate_has_no_image() {
        let plates = screened_plates();
        let magenta = plates.iter().find(|p| p.name() == "Magenta").unwrap();
        assert!(!magenta.present());
        assert!(Image::from_plate(magenta).is_none());
    }

    #[test]
    fn composite_requires_matching_geometry() {
        let catalog = ColorantCatalog::build([InkRecord::spot("Gold", Cmyk(1, 2, 3, 4))]);
        let raster = RasterBuffer::new(2, 2, 4).unwrap();

        assert!(Image::composite_cmyk(&raster).is_some());
        // One spot colorant, four channels: not a catalog-shaped raster.
        assert!(Image::composite_device_n(&raster, &catalog, u32::MAX).is_none());
    }
}
