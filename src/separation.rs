//! Plate separation.
//!
//! Converts one rendered composite raster into per-colorant plates, either
//! by per-channel extraction of a DeviceN raster or by screening a CMYK
//! raster onto double-resolution process plates after an exact-match
//! spot-color pre-pass.

use tracing::debug;

use crate::colorant::{Colorant, ColorantCatalog, ProcessColor};
use crate::raster::{BitRaster, RasterBuffer};

/// The pixel payload of a plate.
#[derive(Debug, Clone)]
pub enum PlateData {
    /// 8-bit ink values at source resolution (DeviceN extraction).
    Gray(RasterBuffer),
    /// 8-bit ink values at doubled resolution plus the parallel presence
    /// mask (halftoned process plate).
    Screened {
        values: RasterBuffer,
        mask: BitRaster,
    },
    /// 1-bit exact-match plate at source resolution (spot pre-pass). The
    /// plate doubles as its own mask.
    Bilevel(BitRaster),
}

/// One colorant's extracted printing surface.
#[derive(Debug, Clone)]
pub struct Plate {
    colorant: Colorant,
    width: u32,
    height: u32,
    present: bool,
    coverage: f64,
    data: Option<PlateData>,
}

impl Plate {
    fn new(colorant: Colorant, width: u32, height: u32, nonzero: u64, data: PlateData) -> Self {
        let present = nonzero > 0;
        let coverage = nonzero as f64 / (width as f64 * height as f64);

        Self {
            colorant,
            width,
            height,
            present,
            // Empty plates release their buffer immediately; the plate
            // itself stays to report the colorant as absent.
            data: present.then_some(data),
            coverage,
        }
    }

    pub fn colorant(&self) -> &Colorant {
        &self.colorant
    }

    pub fn name(&self) -> &str {
        self.colorant.name()
    }

    /// Plate width in plate pixels (doubled for screened plates).
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether at least one nonzero pixel was found for this colorant.
    pub fn present(&self) -> bool {
        self.present
    }

    /// The fraction of nonzero pixels in the plate's own pixel grid.
    pub fn coverage(&self) -> f64 {
        self.coverage
    }

    /// The plate's pixel data; `None` once released for absence.
    pub fn data(&self) -> Option<&PlateData> {
        self.data.as_ref()
    }
}

/// Extracts one single-channel plate per catalog colorant from a DeviceN
/// raster whose channel order matches the catalog.
///
/// Plate k of pixel (col, row) is the source byte
/// `row * stride + col * num_channels + k`, pixel for pixel with no
/// resampling. Returns `None` when the raster's channel count does not
/// match the catalog or a plate buffer cannot be allocated.
pub fn separate_device_n(
    source: &RasterBuffer,
    catalog: &ColorantCatalog,
) -> Option<Vec<Plate>> {
    if source.num_channels() as usize != catalog.len() {
        return None;
    }

    let width = source.width();
    let height = source.height();
    let channels = source.num_channels() as usize;
    let payload = width as usize * channels;

    let mut plates = Vec::with_capacity(catalog.len());
    for (k, colorant) in catalog.iter().enumerate() {
        let mut values = RasterBuffer::new(width, height, 1)?;
        let mut nonzero = 0u64;

        for y in 0..height {
            let row = &source.row(y)[..payload];
            for (x, group) in row.chunks_exact(channels).enumerate() {
                let value = group[k];
                if value != 0 {
                    values.set_sample(x as u32, y, 0, value);
                    nonzero += 1;
                }
            }
        }

        debug!(
            colorant = colorant.name(),
            nonzero, "extracted DeviceN channel"
        );
        plates.push(Plate::new(
            colorant.clone(),
            width,
            height,
            nonzero,
            PlateData::Gray(values),
        ));
    }

    Some(plates)
}

/// Corner of the 2x2 destination block receiving a channel's value, per
/// phase: the alternating diagonal assignment that emulates a 45 degree
/// screen.
const PHASE_OFFSETS: [[(u32, u32); 4]; 2] = [
    // (row % 2 + col % 2) % 2 == 0: C top-left, M top-right,
    // Y bottom-left, K bottom-right.
    [(0, 0), (1, 0), (0, 1), (1, 1)],
    // Other phase: the complementary diagonal.
    [(1, 1), (0, 1), (1, 0), (0, 0)],
];

/// Separates a CMYK raster by screening it onto double-resolution process
/// plates, after claiming exact spot-color matches into 1-bit plates.
///
/// The spot pre-pass compares each pixel's full CMYK quadruple against
/// every spot colorant's stored alternate, bit for bit; matches are zeroed
/// out of `source` and recorded on the spot's plate, so `source` holds the
/// unconsumed process-only color afterwards. Any nonzero remaining value
/// is screened; there is no minimum-coverage threshold.
///
/// The catalog should contain all four process colorants
/// ([`ColorantCatalog::ensure_process_colorants`]); channels of a missing
/// process colorant would go unattributed. Returns `None` when the raster
/// is not 4-channel or a plate buffer cannot be allocated.
pub fn separate_halftone(
    source: &mut RasterBuffer,
    catalog: &ColorantCatalog,
) -> Option<Vec<Plate>> {
    if source.num_channels() != 4 {
        return None;
    }
    debug_assert!(
        ProcessColor::ALL
            .iter()
            .all(|pc| catalog.index_of(pc.name()).is_some()),
        "halftone separation over an incomplete process block"
    );

    let width = source.width();
    let height = source.height();

    let spot_matches = claim_spot_matches(source, catalog)?;

    // Screen the remaining color onto the four process plates at doubled
    // resolution.
    let out_w = width.checked_mul(2)?;
    let out_h = height.checked_mul(2)?;
    let mut screened: Vec<(RasterBuffer, BitRaster, u64)> = Vec::with_capacity(4);
    for _ in 0..4 {
        screened.push((
            RasterBuffer::new(out_w, out_h, 1)?,
            BitRaster::new(out_w, out_h)?,
            0,
        ));
    }

    for row in 0..height {
        for col in 0..width {
            let phase = ((row % 2 + col % 2) % 2) as usize;
            let pixel: [u8; 4] = source.pixel(col, row).try_into().ok()?;

            for (channel, value) in pixel.into_iter().enumerate() {
                if value == 0 {
                    continue;
                }

                let (dx, dy) = PHASE_OFFSETS[phase][channel];
                let (values, mask, nonzero) = &mut screened[channel];
                values.set_sample(2 * col + dx, 2 * row + dy, 0, value);
                mask.set(2 * col + dx, 2 * row + dy);
                *nonzero += 1;
            }
        }
    }

    // Assemble in catalog order.
    let mut spot_matches = spot_matches;
    let mut screened = screened.into_iter().map(Some).collect::<Vec<_>>();
    let mut plates = Vec::with_capacity(catalog.len());

    for (index, colorant) in catalog.iter().enumerate() {
        let plate = match colorant {
            Colorant::Process(pc) => {
                let (values, mask, nonzero) =
                    screened[pc.channel() as usize].take()?;
                Plate::new(
                    colorant.clone(),
                    out_w,
                    out_h,
                    nonzero,
                    PlateData::Screened { values, mask },
                )
            }
            Colorant::Spot { .. } => {
                let (bits, matches) = spot_matches.remove(&index)?;
                Plate::new(
                    colorant.clone(),
                    width,
                    height,
                    matches,
                    PlateData::Bilevel(bits),
                )
            }
        };

        debug!(
            colorant = plate.name(),
            present = plate.present(),
            "separated plate"
        );
        plates.push(plate);
    }

    Some(plates)
}

/// The spot-color pre-pass: claims exact-match pixels into per-spot 1-bit
/// plates and zeroes them out of the working raster.
///
/// A pixel is claimed by at most one spot; the first matching colorant in
/// catalog order wins. All-zero pixels carry no ink and are never claimed.
fn claim_spot_matches(
    source: &mut RasterBuffer,
    catalog: &ColorantCatalog,
) -> Option<std::collections::HashMap<usize, (BitRaster, u64)>> {
    let mut spots: Vec<(usize, [u8; 4], BitRaster, u64)> = Vec::new();
    for (index, colorant) in catalog.iter().enumerate() {
        if let Colorant::Spot { alternate, .. } = colorant {
            spots.push((
                index,
                alternate.as_bytes(),
                BitRaster::new(source.width(), source.height())?,
                0,
            ));
        }
    }

    if !spots.is_empty() {
        for y in 0..source.height() {
            for x in 0..source.width() {
                let pixel: [u8; 4] = source.pixel(x, y).try_into().ok()?;
                if pixel == [0, 0, 0, 0] {
                    continue;
                }

                if let Some((_, _, bits, matches)) =
                    spots.iter_mut().find(|(_, key, _, _)| *key == pixel)
                {
                    bits.set(x, y);
                    *matches += 1;
                    source.pixel_mut(x, y).fill(0);
                }
            }
        }
    }

    Some(
        spots
            .into_iter()
            .map(|(index, _, bits, matches)| (index, (bits, matches)))
            .collect(),
    )
}
