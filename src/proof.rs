//! Proof document assembly.
//!
//! Drives the page-at-a-time separation loop and composites the results
//! into a PDF: per separated page first the full composite, then the
//! process-only and spot-only views where the page has both kinds of
//! content, then one page per present plate with its label and coverage
//! caption. All raster and plate buffers of a page are released before the
//! next page starts.

use tracing::debug;

use crate::content::{CaptionFont, ContentBuilder};
use crate::engine::{route_page, PageRenderer, ProofReport, RoutedPage, SeparationMode};
use crate::error::SeparationResult;
use crate::metadata::Metadata;
use crate::object::image::Image;
use crate::object::page::Page;
use crate::separation::Plate;
use crate::serialize::{SerializeSettings, SerializerContext};

/// Settings for a proof run.
#[derive(Debug, Clone)]
pub struct ProofSettings {
    /// The separation strategy.
    pub mode: SeparationMode,
    /// The resolution rendering requests are made at. The default of 72
    /// renders one pixel per point.
    pub dpi: f32,
    /// Caption text size in points.
    pub caption_size: f32,
    /// How the document is written out.
    pub serialize_settings: SerializeSettings,
    /// Metadata for the document info dictionary.
    pub metadata: Option<Metadata>,
}

impl ProofSettings {
    pub fn new() -> Self {
        Self {
            mode: SeparationMode::default(),
            dpi: 72.0,
            caption_size: 9.0,
            serialize_settings: SerializeSettings::default(),
            metadata: None,
        }
    }
}

impl Default for ProofSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Left margin of caption text, in points.
const CAPTION_MARGIN: f32 = 12.0;

/// Runs a full separation over every page of `renderer` and returns the
/// proof PDF together with the per-page report.
pub fn separate<R: PageRenderer>(
    renderer: &mut R,
    settings: ProofSettings,
) -> SeparationResult<(Vec<u8>, ProofReport)> {
    let mut document = ProofDocument::new(settings);
    document.run(renderer)?;
    Ok(document.finish())
}

/// An in-progress proof document.
///
/// [`run`](Self::run) can be called for several renderers in sequence;
/// their proof pages accumulate in one document.
pub struct ProofDocument {
    sc: SerializerContext,
    settings: ProofSettings,
    report: ProofReport,
}

impl ProofDocument {
    pub fn new(settings: ProofSettings) -> Self {
        let mut sc = SerializerContext::new(settings.serialize_settings);
        if let Some(metadata) = settings.metadata.clone() {
            sc.set_metadata(metadata);
        }

        Self {
            sc,
            settings,
            report: ProofReport::default(),
        }
    }

    /// Separates every page of `renderer` into this document.
    ///
    /// Fails only on a colorant overflow; pages the renderer cannot
    /// rasterize are recorded as skipped and processing continues.
    pub fn run<R: PageRenderer>(&mut self, renderer: &mut R) -> SeparationResult<()> {
        for page in 0..renderer.page_count() {
            let size = renderer.page_size(page);
            let routed = route_page(renderer, page, self.settings.mode, self.settings.dpi)?;

            self.report.pages.push(routed.outcome());
            self.emit_page(page, size, routed);
        }

        Ok(())
    }

    pub fn report(&self) -> &ProofReport {
        &self.report
    }

    /// Finishes the document and returns its bytes plus the report.
    pub fn finish(self) -> (Vec<u8>, ProofReport) {
        let pdf = self.sc.finish();
        (pdf.finish(), self.report)
    }

    fn emit_page(&mut self, page: usize, size: (f32, f32), routed: RoutedPage) {
        let number = page + 1;

        match routed {
            RoutedPage::Skipped { .. } => {}
            RoutedPage::CompositeOnly { raster } => {
                if let Some(image) = Image::composite_cmyk(&raster) {
                    self.push_proof_page(
                        size,
                        vec![image],
                        &[format!("Composite proof, page {number}")],
                    );
                }
            }
            RoutedPage::DeviceN {
                raster,
                catalog,
                plates,
            } => {
                debug!(page, plates = plates.len(), "compositing DeviceN page");

                let all = mask_of(catalog.len(), |_| true);
                if let Some(image) = Image::composite_device_n(&raster, &catalog, all) {
                    self.push_proof_page(
                        size,
                        vec![image],
                        &[format!("Composite proof, page {number}")],
                    );
                }

                if has_both_kinds(&plates) {
                    let process = mask_of(catalog.len(), |i| !catalog.colorants()[i].is_spot());
                    if let Some(image) = Image::composite_device_n(&raster, &catalog, process) {
                        self.push_proof_page(
                            size,
                            vec![image],
                            &[format!("Process colorants only, page {number}")],
                        );
                    }

                    let spot = mask_of(catalog.len(), |i| catalog.colorants()[i].is_spot());
                    if let Some(image) = Image::composite_device_n(&raster, &catalog, spot) {
                        self.push_proof_page(
                            size,
                            vec![image],
                            &[format!("Spot colorants only, page {number}")],
                        );
                    }
                }

                self.emit_plate_pages(number, size, &plates);
            }
            RoutedPage::Halftone {
                composite,
                remainder,
                catalog: _,
                plates,
            } => {
                debug!(page, plates = plates.len(), "compositing halftone page");

                if let Some(image) = Image::composite_cmyk(&composite) {
                    self.push_proof_page(
                        size,
                        vec![image],
                        &[format!("Composite proof, page {number}")],
                    );
                }

                if has_both_kinds(&plates) {
                    // The working raster after the spot pre-pass holds
                    // exactly the process-attributed color.
                    if let Some(image) = Image::composite_cmyk(&remainder) {
                        self.push_proof_page(
                            size,
                            vec![image],
                            &[format!("Process colorants only, page {number}")],
                        );
                    }

                    let spots: Vec<Image> = plates
                        .iter()
                        .filter(|plate| plate.colorant().is_spot())
                        .filter_map(Image::from_plate)
                        .collect();
                    if !spots.is_empty() {
                        self.push_proof_page(
                            size,
                            spots,
                            &[format!("Spot colorants only, page {number}")],
                        );
                    }
                }

                self.emit_plate_pages(number, size, &plates);
            }
        }
    }

    /// One page per present plate, in catalog order.
    fn emit_plate_pages(&mut self, number: usize, size: (f32, f32), plates: &[Plate]) {
        for plate in plates {
            let Some(image) = Image::from_plate(plate) else {
                continue;
            };

            let lines = [
                format!("{}, page {number}", plate.name()),
                format!("Coverage: {:.1}%", plate.coverage() * 100.0),
            ];
            self.push_proof_page(size, vec![image], &lines);
        }
    }

    /// Builds one output page: the images stacked into the fitted display
    /// box, the caption lines in the band below it.
    fn push_proof_page(&mut self, size: (f32, f32), images: Vec<Image>, lines: &[String]) {
        let caption_size = self.settings.caption_size;
        let band = caption_size * 4.0;

        // All images of one page share the source page's aspect, so the
        // first one fixes the placement for the whole stack.
        let (x, y, width, height) = fit_box(size, band, images[0].width(), images[0].height());

        let mut content = ContentBuilder::new();
        let mut x_objects = Vec::with_capacity(images.len());
        for (index, image) in images.into_iter().enumerate() {
            let name = format!("Im{}", index + 1);
            let ref_ = self.sc.add_object(image);
            content.draw_image(&name, x, y, width, height);
            x_objects.push((name, ref_));
        }

        let font_ref = self.sc.add_object(CaptionFont);
        let mut baseline = band - caption_size * 1.5;
        for line in lines {
            content.draw_text("F1", caption_size, CAPTION_MARGIN, baseline, line);
            baseline -= caption_size * 1.3;
        }

        self.sc.add_page(Page {
            size,
            content: content.finish(),
            x_objects,
            fonts: vec![("F1".to_string(), font_ref)],
        });
    }
}

/// A bitmask over catalog indices 0..`len` selecting the indices for which
/// `select` returns true.
fn mask_of(len: usize, select: impl Fn(usize) -> bool) -> u32 {
    let mut mask = 0u32;
    for i in 0..len {
        if select(i) {
            mask |= 1 << i;
        }
    }
    mask
}

/// Whether both a process plate and a spot plate carry ink; only then are
/// the masked composite views worth a page.
fn has_both_kinds(plates: &[Plate]) -> bool {
    let process = plates
        .iter()
        .any(|p| p.present() && !p.colorant().is_spot());
    let spot = plates.iter().any(|p| p.present() && p.colorant().is_spot());
    process && spot
}

/// Fits an image of `img_w` x `img_h` pixels into the page area above the
/// caption band, preserving aspect and centering.
fn fit_box(size: (f32, f32), band: f32, img_w: u32, img_h: u32) -> (f32, f32, f32, f32) {
    let (page_w, page_h) = size;
    let avail_h = (page_h - band).max(1.0);

    let iw = img_w as f32;
    let ih = img_h as f32;
    let scale = (page_w / iw).min(avail_h / ih);

    let width = iw * scale;
    let height = ih * scale;
    let x = (page_w - width) / 2.0;
    let y = band + (avail_h - height) / 2.0;

    (x, y, width, height)
}
