//! The document engine contract and per-page routing.
//!
//! Rendering, ink enumeration and transparency detection live behind the
//! injected [`PageRenderer`]; this module decides, per page, which
//! separation path applies and turns the renderer's output into plates.
//! Pages that cannot be rendered are skipped with a diagnostic; only a
//! colorant overflow aborts a run.

use tracing::{debug, warn};

use crate::colorant::{ColorantCatalog, InkRecord};
use crate::error::{SeparationError, SeparationResult};
use crate::raster::RasterBuffer;
use crate::separation::{separate_device_n, separate_halftone, Plate};

/// The external document engine: everything the separation core cannot do
/// itself.
///
/// Implementations wrap whatever renders pages; the core only consumes
/// rasters, page geometry and ink lists through this trait.
pub trait PageRenderer {
    /// The number of pages in the source document.
    fn page_count(&self) -> usize;

    /// The page's size in PDF points, used as the proof page geometry.
    fn page_size(&self, page: usize) -> (f32, f32);

    /// The inks used on the page, in the engine's discovery order.
    fn enumerate_inks(&mut self, page: usize) -> SeparationResult<Vec<InkRecord>>;

    /// Whether the page contains translucent content. A DeviceN rendering
    /// of such a page cannot attribute a single value per colorant per
    /// pixel, so the run falls back to a composite-only proof.
    fn has_translucent_content(&self, page: usize) -> bool;

    /// Renders the page into an N-channel raster, one channel per entry of
    /// `colorants` in order. The list is capped at
    /// [`MAX_DEVICE_N_COLORANTS`](crate::colorant::MAX_DEVICE_N_COLORANTS)
    /// by the caller.
    fn render_device_n(
        &mut self,
        page: usize,
        colorants: &ColorantCatalog,
        dpi: f32,
    ) -> SeparationResult<RasterBuffer>;

    /// Renders the page into a flattened 8-bit CMYK raster.
    fn render_cmyk(&mut self, page: usize, dpi: f32) -> SeparationResult<RasterBuffer>;
}

/// Which separation strategy a proof run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparationMode {
    /// One rendered channel per colorant, extracted into plates
    /// pixel-for-pixel.
    #[default]
    DeviceN,
    /// CMYK rendering screened onto double-resolution process plates,
    /// with an exact-match spot pre-pass.
    Halftone,
}

/// Per-plate statistics recorded in the [`ProofReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlateStat {
    pub colorant: String,
    pub present: bool,
    pub coverage: f64,
}

/// What happened to one source page during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// The page was separated into plates.
    Separated { plates: Vec<PlateStat> },
    /// Only a composite proof was produced (translucent content or an
    /// empty colorant catalog).
    CompositeOnly,
    /// The page could not be rendered and was skipped.
    Skipped { reason: String },
}

/// The per-page outcomes of a proof run, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProofReport {
    pub pages: Vec<PageOutcome>,
}

impl ProofReport {
    pub fn separated_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|outcome| matches!(outcome, PageOutcome::Separated { .. }))
            .count()
    }

    pub fn skipped_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|outcome| matches!(outcome, PageOutcome::Skipped { .. }))
            .count()
    }
}

/// The routed result for one page, carrying everything the compositor
/// needs to emit its proof pages.
#[derive(Debug)]
pub(crate) enum RoutedPage {
    /// DeviceN extraction succeeded; the raster doubles as the composite
    /// source.
    DeviceN {
        raster: RasterBuffer,
        catalog: ColorantCatalog,
        plates: Vec<Plate>,
    },
    /// Halftone separation succeeded. `composite` is the rendered CMYK
    /// page; `remainder` is the working copy after the spot pre-pass
    /// zeroed its exact matches, i.e. the process-only color.
    Halftone {
        composite: RasterBuffer,
        remainder: RasterBuffer,
        catalog: ColorantCatalog,
        plates: Vec<Plate>,
    },
    /// No separation for this page, composite proof only.
    CompositeOnly { raster: RasterBuffer },
    /// The page could not be processed at all.
    Skipped { reason: String },
}

impl RoutedPage {
    pub fn outcome(&self) -> PageOutcome {
        match self {
            RoutedPage::DeviceN { plates, .. } | RoutedPage::Halftone { plates, .. } => {
                PageOutcome::Separated {
                    plates: plates
                        .iter()
                        .map(|plate| PlateStat {
                            colorant: plate.name().to_string(),
                            present: plate.present(),
                            coverage: plate.coverage(),
                        })
                        .collect(),
                }
            }
            RoutedPage::CompositeOnly { .. } => PageOutcome::CompositeOnly,
            RoutedPage::Skipped { reason } => PageOutcome::Skipped {
                reason: reason.clone(),
            },
        }
    }
}

/// Routes one page through the selected separation mode.
///
/// Returns `Err` only for [`SeparationError::ColorantOverflow`], which
/// aborts the whole run; rendering failures become
/// [`RoutedPage::Skipped`].
pub(crate) fn route_page<R: PageRenderer>(
    renderer: &mut R,
    page: usize,
    mode: SeparationMode,
    dpi: f32,
) -> SeparationResult<RoutedPage> {
    let inks = match renderer.enumerate_inks(page) {
        Ok(inks) => inks,
        Err(SeparationError::RenderingFailure { reason, .. }) => {
            warn!(page, reason = %reason, "skipping page, ink enumeration failed");
            return Ok(RoutedPage::Skipped { reason });
        }
        Err(err) => return Err(err),
    };
    let mut catalog = ColorantCatalog::build(inks);

    match mode {
        SeparationMode::DeviceN => {
            if catalog.is_empty() {
                debug!(page, "no colorants defined, composite-only proof");
                return composite_only(renderer, page, dpi);
            }

            if renderer.has_translucent_content(page) {
                debug!(page, "translucent content, composite-only proof");
                return composite_only(renderer, page, dpi);
            }

            // Overflow aborts the run before anything is rendered.
            catalog.device_n_colorants()?;

            let raster = match renderer.render_device_n(page, &catalog, dpi) {
                Ok(raster) => raster,
                Err(SeparationError::RenderingFailure { reason, .. }) => {
                    warn!(page, reason = %reason, "skipping page, DeviceN rendering failed");
                    return Ok(RoutedPage::Skipped { reason });
                }
                Err(err) => return Err(err),
            };

            match separate_device_n(&raster, &catalog) {
                Some(plates) => Ok(RoutedPage::DeviceN {
                    raster,
                    catalog,
                    plates,
                }),
                None => {
                    let reason = "renderer returned a raster that does not match the colorant list"
                        .to_string();
                    warn!(page, reason = %reason, "skipping page");
                    Ok(RoutedPage::Skipped { reason })
                }
            }
        }
        SeparationMode::Halftone => {
            // The halftone path always separates onto the four process
            // plates, announced or not.
            catalog.ensure_process_colorants();

            let composite = match renderer.render_cmyk(page, dpi) {
                Ok(raster) => raster,
                Err(SeparationError::RenderingFailure { reason, .. }) => {
                    warn!(page, reason = %reason, "skipping page, CMYK rendering failed");
                    return Ok(RoutedPage::Skipped { reason });
                }
                Err(err) => return Err(err),
            };

            let mut remainder = composite.clone();
            match separate_halftone(&mut remainder, &catalog) {
                Some(plates) => Ok(RoutedPage::Halftone {
                    composite,
                    remainder,
                    catalog,
                    plates,
                }),
                None => {
                    let reason = "renderer returned a raster that is not 8-bit CMYK".to_string();
                    warn!(page, reason = %reason, "skipping page");
                    Ok(RoutedPage::Skipped { reason })
                }
            }
        }
    }
}

fn composite_only<R: PageRenderer>(
    renderer: &mut R,
    page: usize,
    dpi: f32,
) -> SeparationResult<RoutedPage> {
    match renderer.render_cmyk(page, dpi) {
        Ok(raster) => Ok(RoutedPage::CompositeOnly { raster }),
        Err(SeparationError::RenderingFailure { reason, .. }) => {
            warn!(page, reason = %reason, "skipping page, composite rendering failed");
            Ok(RoutedPage::Skipped { reason })
        }
        Err(err) => Err(err),
    }
}
