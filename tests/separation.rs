//! End-to-end proof runs over a synthetic renderer.

use rosette::{
    separate, Cmyk, ColorantCatalog, InkRecord, PageOutcome, PageRenderer, ProcessColor,
    ProofSettings, RasterBuffer, SeparationError, SeparationMode, SeparationResult,
    SerializeSettings,
};

/// One synthetic source page.
struct TestPage {
    inks: Vec<InkRecord>,
    translucent: bool,
    fail_render: bool,
}

impl TestPage {
    fn new(inks: Vec<InkRecord>) -> Self {
        Self {
            inks,
            translucent: false,
            fail_render: false,
        }
    }
}

/// A renderer over fixed 4x4 rasters.
///
/// DeviceN renders put cyan at pixels (0, 0) and (1, 0) and, when a spot
/// colorant exists, 200/255 of the last channel at pixel (1, 1). CMYK
/// renders put
/// one pure pixel per process channel into the top-left 2x2 block, the
/// end-to-end halftone scenario.
struct TestRenderer {
    pages: Vec<TestPage>,
}

impl PageRenderer for TestRenderer {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, _: usize) -> (f32, f32) {
        (200.0, 200.0)
    }

    fn enumerate_inks(&mut self, page: usize) -> SeparationResult<Vec<InkRecord>> {
        Ok(self.pages[page].inks.clone())
    }

    fn has_translucent_content(&self, page: usize) -> bool {
        self.pages[page].translucent
    }

    fn render_device_n(
        &mut self,
        page: usize,
        colorants: &ColorantCatalog,
        _: f32,
    ) -> SeparationResult<RasterBuffer> {
        if self.pages[page].fail_render {
            return Err(SeparationError::RenderingFailure {
                page,
                reason: "content stream uses an unsupported shading".to_string(),
            });
        }

        let mut raster = RasterBuffer::new(4, 4, colorants.len() as u8).unwrap();
        raster.set_sample(0, 0, 0, 255);
        raster.set_sample(1, 0, 0, 128);
        if colorants.spot_count() > 0 {
            raster.set_sample(1, 1, colorants.len() as u8 - 1, 200);
        }
        Ok(raster)
    }

    fn render_cmyk(&mut self, page: usize, _: f32) -> SeparationResult<RasterBuffer> {
        if self.pages[page].fail_render {
            return Err(SeparationError::RenderingFailure {
                page,
                reason: "content stream uses an unsupported shading".to_string(),
            });
        }

        let mut raster = RasterBuffer::new(2, 2, 4).unwrap();
        raster.set_sample(0, 0, 0, 255);
        raster.set_sample(1, 0, 1, 255);
        raster.set_sample(0, 1, 2, 255);
        raster.set_sample(1, 1, 3, 255);
        Ok(raster)
    }
}

fn process_inks() -> Vec<InkRecord> {
    ProcessColor::ALL.into_iter().map(InkRecord::process).collect()
}

fn test_settings(mode: SeparationMode) -> ProofSettings {
    let mut settings = ProofSettings::new();
    settings.mode = mode;
    settings.serialize_settings = SerializeSettings {
        ascii_compatible: true,
        compress_content_streams: false,
    };
    settings
}

fn page_object_count(pdf: &[u8]) -> usize {
    // Every page dictionary carries exactly one /Parent entry; the page
    // tree itself has none.
    let text = String::from_utf8_lossy(pdf);
    text.matches("/Parent").count()
}

#[test]
fn device_n_run_continues_past_failures() {
    let mut inks = process_inks();
    inks.push(InkRecord::spot("Gold", Cmyk(20, 30, 180, 10)));

    let mut translucent = TestPage::new(process_inks());
    translucent.translucent = true;
    let mut failing = TestPage::new(process_inks());
    failing.fail_render = true;

    let mut renderer = TestRenderer {
        pages: vec![TestPage::new(inks), translucent, failing],
    };

    let (pdf, report) =
        separate(&mut renderer, test_settings(SeparationMode::DeviceN)).unwrap();

    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.separated_pages(), 1);
    assert_eq!(report.skipped_pages(), 1);

    let PageOutcome::Separated { plates } = &report.pages[0] else {
        panic!("page 1 should separate");
    };
    assert_eq!(plates.len(), 5);
    assert_eq!(plates[0].colorant, "Cyan");
    assert!(plates[0].present);
    assert!((plates[0].coverage - 2.0 / 16.0).abs() < 1e-6);
    assert!(plates[4].present);
    assert!(!plates[1].present);

    assert_eq!(report.pages[1], PageOutcome::CompositeOnly);
    let PageOutcome::Skipped { reason } = &report.pages[2] else {
        panic!("page 3 should be skipped");
    };
    assert!(reason.contains("unsupported shading"));

    assert!(pdf.starts_with(b"%PDF-1.7"));
    assert!(pdf.windows(5).rev().take(8).any(|w| w == b"%%EOF"));

    // Page 1: composite, process-only, spot-only, Cyan plate, Gold plate.
    // Page 2: composite only. Page 3: nothing.
    assert_eq!(page_object_count(&pdf), 6);

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Separation"));
    assert!(text.contains("/DeviceN"));
    assert!(text.contains("/Gold"));
    assert!(text.contains("/None"));
    assert!(text.contains("(Coverage: 12.5%)"));
}

#[test]
fn halftone_run_screens_the_two_by_two_scenario() {
    let mut renderer = TestRenderer {
        pages: vec![TestPage::new(vec![])],
    };

    let (pdf, report) =
        separate(&mut renderer, test_settings(SeparationMode::Halftone)).unwrap();

    let PageOutcome::Separated { plates } = &report.pages[0] else {
        panic!("the page should separate");
    };
    assert_eq!(plates.len(), 4);
    for plate in plates {
        // One attributed cell per plate on the doubled 4x4 grid.
        assert!(plate.present);
        assert!((plate.coverage - 1.0 / 16.0).abs() < 1e-6);
    }

    // Composite plus four plate pages; no spots, so no masked views.
    assert_eq!(page_object_count(&pdf), 5);

    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Cyan"));
    assert!(text.contains("/Magenta"));
    assert!(text.contains("/Yellow"));
    assert!(text.contains("/Black"));
    assert!(text.contains("/DeviceCMYK"));
}

#[test]
fn colorant_overflow_aborts_instead_of_truncating() {
    let mut inks = process_inks();
    for i in 0..28 {
        inks.push(InkRecord::spot(format!("Spot {i}"), Cmyk(0, 0, 0, 50)));
    }

    let mut renderer = TestRenderer {
        pages: vec![TestPage::new(inks)],
    };

    let err = separate(&mut renderer, test_settings(SeparationMode::DeviceN)).unwrap_err();
    assert_eq!(err, SeparationError::ColorantOverflow { found: 32 });
}

#[test]
fn metadata_lands_in_the_info_dictionary() {
    let mut renderer = TestRenderer {
        pages: vec![TestPage::new(vec![])],
    };

    let mut settings = test_settings(SeparationMode::Halftone);
    settings.metadata = Some(
        rosette::Metadata::new()
            .title("Separation proof".to_string())
            .producer("rosette".to_string()),
    );

    let (pdf, _) = separate(&mut renderer, settings).unwrap();
    let text = String::from_utf8_lossy(&pdf);
    assert!(text.contains("/Title (Separation proof)"));
    assert!(text.contains("/Producer (rosette)"));
}
