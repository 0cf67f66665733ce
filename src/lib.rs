/*!
A prepress color-separation core.

`rosette` takes rendered page rasters plus a colorant inventory and
decomposes them into per-colorant printing plates, then assembles the
plates into a composite proof PDF. Rendering itself stays outside: pages,
inks and rasters arrive through the injected [`PageRenderer`] collaborator,
and the crate hands back finished PDF bytes.

Two separation strategies are supported, selected per run:

- [`SeparationMode::DeviceN`]: the page is rendered once into an N-channel
  raster (one channel per colorant) and every plate is a pixel-for-pixel
  deinterleave of its channel.
- [`SeparationMode::Halftone`]: the page is rendered as plain CMYK; after
  an exact-match pre-pass has claimed spot-colored pixels into 1-bit
  plates, the remaining color is screened onto double-resolution process
  plates with a fixed four-phase rotation, emulating a 45 degree screen.

The proof document places, per separated page, the full composite first,
then process-only and spot-only views, then one page per present plate
with its coverage caption.

# Example

```ignore
use rosette::{separate, ProofSettings, SeparationMode};

let mut settings = ProofSettings::new();
settings.mode = SeparationMode::Halftone;

let (pdf, report) = separate(&mut my_renderer, settings)?;
std::fs::write("proof.pdf", pdf)?;
for outcome in &report.pages {
    println!("{outcome:?}");
}
```
*/

pub mod colorant;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod proof;
pub mod raster;
pub mod separation;
pub mod tint;

mod chunk_container;
mod content;
mod object;
mod serialize;
mod util;

pub use colorant::{
    Cmyk, Colorant, ColorantCatalog, InkRecord, ProcessColor, MAX_DEVICE_N_COLORANTS,
};
pub use engine::{PageOutcome, PageRenderer, PlateStat, ProofReport, SeparationMode};
pub use error::{SeparationError, SeparationResult};
pub use metadata::Metadata;
pub use proof::{separate, ProofDocument, ProofSettings};
pub use raster::{BitRaster, RasterBuffer};
pub use separation::{separate_device_n, separate_halftone, Plate, PlateData};
pub use serialize::SerializeSettings;
pub use tint::{CompositeTintTransform, TintTransform};
