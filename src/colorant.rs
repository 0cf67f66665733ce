//! Colorants and the per-page colorant catalog.
//!
//! A page's ink list is turned into a [`ColorantCatalog`]: the four process
//! colorants in canonical C, M, Y, K order up front, spot colorants in
//! first-discovery order behind them. Duplicate ink definitions for one name
//! collapse to the first occurrence, without merging or validation.

use crate::error::{SeparationError, SeparationResult};

/// The hard ceiling on colorants in one DeviceN rendering request.
///
/// Catalogs wider than this cannot be separated in a single pass; the
/// caller must restrict the colorant list itself, it is never truncated
/// silently.
pub const MAX_DEVICE_N_COLORANTS: usize = 31;

/// A CMYK ink quadruple with 8 bits per component.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, Default)]
pub struct Cmyk(pub u8, pub u8, pub u8, pub u8);

impl Cmyk {
    /// Create a new CMYK value.
    pub fn new(cyan: u8, magenta: u8, yellow: u8, black: u8) -> Self {
        Self(cyan, magenta, yellow, black)
    }

    pub(crate) fn to_pdf_components(self) -> [f32; 4] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            self.3 as f32 / 255.0,
        ]
    }

    pub(crate) fn as_bytes(self) -> [u8; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

/// One of the four process colorants.
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy)]
pub enum ProcessColor {
    Cyan,
    Magenta,
    Yellow,
    Black,
}

impl ProcessColor {
    /// All process colorants, in canonical separation order.
    pub const ALL: [ProcessColor; 4] = [
        ProcessColor::Cyan,
        ProcessColor::Magenta,
        ProcessColor::Yellow,
        ProcessColor::Black,
    ];

    /// The PDF separation name of this colorant.
    pub fn name(self) -> &'static str {
        match self {
            ProcessColor::Cyan => "Cyan",
            ProcessColor::Magenta => "Magenta",
            ProcessColor::Yellow => "Yellow",
            ProcessColor::Black => "Black",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pc| pc.name() == name)
    }

    /// The pure single-channel ink of this colorant.
    pub fn tint(self) -> Cmyk {
        match self {
            ProcessColor::Cyan => Cmyk(255, 0, 0, 0),
            ProcessColor::Magenta => Cmyk(0, 255, 0, 0),
            ProcessColor::Yellow => Cmyk(0, 0, 255, 0),
            ProcessColor::Black => Cmyk(0, 0, 0, 255),
        }
    }

    /// Index of this colorant's channel in a CMYK raster.
    pub(crate) fn channel(self) -> u8 {
        match self {
            ProcessColor::Cyan => 0,
            ProcessColor::Magenta => 1,
            ProcessColor::Yellow => 2,
            ProcessColor::Black => 3,
        }
    }
}

/// One entry of a page's ink enumeration.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct InkRecord {
    /// The ink's separation name.
    pub name: String,
    /// Whether the engine classified the ink as a process color.
    pub is_process: bool,
    /// The ink's CMYK-equivalent definition.
    pub cmyk: Cmyk,
}

impl InkRecord {
    pub fn process(color: ProcessColor) -> Self {
        Self {
            name: color.name().to_string(),
            is_process: true,
            cmyk: color.tint(),
        }
    }

    pub fn spot(name: impl Into<String>, cmyk: Cmyk) -> Self {
        Self {
            name: name.into(),
            is_process: false,
            cmyk,
        }
    }
}

/// A named ink that can be printed on its own plate.
#[derive(Debug, Hash, Eq, PartialEq, Clone)]
pub enum Colorant {
    Process(ProcessColor),
    Spot {
        name: String,
        /// The CMYK-equivalent appearance at full density.
        alternate: Cmyk,
    },
}

impl Colorant {
    pub fn name(&self) -> &str {
        match self {
            Colorant::Process(pc) => pc.name(),
            Colorant::Spot { name, .. } => name,
        }
    }

    /// The CMYK appearance of this colorant at full tint.
    pub fn alternate(&self) -> Cmyk {
        match self {
            Colorant::Process(pc) => pc.tint(),
            Colorant::Spot { alternate, .. } => *alternate,
        }
    }

    pub fn is_spot(&self) -> bool {
        matches!(self, Colorant::Spot { .. })
    }
}

/// The ordered, deduplicated set of colorants discovered on a page.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct ColorantCatalog {
    colorants: Vec<Colorant>,
}

impl ColorantCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a page's ink enumeration.
    ///
    /// Duplicate names keep their first definition. Process-classified inks
    /// carrying one of the four standard names slot into the canonical
    /// front block; every other ink becomes a spot colorant in discovery
    /// order. An empty enumeration yields an empty catalog, which is valid.
    pub fn build(inks: impl IntoIterator<Item = InkRecord>) -> Self {
        let mut catalog = Self::new();
        for ink in inks {
            catalog.push(ink);
        }

        catalog
    }

    /// Adds one ink record. Returns whether it was inserted (false for a
    /// duplicate name).
    pub fn push(&mut self, ink: InkRecord) -> bool {
        if self.index_of(&ink.name).is_some() {
            return false;
        }

        match ProcessColor::from_name(&ink.name).filter(|_| ink.is_process) {
            Some(pc) => self.insert_process(pc),
            None => self.colorants.push(Colorant::Spot {
                name: ink.name,
                alternate: ink.cmyk,
            }),
        }

        true
    }

    /// Inserts any process colorant that is not yet present.
    ///
    /// The halftone path always separates onto the four process plates,
    /// even when the page's enumeration announced none of them.
    pub fn ensure_process_colorants(&mut self) {
        for pc in ProcessColor::ALL {
            if self.index_of(pc.name()).is_none() {
                self.insert_process(pc);
            }
        }
    }

    fn insert_process(&mut self, pc: ProcessColor) {
        // The leading block holds process colorants in canonical order;
        // spots only ever append behind it.
        let pos = self
            .colorants
            .iter()
            .take_while(|c| match c {
                Colorant::Process(other) => other.channel() < pc.channel(),
                Colorant::Spot { .. } => false,
            })
            .count();

        self.colorants.insert(pos, Colorant::Process(pc));
    }

    pub fn colorants(&self) -> &[Colorant] {
        &self.colorants
    }

    pub fn get(&self, index: usize) -> Option<&Colorant> {
        self.colorants.get(index)
    }

    pub fn len(&self) -> usize {
        self.colorants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colorants.is_empty()
    }

    pub fn spot_count(&self) -> usize {
        self.colorants.iter().filter(|c| c.is_spot()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Colorant> {
        self.colorants.iter()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.colorants.iter().position(|c| c.name() == name)
    }

    /// The ordered channel list for a DeviceN rendering request.
    ///
    /// Fails with [`SeparationError::ColorantOverflow`] when the catalog
    /// exceeds [`MAX_DEVICE_N_COLORANTS`].
    pub fn device_n_colorants(&self) -> SeparationResult<&[Colorant]> {
        if self.colorants.len() > MAX_DEVICE_N_COLORANTS {
            return Err(SeparationError::ColorantOverflow {
                found: self.colorants.len(),
            });
        }

        Ok(&self.colorants)
    }
}

impl<'a> IntoIterator for &'a ColorantCatalog {
    type Item = &'a Colorant;
    type IntoIter = std::slice::Iter<'a, Colorant>;

    fn into_iter(self) -> Self::IntoIter {
        self.colorants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_keep_first_definition() {
        let catalog = ColorantCatalog::build([
            InkRecord::spot("PANTONE 185 C", Cmyk(0, 230, 200, 0)),
            InkRecord::spot("PANTONE 185 C", Cmyk(50, 50, 50, 50)),
            InkRecord::spot("Varnish", Cmyk(0, 0, 0, 30)),
        ]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.colorants()[0].alternate(), Cmyk(0, 230, 200, 0));
        assert_eq!(catalog.colorants()[1].name(), "Varnish");
    }

    #[test]
    fn process_block_precedes_spots_in_canonical_order() {
        // Announced out of order, interleaved with spots.
        let catalog = ColorantCatalog::build([
            InkRecord::spot("Gold", Cmyk(20, 30, 180, 10)),
            InkRecord::process(ProcessColor::Black),
            InkRecord::spot("Silver", Cmyk(40, 30, 30, 20)),
            InkRecord::process(ProcessColor::Cyan),
            InkRecord::process(ProcessColor::Magenta),
        ]);

        let names: Vec<_> = catalog.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Cyan", "Magenta", "Black", "Gold", "Silver"]);
    }

    #[test]
    fn process_flag_requires_standard_name() {
        // An ink flagged process under a custom name is a spot colorant.
        let mut record = InkRecord::spot("House Blue", Cmyk(200, 100, 0, 0));
        record.is_process = true;

        let catalog = ColorantCatalog::build([record]);
        assert!(catalog.colorants()[0].is_spot());
    }

    #[test]
    fn spot_shadowing_a_process_name_wins_when_first() {
        let catalog = ColorantCatalog::build([
            InkRecord::spot("Cyan", Cmyk(1, 2, 3, 4)),
            InkRecord::process(ProcessColor::Cyan),
        ]);

        assert_eq!(catalog.len(), 1);
        assert!(catalog.colorants()[0].is_spot());
        assert_eq!(catalog.colorants()[0].alternate(), Cmyk(1, 2, 3, 4));
    }

    #[test]
    fn ensure_process_fills_missing_colorants() {
        let mut catalog = ColorantCatalog::build([
            InkRecord::spot("Gold", Cmyk(20, 30, 180, 10)),
            InkRecord::process(ProcessColor::Yellow),
        ]);
        catalog.ensure_process_colorants();

        let names: Vec<_> = catalog.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["Cyan", "Magenta", "Yellow", "Black", "Gold"]);
    }

    #[test]
    fn device_n_request_overflows_beyond_ceiling() {
        let mut inks = vec![
            InkRecord::process(ProcessColor::Cyan),
            InkRecord::process(ProcessColor::Magenta),
            InkRecord::process(ProcessColor::Yellow),
            InkRecord::process(ProcessColor::Black),
        ];
        for i in 0..27 {
            inks.push(InkRecord::spot(format!("Spot {i}"), Cmyk(0, 0, 0, 128)));
        }

        let mut catalog = ColorantCatalog::build(inks.clone());
        assert_eq!(catalog.len(), 31);
        assert!(catalog.device_n_colorants().is_ok());

        catalog.push(InkRecord::spot("One Too Many", Cmyk(0, 0, 0, 1)));
        assert_eq!(
            catalog.device_n_colorants(),
            Err(SeparationError::ColorantOverflow { found: 32 })
        );
    }

    #[test]
    fn empty_enumeration_is_valid() {
        let catalog = ColorantCatalog::build([]);
        assert!(catalog.is_empty());
        assert!(catalog.device_n_colorants().is_ok());
    }
}
