//! Tint transforms.
//!
//! A tint transform maps ink density to the CMYK appearance used for
//! proofing. Single-colorant transforms scale the colorant's alternate
//! color; the composite transform mixes all catalog colorants additively
//! and clamps each channel. Both are deterministic: the same colorant list
//! in the same order always produces the same function.
//!
//! The PDF realizations are typed function objects. Single transforms
//! become Type 2 exponential interpolations, the composite transform a
//! Type 4 calculator program built from [`PostScriptOp`] values, never
//! from concatenated source text.

use pdf_writer::types::PostScriptOp;

use crate::colorant::{Cmyk, Colorant, ColorantCatalog};

/// The tint transform of a single colorant.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct TintTransform {
    alternate: Cmyk,
}

impl TintTransform {
    pub fn for_colorant(colorant: &Colorant) -> Self {
        Self {
            alternate: colorant.alternate(),
        }
    }

    /// The CMYK appearance at tint `t`.
    ///
    /// Process colorants place `t` into their own channel, spot colorants
    /// scale their stored quadruple.
    pub fn eval(&self, t: f32) -> [f32; 4] {
        let t = t.clamp(0.0, 1.0);
        self.alternate.to_pdf_components().map(|c| t * c)
    }

    /// The `C1` array of the Type 2 function realizing this transform.
    ///
    /// `C0` is all-zero: tint 0 means no ink, which is white in the
    /// subtractive alternate space.
    pub(crate) fn full_tint_components(&self) -> [f32; 4] {
        self.alternate.to_pdf_components()
    }
}

/// The N-input tint transform of a whole catalog, used for DeviceN
/// composite proofs.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeTintTransform {
    weights: Vec<[f32; 4]>,
}

impl CompositeTintTransform {
    pub fn new(catalog: &ColorantCatalog) -> Self {
        Self::from_colorants(catalog.colorants(), u32::MAX)
    }

    /// A transform over `colorants` where only the colorants whose bit is
    /// set in `mask` contribute; the rest keep their input slot but mix
    /// with zero weight. Used for the process-only and spot-only composite
    /// views, which swap unselected channel names to `/None` while
    /// preserving array positions.
    pub(crate) fn from_colorants(colorants: &[Colorant], mask: u32) -> Self {
        Self {
            weights: colorants
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    if mask >> i & 1 == 1 {
                        c.alternate().to_pdf_components()
                    } else {
                        [0.0; 4]
                    }
                })
                .collect(),
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.len()
    }

    /// Mixes one tint per colorant into a CMYK quadruple.
    ///
    /// Contributions add up per channel and clamp to 1.0; saturating a
    /// channel with overlapping full-density colorants is the defined
    /// mixing policy, not an error.
    pub fn eval(&self, tints: &[f32]) -> [f32; 4] {
        assert_eq!(tints.len(), self.weights.len());

        let mut out = [0.0f32; 4];
        for (t, weight) in tints.iter().zip(&self.weights) {
            let t = t.clamp(0.0, 1.0);
            for (channel, w) in out.iter_mut().zip(weight) {
                *channel += t * w;
            }
        }

        out.map(|c| c.clamp(0.0, 1.0))
    }

    /// The Type 4 calculator program realizing this transform.
    ///
    /// With N inputs on the stack, each output channel is accumulated by
    /// `index`-copying every input and folding in its weight; the four
    /// results are then rolled under the inputs and the inputs popped. The
    /// function's `Range` entries perform the [0, 1] clamp.
    pub(crate) fn to_postscript(&self) -> Vec<PostScriptOp<'static>> {
        use PostScriptOp::*;

        let n = self.weights.len();
        let mut code = Vec::new();

        for channel in 0..4 {
            // Stack: t1 .. tN out1 .. out_channel acc
            code.push(Real(0.0));
            for (i, weight) in self.weights.iter().enumerate() {
                let w = weight[channel];
                if w == 0.0 {
                    continue;
                }

                code.push(Integer((channel + n - i) as i32));
                code.push(Index);
                code.push(Real(w));
                code.push(Mul);
                code.push(Add);
            }
        }

        // Move the four results under the inputs, then drop the inputs.
        code.push(Integer((n + 4) as i32));
        code.push(Integer(4));
        code.push(Roll);
        code.extend(std::iter::repeat(Pop).take(n));

        code
    }

    /// `Domain` of the Type 4 function: [0, 1] per input.
    pub(crate) fn domain(&self) -> Vec<f32> {
        [0.0, 1.0].repeat(self.weights.len())
    }
}
