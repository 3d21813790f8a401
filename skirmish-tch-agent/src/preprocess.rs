//! Conversion of raw observations into model inputs.
use anyhow::{bail, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use skirmish_core::TimeStep;
use tch::{Device, Tensor};

/// Builds the input tensors of the model from a batch of observations.
pub trait ObsPreprocessor<O> {
    /// Number of channels of each model input, in input order.
    fn n_channels(&self) -> Vec<i64>;

    /// Converts observations into one tensor per model input, each shaped
    /// `[batch, channels, rows, cols]`.
    fn preprocess(&self, obs: &[O], device: Device) -> Result<Vec<Tensor>>;
}

/// How a screen layer is encoded.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum FeatureKind {
    /// One-hot encoding into `scale` channels. Values are clamped to
    /// `[0, scale - 1]`.
    Categorical {
        /// Number of categories.
        scale: usize,
    },

    /// A single channel holding `ln(1 + x)`.
    Scalar,
}

impl FeatureKind {
    fn n_channels(&self) -> usize {
        match self {
            Self::Categorical { scale } => *scale,
            Self::Scalar => 1,
        }
    }
}

/// A screen layer fed to the model.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScreenFeature {
    /// Index of the layer in [`TimeStep::feature_screen`].
    pub index: usize,

    /// Encoding of the layer.
    pub kind: FeatureKind,
}

impl ScreenFeature {
    /// A categorical layer.
    pub fn categorical(index: usize, scale: usize) -> Self {
        Self {
            index,
            kind: FeatureKind::Categorical { scale },
        }
    }

    /// A scalar layer.
    pub fn scalar(index: usize) -> Self {
        Self {
            index,
            kind: FeatureKind::Scalar,
        }
    }
}

/// Encodes selected screen layers into a single model input.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScreenPreprocessor {
    features: Vec<ScreenFeature>,
}

impl ScreenPreprocessor {
    /// Constructs the preprocessor.
    ///
    /// Fails if a categorical layer has no category.
    pub fn new(features: Vec<ScreenFeature>) -> Result<Self> {
        let pre = Self { features };
        pre.validate()?;
        Ok(pre)
    }

    /// Player-relative (5 categories), selection (2 categories) and unit hit
    /// points, the layers that matter on combat minigames.
    pub fn minigame() -> Self {
        Self {
            features: vec![
                ScreenFeature::categorical(5, 5),
                ScreenFeature::categorical(7, 2),
                ScreenFeature::scalar(8),
            ],
        }
    }

    /// Checks the encodings. Deserialized preprocessors are checked on use.
    pub fn validate(&self) -> Result<()> {
        for f in self.features.iter() {
            if f.kind == (FeatureKind::Categorical { scale: 0 }) {
                bail!("Categorical screen layer {} has no category", f.index);
            }
        }
        Ok(())
    }

    fn total_channels(&self) -> usize {
        self.features.iter().map(|f| f.kind.n_channels()).sum()
    }
}

impl<O: TimeStep> ObsPreprocessor<O> for ScreenPreprocessor {
    fn n_channels(&self) -> Vec<i64> {
        vec![self.total_channels() as i64]
    }

    fn preprocess(&self, obs: &[O], device: Device) -> Result<Vec<Tensor>> {
        if obs.is_empty() {
            bail!("Empty observation batch");
        }
        self.validate()?;
        let (_, rows, cols) = obs[0].feature_screen().dim();
        let n_pixels = rows * cols;
        let n_channels = self.total_channels();
        let mut data = vec![0f32; obs.len() * n_channels * n_pixels];

        for (b, o) in obs.iter().enumerate() {
            let screen = o.feature_screen();
            let (n_layers, r, c) = screen.dim();
            if (r, c) != (rows, cols) {
                bail!("Screen shape mismatch: {:?} vs {:?}", (r, c), (rows, cols));
            }

            let mut ch = b * n_channels;
            for f in self.features.iter() {
                if f.index >= n_layers {
                    bail!("Screen layer {} not in observation ({} layers)", f.index, n_layers);
                }
                let layer = screen.index_axis(ndarray::Axis(0), f.index);
                match f.kind {
                    FeatureKind::Categorical { scale } => {
                        for (p, &v) in layer.iter().enumerate() {
                            let k = (v.max(0) as usize).min(scale - 1);
                            data[(ch + k) * n_pixels + p] = 1.0;
                        }
                    }
                    FeatureKind::Scalar => {
                        for (p, &v) in layer.iter().enumerate() {
                            data[ch * n_pixels + p] = (v.max(0) as f32).ln_1p();
                        }
                    }
                }
                ch += f.kind.n_channels();
            }
        }

        let shape = [obs.len() as i64, n_channels as i64, rows as i64, cols as i64];
        trace!("Preprocessed screen: {:?}", shape);
        Ok(vec![Tensor::from_slice(&data).view(shape).to(device)])
    }
}
