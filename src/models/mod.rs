//! Delay correction models and their composition
use log::debug;

use std::sync::Arc;

use crate::{
    apriori::AprioriRegistry,
    dataset::{Dataset, ObservationSet},
    error::Error,
};

pub mod gravdef;
pub mod pco;

/// [CorrectionModel] is implemented by each delay correction.
/// It returns one correction [m] per observation of the [Dataset],
/// to be added to the raw delay. It does not modify the [Dataset].
pub trait CorrectionModel: Send + Sync {
    /// Name this model is registered with
    fn name(&self) -> &str;

    /// Computes the correction of every observation
    fn compute(&self, registry: &AprioriRegistry, dataset: &dyn Dataset)
        -> Result<Vec<f64>, Error>;
}

/// [Corrections] resulting from one [Pipeline] run, per model,
/// in order of evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corrections {
    len: usize,
    models: Vec<(String, Vec<f64>)>,
}

impl Corrections {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Correction computed by this model
    pub fn get(&self, model: &str) -> Option<&[f64]> {
        self.models
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, values)| values.as_slice())
    }

    /// Models that were evaluated
    pub fn models(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.iter().map(|(name, _)| name.as_str())
    }

    /// Total correction per observation [m]
    pub fn total(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.len];
        for (_, values) in self.models.iter() {
            for (sum, value) in total.iter_mut().zip(values.iter()) {
                *sum += value;
            }
        }
        total
    }

    /// Applies all corrections to this [ObservationSet].
    /// Nothing is applied if the [ObservationSet] does not match.
    pub fn apply(&self, dataset: &mut ObservationSet) -> Result<(), Error> {
        if dataset.len() != self.len {
            return Err(Error::ShapeMismatch {
                expected: dataset.len(),
                found: self.len,
            });
        }

        for (name, values) in self.models.iter() {
            dataset.add_correction(name, values)?;
        }

        Ok(())
    }
}

/// [Pipeline] evaluates [CorrectionModel]s in order.
#[derive(Clone, Default)]
pub struct Pipeline {
    models: Vec<Arc<dyn CorrectionModel>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_list()
            .entries(self.models.iter().map(|model| model.name()))
            .finish()
    }
}

impl Pipeline {
    /// Appends a [CorrectionModel]
    pub fn push(&mut self, model: Arc<dyn CorrectionModel>) {
        self.models.push(model);
    }

    /// Copies and returns [Pipeline] with one more [CorrectionModel]
    pub fn with_model(&self, model: Arc<dyn CorrectionModel>) -> Self {
        let mut s = self.clone();
        s.push(model);
        s
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Evaluates all models. Stops on first failure:
    /// [Corrections] are only returned when all models succeeded.
    pub fn run(&self, registry: &AprioriRegistry, dataset: &dyn Dataset) -> Result<Corrections, Error> {
        let len = dataset.len();
        let mut corrections = Corrections {
            len,
            models: Vec::with_capacity(self.models.len()),
        };

        for model in self.models.iter() {
            let values = model.compute(registry, dataset)?;

            if values.len() != len {
                return Err(Error::ShapeMismatch {
                    expected: len,
                    found: values.len(),
                });
            }

            debug!("{}: {} corrections", model.name(), values.len());
            corrections.models.push((model.name().to_string(), values));
        }

        Ok(corrections)
    }

    /// Evaluates all models and applies the resulting corrections.
    /// [ObservationSet] is left untouched on any failure.
    pub fn apply(
        &self,
        registry: &AprioriRegistry,
        dataset: &mut ObservationSet,
    ) -> Result<Corrections, Error> {
        let corrections = self.run(registry, &*dataset)?;
        corrections.apply(dataset)?;
        Ok(corrections)
    }
}
