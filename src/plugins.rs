//! Typed registration table of apriori providers and correction models
use std::{any::Any, collections::BTreeMap, sync::Arc};

use crate::{
    apriori::{
        antenna::{antenna_correction, ANTENNA_CORRECTION},
        gravdef::{gravitational_deformation, GRAVITATIONAL_DEFORMATION},
        provider_factory, AprioriRegistry, ProviderFactory, RunContext,
    },
    cfg::Config,
    error::Error,
    models::{
        gravdef::GravitationalDeformation, pco::SatellitePhaseCenterOffset, CorrectionModel,
        Pipeline,
    },
    prelude::Epoch,
};

/// [Plugins] is the registration table, built once at startup,
/// from which every analysis run draws its [AprioriRegistry] and [Pipeline].
#[derive(Clone)]
pub struct Plugins {
    config: Config,
    providers: BTreeMap<String, ProviderFactory>,
    models: BTreeMap<String, Arc<dyn CorrectionModel>>,
}

impl std::fmt::Debug for Plugins {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Plugins")
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .field("models", &self.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Plugins {
    /// Empty registration table
    pub fn new(config: Config) -> Self {
        Self {
            config,
            providers: Default::default(),
            models: Default::default(),
        }
    }

    /// Registration table with all providers and models of this crate
    pub fn builtin(config: Config) -> Self {
        let mut s = Self::new(config);
        s.register_provider(GRAVITATIONAL_DEFORMATION, gravitational_deformation);
        s.register_provider(ANTENNA_CORRECTION, antenna_correction);
        s.register_model(GravitationalDeformation::default());
        s.register_model(SatellitePhaseCenterOffset::default());
        s
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registers a typed apriori provider
    pub fn register_provider<T, F>(&mut self, name: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&RunContext) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.providers
            .insert(name.to_string(), provider_factory(factory));
    }

    /// Registers a [CorrectionModel] under its own name
    pub fn register_model<M: CorrectionModel + 'static>(&mut self, model: M) {
        self.models.insert(model.name().to_string(), Arc::new(model));
    }

    /// Registered provider names
    pub fn providers(&self) -> impl Iterator<Item = &str> + '_ {
        self.providers.keys().map(|k| k.as_str())
    }

    /// Registered model names
    pub fn models(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.keys().map(|k| k.as_str())
    }

    /// Creates the [AprioriRegistry] of a new analysis run
    pub fn registry(&self, run_date: Epoch) -> AprioriRegistry {
        let mut registry = AprioriRegistry::new(RunContext::new(run_date, self.config.clone()));
        for (name, factory) in self.providers.iter() {
            registry.register_factory(name, factory.clone());
        }
        registry
    }

    /// Creates a [Pipeline] evaluating these models, in this order
    pub fn pipeline(&self, names: &[&str]) -> Result<Pipeline, Error> {
        let mut pipeline = Pipeline::default();
        for name in names {
            let model = self
                .models
                .get(*name)
                .ok_or_else(|| Error::UnknownModel(name.to_string()))?;
            pipeline.push(model.clone());
        }
        Ok(pipeline)
    }
}
