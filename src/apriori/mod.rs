//! Apriori reference data and their per-run registry
use log::{debug, info};

use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    cfg::Config,
    error::Error,
    prelude::{Epoch, Unit},
};

pub mod antenna;
pub mod gravdef;
pub mod version;

/// Type erased apriori object, as built by one provider
pub type SharedApriori = Arc<dyn Any + Send + Sync>;

/// Apriori provider: builds one apriori object for the [RunContext].
pub type ProviderFactory = Arc<dyn Fn(&RunContext) -> Result<SharedApriori, Error> + Send + Sync>;

/// Wraps a typed provider function into a [ProviderFactory].
pub fn provider_factory<T, F>(factory: F) -> ProviderFactory
where
    T: Any + Send + Sync,
    F: Fn(&RunContext) -> Result<T, Error> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &RunContext| {
        let apriori = factory(ctx)?;
        Ok(Arc::new(apriori) as SharedApriori)
    })
}

/// [RunContext] describes the ongoing analysis run.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_date: Epoch,
    config: Arc<Config>,
}

impl RunContext {
    pub fn new(run_date: Epoch, config: Config) -> Self {
        Self {
            run_date,
            config: Arc::new(config),
        }
    }

    pub fn run_date(&self) -> Epoch {
        self.run_date
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns first and last instant of this calendar day (UTC),
    /// with microsecond resolution: `[00:00:00 ; 23:59:59.999999]`.
    pub fn day_bounds(run_date: Epoch) -> (Epoch, Epoch) {
        let (y, m, d, _, _, _, _) = run_date.to_gregorian_utc();
        let day_start = Epoch::from_gregorian_utc_at_midnight(y, m, d);
        let day_end = day_start + 1.0 * Unit::Day - 1.0 * Unit::Microsecond;
        (day_start, day_end)
    }
}

type Slot = Arc<Mutex<Option<SharedApriori>>>;

/// [AprioriRegistry] builds apriori objects on first request and shares
/// them for the rest of the run. Each provider is built at most once per run,
/// even when requested concurrently: other callers wait on the ongoing construction.
pub struct AprioriRegistry {
    context: RunContext,
    providers: HashMap<String, ProviderFactory>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl std::fmt::Debug for AprioriRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AprioriRegistry")
            .field("context", &self.context)
            .field("providers", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AprioriRegistry {
    /// Creates an empty [AprioriRegistry] for this run.
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            providers: HashMap::new(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Registers a typed apriori provider.
    /// Replaces (and forgets the cached object of) any provider with the same name.
    pub fn register<T, F>(&mut self, name: &str, factory: F)
    where
        T: Any + Send + Sync,
        F: Fn(&RunContext) -> Result<T, Error> + Send + Sync + 'static,
    {
        self.register_factory(name, provider_factory(factory));
    }

    /// Registers a type erased [ProviderFactory].
    pub fn register_factory(&mut self, name: &str, factory: ProviderFactory) {
        self.providers.insert(name.to_string(), factory);
        self.slots
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// True if this provider is registered
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// True if this apriori object has already been built
    pub fn is_cached(&self, name: &str) -> bool {
        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();

        match slot {
            Some(slot) => slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some(),
            None => false,
        }
    }

    /// Returns the apriori object built by this provider,
    /// building it on first request.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, Error> {
        let factory = self
            .providers
            .get(name)
            .ok_or_else(|| Error::UnknownProvider(name.to_string()))?;

        let slot = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone();

        // held during construction: concurrent requests wait for us
        let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let apriori = match (*slot).clone() {
            Some(apriori) => apriori,
            None => {
                debug!("{}: building {}", self.context.run_date, name);
                let apriori = factory(&self.context)?;
                *slot = Some(apriori.clone());
                info!("{}: {} ready", self.context.run_date, name);
                apriori
            },
        };

        apriori
            .downcast::<T>()
            .map_err(|_| Error::ProviderTypeMismatch(name.to_string()))
    }

    /// Drops all cached apriori objects. Providers remain registered.
    pub fn reset(&mut self) {
        self.slots
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod test {
    use super::{AprioriRegistry, RunContext};
    use crate::{
        cfg::Config,
        error::Error,
        prelude::{Epoch, Unit},
    };

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn registry() -> AprioriRegistry {
        let run_date = Epoch::from_gregorian_utc_at_midnight(2020, 2, 10);
        AprioriRegistry::new(RunContext::new(run_date, Config::default()))
    }

    #[test]
    fn day_bounds() {
        let t = Epoch::from_gregorian_utc(2020, 2, 10, 17, 45, 12, 0);
        let (start, end) = RunContext::day_bounds(t);
        assert_eq!(start, Epoch::from_gregorian_utc_at_midnight(2020, 2, 10));
        assert_eq!(end, Epoch::from_gregorian_utc(2020, 2, 10, 23, 59, 59, 999_999_000));
        assert_eq!(end - start, 1.0 * Unit::Day - 1.0 * Unit::Microsecond);
    }

    #[test]
    fn cached_once() {
        let mut registry = registry();
        let counter = Arc::new(AtomicUsize::new(0));

        let builds = counter.clone();
        registry.register("X", move |ctx| {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ctx.run_date()])
        });

        assert!(!registry.is_cached("X"));

        let first = registry.get::<Vec<Epoch>>("X").unwrap();
        let second = registry.get::<Vec<Epoch>>("X").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(registry.is_cached("X"));

        registry.reset();
        assert!(!registry.is_cached("X"));

        let third = registry.get::<Vec<Epoch>>("X").unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unknown_provider() {
        let registry = registry();

        assert!(matches!(
            registry.get::<f64>("nonexistent"),
            Err(Error::UnknownProvider(name)) if name == "nonexistent"
        ));

        assert!(!registry.contains("nonexistent"));
        assert!(!registry.is_cached("nonexistent"));
        assert!(registry.slots.lock().unwrap().is_empty());
    }

    #[test]
    fn type_mismatch() {
        let mut registry = registry();
        registry.register("float", |_| Ok(1.0_f64));

        assert!(matches!(
            registry.get::<String>("float"),
            Err(Error::ProviderTypeMismatch(_))
        ));
        assert_eq!(*registry.get::<f64>("float").unwrap(), 1.0);
    }

    #[test]
    fn failures_are_not_cached() {
        let mut registry = registry();
        let counter = Arc::new(AtomicUsize::new(0));

        let attempts = counter.clone();
        registry.register("flaky", move |_| {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::NoVersionsFound("flaky".to_string()))
            } else {
                Ok(42_u32)
            }
        });

        assert!(registry.get::<u32>("flaky").is_err());
        assert!(!registry.is_cached("flaky"));
        assert_eq!(*registry.get::<u32>("flaky").unwrap(), 42);
    }

    #[test]
    fn concurrent_single_flight() {
        let mut registry = registry();
        let counter = Arc::new(AtomicUsize::new(0));

        let builds = counter.clone();
        registry.register("slow", move |_| {
            builds.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(50));
            Ok(String::from("apriori"))
        });

        let registry = Arc::new(registry);

        let handles = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get::<String>("slow").unwrap())
            })
            .collect::<Vec<_>>();

        let results = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(counter.load(Ordering::SeqCst), 1);

        for result in results.iter().skip(1) {
            assert!(Arc::ptr_eq(&results[0], result));
        }
    }
}
