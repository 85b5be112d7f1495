//! Stage registry and factory for noisedp pipelines.
//!
//! This crate maps the stage names used in a pipeline configuration to
//! factories that build [`Stage`] instances from their string arguments.
//!
//! # Features
//!
//! - **Stage Discovery**: List all available stages with their arguments
//! - **Factory Pattern**: Create stages by name at runtime
//! - **Substitution**: Start from [`StageRegistry::empty`] and register stub
//!   stages under the built-in names to test a pipeline in isolation
//!
//! # Example
//!
//! ```rust
//! use noisedp_registry::{StageCategory, StageRegistry};
//!
//! let registry = StageRegistry::new();
//!
//! for stage in registry.all_stages() {
//!     println!("{}: {}", stage.name, stage.description);
//! }
//!
//! let args = vec!["5".to_string(), "true".to_string()];
//! let stage = registry.create("Regularise", &args).unwrap().unwrap();
//! assert_eq!(stage.name(), "Regularise");
//!
//! assert_eq!(registry.stages_in_category(StageCategory::Periods).len(), 2);
//! ```

use noisedp_core::{Result, Stage};
use noisedp_process::{FlagPeriod, OctaveReducer, Regularise, RemovePeriods, Resample};

/// Category of processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageCategory {
    /// Timestamp cleaning and gridding
    Cleaning,
    /// Frequency band restructuring
    Spectral,
    /// Time window flagging and removal
    Periods,
    /// Resolution changes
    Aggregation,
}

impl StageCategory {
    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            StageCategory::Cleaning => "Cleaning",
            StageCategory::Spectral => "Spectral",
            StageCategory::Periods => "Periods",
            StageCategory::Aggregation => "Aggregation",
        }
    }
}

/// Describes a stage in the registry.
#[derive(Debug, Clone)]
pub struct StageDescriptor {
    /// Short identifier (lowercase, no spaces).
    pub id: &'static str,
    /// Name used in pipeline configuration.
    pub name: &'static str,
    /// Brief description of the stage.
    pub description: &'static str,
    /// Category for organization.
    pub category: StageCategory,
    /// User-supplied arguments, in order. Optional ones end with `?`.
    pub args: &'static [&'static str],
    /// Whether the pipeline appends survey metadata to the arguments.
    pub takes_metadata: bool,
}

/// Factory function type for creating stages.
pub type StageFactory = fn(&[String]) -> Result<Box<dyn Stage>>;

struct RegistryEntry {
    descriptor: StageDescriptor,
    factory: StageFactory,
}

/// Registry of available processing stages.
pub struct StageRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn boxed<S: Stage + 'static>(stage: S) -> Box<dyn Stage> {
    Box::new(stage)
}

impl StageRegistry {
    /// Create a registry with all built-in stages registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin_stages();
        registry
    }

    /// Create a registry with no stages.
    pub fn empty() -> Self {
        Self {
            entries: Vec::with_capacity(5),
        }
    }

    fn register_builtin_stages(&mut self) {
        self.register(
            StageDescriptor {
                id: "regularise",
                name: Regularise::NAME,
                description: "Snap timestamps to a grid, drop collisions and pad gaps",
                category: StageCategory::Cleaning,
                args: &["resolution", "drop_ends?"],
                takes_metadata: false,
            },
            |args| Regularise::from_args(args).map(boxed),
        );

        self.register(
            StageDescriptor {
                id: "octaves",
                name: OctaveReducer::NAME,
                description: "Fold third-octave bands into octave bands",
                category: StageCategory::Spectral,
                args: &[],
                takes_metadata: false,
            },
            |args| OctaveReducer::from_args(args).map(boxed),
        );

        self.register(
            StageDescriptor {
                id: "flag",
                name: FlagPeriod::NAME,
                description: "Flag rows inside a named, optionally recurring window",
                category: StageCategory::Periods,
                args: &["name", "start", "end", "recurrence"],
                takes_metadata: false,
            },
            |args| FlagPeriod::from_args(args).map(boxed),
        );

        self.register(
            StageDescriptor {
                id: "remove",
                name: RemovePeriods::NAME,
                description: "Null rows outside every named window",
                category: StageCategory::Periods,
                args: &["window..."],
                takes_metadata: false,
            },
            |args| RemovePeriods::from_args(args).map(boxed),
        );

        self.register(
            StageDescriptor {
                id: "resample",
                name: Resample::NAME,
                description: "Aggregate every metric to a coarser resolution",
                category: StageCategory::Aggregation,
                args: &["resolution", "max_remove", "avg_type"],
                takes_metadata: true,
            },
            |args| Resample::from_args(args).map(boxed),
        );
    }

    /// Register a stage, replacing any existing entry with the same name.
    pub fn register(&mut self, descriptor: StageDescriptor, factory: StageFactory) {
        self.entries.retain(|e| e.descriptor.name != descriptor.name);
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.name == name)
    }

    /// Returns descriptors for all registered stages.
    pub fn all_stages(&self) -> Vec<&StageDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for stages in a specific category.
    pub fn stages_in_category(&self, category: StageCategory) -> Vec<&StageDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a descriptor by configuration name.
    pub fn get(&self, name: &str) -> Option<&StageDescriptor> {
        self.entry(name).map(|e| &e.descriptor)
    }

    /// Get a descriptor by short id, e.g. `resample`.
    ///
    /// Ids are for display and lookup only; configurations name stages by
    /// [`StageDescriptor::name`].
    pub fn get_by_id(&self, id: &str) -> Option<&StageDescriptor> {
        self.entries
            .iter()
            .map(|e| &e.descriptor)
            .find(|d| d.id == id)
    }

    /// Create a stage by configuration name.
    ///
    /// Returns `None` if no stage is registered under `name`, and
    /// `Some(Err(_))` if the stage rejects its arguments.
    pub fn create(&self, name: &str, args: &[String]) -> Option<Result<Box<dyn Stage>>> {
        self.entry(name).map(|e| (e.factory)(args))
    }

    /// Returns the number of registered stages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no stages are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noisedp_core::{Error, StageOutput, TimeSeries};

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_registry_creation() {
        let registry = StageRegistry::new();
        assert_eq!(registry.len(), 5);
        assert!(StageRegistry::empty().is_empty());
    }

    #[test]
    fn test_get_stage() {
        let registry = StageRegistry::new();

        let resample = registry.get("Re-sample").unwrap();
        assert_eq!(resample.id, "resample");
        assert!(resample.takes_metadata);
        assert_eq!(registry.get_by_id("octaves").unwrap().name, "Convert to octaves");
        assert!(registry.get("Smooth").is_none());
    }

    #[test]
    fn test_ids_do_not_resolve_stages() {
        let registry = StageRegistry::new();
        for id in ["regularise", "octaves", "flag", "remove", "resample"] {
            assert!(registry.get(id).is_none(), "{id} should not resolve by name");
            assert!(registry.create(id, &[]).is_none());
            assert!(registry.get_by_id(id).is_some());
        }
    }

    #[test]
    fn test_create_stage() {
        let registry = StageRegistry::new();

        let args = strings(&["Night", "2024-01-01 23:00", "2024-01-02 07:00", "0,1,2,3,4,5,6"]);
        let stage = registry.create("Flag time", &args).unwrap().unwrap();
        assert_eq!(stage.name(), "Flag time");

        let octaves = registry.create("Convert to octaves", &[]).unwrap().unwrap();
        assert_eq!(octaves.name(), "Convert to octaves");
    }

    #[test]
    fn test_create_rejects_bad_arguments() {
        let registry = StageRegistry::new();
        let err = registry
            .create("Re-sample", &strings(&["15", "0", "avg"]))
            .unwrap()
            .err()
            .unwrap();
        assert!(matches!(err, Error::ArgumentCount { actual: 3, .. }));

        assert!(registry.create("Smooth", &[]).is_none());
    }

    #[test]
    fn test_stages_by_category() {
        let registry = StageRegistry::new();
        assert_eq!(registry.stages_in_category(StageCategory::Periods).len(), 2);
        assert_eq!(registry.stages_in_category(StageCategory::Cleaning).len(), 1);
        assert_eq!(StageCategory::Aggregation.name(), "Aggregation");
    }

    #[test]
    fn test_register_replaces_by_name() {
        struct Stub;
        impl Stage for Stub {
            fn name(&self) -> &str {
                "Regularise"
            }
            fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
                Ok(StageOutput::new(series.clone()))
            }
        }

        let mut registry = StageRegistry::new();
        registry.register(
            StageDescriptor {
                id: "regularise",
                name: "Regularise",
                description: "stub",
                category: StageCategory::Cleaning,
                args: &[],
                takes_metadata: false,
            },
            |_| Ok(boxed(Stub)),
        );

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.get("Regularise").unwrap().description, "stub");
        // The stub ignores arguments the real stage would reject
        assert!(registry.create("Regularise", &[]).unwrap().is_ok());
    }
}
