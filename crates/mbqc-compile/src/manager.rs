//! Pass manager for orchestrating the pattern pipeline.

use tracing::{debug, info, instrument};

use mbqc_pattern::Pattern;

use crate::error::CompileResult;
use crate::options::CompileOptions;
use crate::pass::Pass;
use crate::passes::{DependencyVerification, ResolveDependencies, SignalShift, Simplify, Standardize};
use crate::property::PropertySet;

/// Manages and executes a sequence of pattern passes.
pub struct PassManager {
    /// The passes to execute, in order.
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// Create a new empty pass manager.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Add a pass to the manager.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the registered passes, in order.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run all passes on the given pattern.
    #[instrument(skip(self, pattern, properties))]
    pub fn run(&self, pattern: &mut Pattern, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running pass manager with {} passes on pattern with {} commands",
            self.passes.len(),
            pattern.commands().len()
        );

        for pass in &self.passes {
            if pass.should_run(pattern, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(pattern, properties)?;
                debug!(
                    "Pass {} completed, commands: {}",
                    pass.name(),
                    pattern.commands().len()
                );
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, commands: {}, peak register: {}",
            pattern.commands().len(),
            pattern.max_active_qubits()
        );

        Ok(())
    }

    /// Get the number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Check if the manager has no passes.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for the standard pipeline.
///
/// Standardize, SignalShift, Simplify, ResolveDependencies and
/// DependencyVerification are always registered; the optional ones check
/// [`CompileOptions`] in `should_run`.
pub struct PassManagerBuilder {
    options: CompileOptions,
}

impl PassManagerBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: CompileOptions::default(),
        }
    }

    /// Set the options.
    #[must_use]
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the pass manager and return it with the properties.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        pm.add_pass(Standardize);
        pm.add_pass(SignalShift);
        pm.add_pass(Simplify);
        pm.add_pass(ResolveDependencies);
        pm.add_pass(DependencyVerification);

        (pm, PropertySet::new().with_options(self.options))
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
