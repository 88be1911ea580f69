//! Capability-checked artifact plans.
//!
//! A [`Plan`] is an ordered list of steps. Each step declares the columns it
//! needs; steps whose columns are absent are skipped, and a step that fails
//! while building is skipped too. Neither aborts the run.

use anyhow::Result;
use tracing::{debug, error, warn};

use crate::table::Table;

type Build<'a, T> = Box<dyn Fn(&Table) -> Result<T> + 'a>;

struct Step<'a, T> {
    name: &'static str,
    requires: Vec<String>,
    build: Build<'a, T>,
}

/// Why a step produced nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingColumns(Vec<String>),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub name: &'static str,
    pub reason: SkipReason,
}

/// An artifact together with its plan position.
#[derive(Debug, Clone, PartialEq)]
pub struct Produced<T> {
    pub position: usize,
    pub name: &'static str,
    pub artifact: T,
}

impl<T> Produced<T> {
    /// File stem such as `03_stress_by_age`.
    pub fn file_stem(&self) -> String {
        format!("{:02}_{}", self.position + 1, self.name)
    }
}

#[derive(Debug)]
pub struct Outcome<T> {
    pub produced: Vec<Produced<T>>,
    pub skipped: Vec<Skipped>,
}

pub struct Plan<'a, T> {
    steps: Vec<Step<'a, T>>,
}

impl<T> Default for Plan<'_, T> {
    fn default() -> Self {
        Plan { steps: Vec::new() }
    }
}

impl<'a, T> Plan<'a, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step; plan order is the order of these calls.
    pub fn step(
        mut self,
        name: &'static str,
        requires: &[&str],
        build: impl Fn(&Table) -> Result<T> + 'a,
    ) -> Self {
        self.steps.push(Step {
            name,
            requires: requires.iter().map(|c| c.to_string()).collect(),
            build: Box::new(build),
        });
        self
    }

    /// Builds every step whose required columns are present.
    pub fn run(&self, table: &Table) -> Outcome<T> {
        let mut produced = Vec::new();
        let mut skipped = Vec::new();

        for (position, step) in self.steps.iter().enumerate() {
            let missing = table.missing_columns(&step.requires);
            if !missing.is_empty() {
                warn!(artifact = step.name, missing = ?missing, "Required columns absent, artifact skipped");
                skipped.push(Skipped {
                    name: step.name,
                    reason: SkipReason::MissingColumns(
                        missing.into_iter().map(String::from).collect(),
                    ),
                });
                continue;
            }

            match (step.build)(table) {
                Ok(artifact) => {
                    debug!(artifact = step.name, position, "Artifact built");
                    produced.push(Produced {
                        position,
                        name: step.name,
                        artifact,
                    });
                }
                Err(e) => {
                    error!(artifact = step.name, error = %e, "Artifact failed, skipped");
                    skipped.push(Skipped {
                        name: step.name,
                        reason: SkipReason::Failed(format!("{e:#}")),
                    });
                }
            }
        }

        Outcome { produced, skipped }
    }
}
