//! Parallel runs over many seeds.
//!
//! Every seed gets its own output directory `<out>/<seed>/` holding the CSV
//! frame logs and, if enabled, the exported value tables.

use std::path::Path;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::curriculum::Curriculum;
use crate::error::Result;
use crate::metrics::PhaseSummary;
use crate::persistence::export_value_tables;
use crate::tracer::CsvTracer;

/// Result of one seeded run.
#[derive(Debug)]
pub struct SeedOutcome {
    pub seed: u64,
    pub result: Result<Vec<PhaseSummary>>,
}

/// Runs the curriculum of `config` with its seed, logging into `root`.
///
/// `root` is cleared first.
pub fn run_seed(config: &RunConfig, root: &Path) -> Result<Vec<PhaseSummary>> {
    let curriculum = Curriculum::new(config.clone())?;
    let mut tracer = CsvTracer::create(root)?;
    let outcome = curriculum.run(&mut tracer)?;
    if config.export_tables {
        export_value_tables(tracer.tables_dir(), &outcome.agents)?;
    }
    Ok(outcome.summaries)
}

/// Runs `config` once per seed, in parallel.
///
/// A failing seed does not stop the others; outcomes come back in the order
/// of `seeds`.
pub fn run_seeds(config: &RunConfig, seeds: &[u64], out_dir: &Path) -> Vec<SeedOutcome> {
    info!(seeds = seeds.len(), out = %out_dir.display(), "starting seed sweep");
    seeds
        .par_iter()
        .map(|&seed| {
            let config = RunConfig {
                seed,
                ..config.clone()
            };
            let result = run_seed(&config, &out_dir.join(seed.to_string()));
            if let Err(e) = &result {
                warn!(seed, error = %e, "seed failed");
            }
            SeedOutcome { seed, result }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentPolicy;
    use crate::config::{AgentKind, GridConfig, Stage};
    use crate::environment::RegimeKind;
    use crate::persistence::import_value_tables;

    fn tiny_config() -> RunConfig {
        RunConfig {
            grid: GridConfig::new(5, 5, 2, 100.0),
            stages: vec![Stage::new(RegimeKind::Center, 100, 20)],
            ..RunConfig::default()
        }
    }

    #[test]
    fn each_seed_writes_its_own_directory() {
        let out = tempfile::tempdir().unwrap();
        let outcomes = run_seeds(&tiny_config(), &[3, 1, 2], out.path());

        let seeds: Vec<u64> = outcomes.iter().map(|o| o.seed).collect();
        assert_eq!(seeds, vec![3, 1, 2]);
        for outcome in &outcomes {
            let summaries = outcome.result.as_ref().unwrap();
            assert_eq!(summaries.len(), 2);

            let root = out.path().join(outcome.seed.to_string());
            assert!(root.join("logs").join("training_0.csv").exists());
            assert!(root.join("logs").join("testing_0.csv").exists());

            let agents: Vec<Box<dyn AgentPolicy>> =
                import_value_tables(root.join("qvals"), || AgentKind::StateValue.build()).unwrap();
            assert_eq!(agents.len(), 2);
        }
    }

    #[test]
    fn export_can_be_disabled() {
        let out = tempfile::tempdir().unwrap();
        let config = RunConfig {
            export_tables: false,
            ..tiny_config()
        };
        let summaries = run_seed(&config, &out.path().join("run")).unwrap();
        assert_eq!(summaries.len(), 2);
        assert!(!out.path().join("run").join("qvals").exists());
    }

    #[test]
    fn invalid_config_fails_every_seed() {
        let out = tempfile::tempdir().unwrap();
        let config = RunConfig {
            alpha: 0.0,
            ..tiny_config()
        };
        let outcomes = run_seeds(&config, &[1, 2], out.path());
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }
}
