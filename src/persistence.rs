//! Value-table export and import.
//!
//! Each agent's table is stored as `<dir>/agent_<idx>.json`, holding a
//! [`TableSnapshot`]. Import restores agents in index order.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::agent::{AgentPolicy, TableSnapshot};
use crate::error::{Error, Result};

/// File an agent's table is stored in.
pub fn table_path(dir: &Path, agent_index: usize) -> PathBuf {
    dir.join(format!("agent_{}.json", agent_index))
}

/// Writes a single snapshot to `path`.
pub fn save_snapshot(path: &Path, snapshot: &TableSnapshot) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    serde_json::to_writer(BufWriter::new(file), snapshot)?;
    Ok(())
}

/// Reads a single snapshot from `path`.
pub fn load_snapshot(path: &Path) -> Result<TableSnapshot> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Writes every agent's table into `dir`, creating it if needed.
///
/// Returns the written paths in agent order.
pub fn export_value_tables(
    dir: impl AsRef<Path>,
    agents: &[Box<dyn AgentPolicy>],
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut paths = Vec::with_capacity(agents.len());
    for (idx, agent) in agents.iter().enumerate() {
        let path = table_path(dir, idx);
        let snapshot = agent.snapshot();
        save_snapshot(&path, &snapshot)?;
        debug!(agent = idx, entries = snapshot.len(), path = %path.display(), "exported value table");
        paths.push(path);
    }
    Ok(paths)
}

/// Rebuilds agents from the tables stored in `dir`.
///
/// `factory` supplies an empty agent per table; its kind must match the
/// stored snapshot. Files are matched by the `agent_<idx>.json` pattern and
/// restored in ascending index order.
pub fn import_value_tables<F>(dir: impl AsRef<Path>, factory: F) -> Result<Vec<Box<dyn AgentPolicy>>>
where
    F: Fn() -> Box<dyn AgentPolicy>,
{
    let dir = dir.as_ref();
    let mut indexed: Vec<(usize, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if let Some(idx) = agent_index(&path) {
            indexed.push((idx, path));
        }
    }
    if indexed.is_empty() {
        return Err(Error::NoValueTables(dir.to_path_buf()));
    }
    indexed.sort_by_key(|(idx, _)| *idx);

    let mut agents = Vec::with_capacity(indexed.len());
    for (idx, path) in indexed {
        let snapshot = load_snapshot(&path)?;
        let entries = snapshot.len();
        let mut agent = factory();
        agent.restore(snapshot)?;
        debug!(agent = idx, entries, path = %path.display(), "imported value table");
        agents.push(agent);
    }
    Ok(agents)
}

fn agent_index(path: &Path) -> Option<usize> {
    if path.extension()? != "json" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("agent_")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{QAgent, ValueAgent};
    use crate::config::AgentKind;
    use crate::types::{Action, JointState, Position};

    fn state(x: i32) -> JointState {
        JointState::new(vec![Position::new(x, 0), Position::new(0, x)], None)
    }

    fn trained_value_agent(seed: f64) -> Box<dyn AgentPolicy> {
        let mut agent = ValueAgent::new();
        agent.update(&state(1), Action::Stay, seed, &state(2), 0.5, 0.9);
        agent.update(&state(2), Action::Up, -seed, &state(1), 0.5, 0.9);
        Box::new(agent)
    }

    #[test]
    fn export_then_import_restores_tables_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let agents = vec![trained_value_agent(10.0), trained_value_agent(20.0)];

        let paths = export_value_tables(dir.path(), &agents).unwrap();
        assert_eq!(paths, vec![table_path(dir.path(), 0), table_path(dir.path(), 1)]);

        let restored = import_value_tables(dir.path(), || AgentKind::StateValue.build()).unwrap();
        assert_eq!(restored.len(), 2);
        for (before, after) in agents.iter().zip(&restored) {
            assert_eq!(before.snapshot(), after.snapshot());
        }
    }

    #[test]
    fn import_orders_numerically_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let agents: Vec<Box<dyn AgentPolicy>> =
            (0..11).map(|i| trained_value_agent(i as f64)).collect();
        export_value_tables(dir.path(), &agents).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("agent_x.json"), "{}").unwrap();

        let restored = import_value_tables(dir.path(), || AgentKind::StateValue.build()).unwrap();
        assert_eq!(restored.len(), 11);
        assert_eq!(restored[10].snapshot(), agents[10].snapshot());
        assert_eq!(restored[2].snapshot(), agents[2].snapshot());
    }

    #[test]
    fn empty_directory_has_no_tables() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_value_tables(dir.path(), || AgentKind::StateValue.build()).unwrap_err();
        assert!(matches!(err, Error::NoValueTables(_)));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = import_value_tables(&missing, || AgentKind::StateValue.build()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn factory_kind_must_match_stored_tables() {
        let dir = tempfile::tempdir().unwrap();
        let agents: Vec<Box<dyn AgentPolicy>> = vec![Box::new(QAgent::new())];
        export_value_tables(dir.path(), &agents).unwrap();

        let err = import_value_tables(dir.path(), || AgentKind::StateValue.build()).unwrap_err();
        assert!(matches!(err, Error::SnapshotMismatch { .. }));
    }

    #[test]
    fn corrupt_table_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(table_path(dir.path(), 0), "not json").unwrap();
        let err = import_value_tables(dir.path(), || AgentKind::StateValue.build()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
