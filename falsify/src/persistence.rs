//! Saving falsified checks so they can be replayed.
//!
//! A [`ReplayRecord`] holds what is needed to get back to a shrunk sample: the seed and
//! generation index that produced the original sample, and the status of every falsifier
//! call the shrinker made. Rerunning the check with the recorded seed yields the original
//! sample again; [`ReplayRecord::recreate`] then walks the recorded shrinking path without
//! evaluating the property.
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::hash::Hash;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::check::{CheckResult, CheckStatus};
use crate::config::CheckConfig;
use crate::falsifier::TryStatus;
use crate::parameters::GenerationInfo;
use crate::sample::FalsifiedSample;
use crate::shrinkable::Value;
use crate::shrinking::ShrunkSampleRecreator;

/// A recorded check outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub name: String,
    pub status: CheckStatus,
    pub generation_info: GenerationInfo,
    pub tries: usize,
    /// Debug rendering of the original falsifying parameters
    pub original_parameters: Option<String>,
    /// Debug rendering of the shrunk parameters
    pub shrunk_parameters: Option<String>,
    /// Status of every falsifier call made while shrinking
    pub shrinking_sequence: Vec<TryStatus>,
}

impl ReplayRecord {
    pub fn from_result<P: Value>(result: &CheckResult<P>) -> Self {
        Self {
            name: result.name.clone(),
            status: result.status,
            generation_info: result.generation_info,
            tries: result.tries,
            original_parameters: result
                .original_sample
                .as_ref()
                .map(|sample| format!("{:?}", sample.parameters())),
            shrunk_parameters: result
                .shrunk_sample
                .as_ref()
                .map(|shrunk| format!("{:?}", shrunk.sample().parameters())),
            shrinking_sequence: result
                .shrunk_sample
                .as_ref()
                .map(|shrunk| shrunk.shrinking_sequence().to_vec())
                .unwrap_or_default(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// `config` seeded the way the recorded run was, or `None` if the run was not random
    pub fn replay_config(&self, config: CheckConfig) -> Option<CheckConfig> {
        self.generation_info.seed.map(|seed| config.with_seed(seed))
    }

    /// Walk the recorded shrinking path starting from `original`
    pub fn recreate<P>(&self, original: FalsifiedSample<P>) -> Option<FalsifiedSample<P>>
    where
        P: Value + Eq + Hash,
    {
        ShrunkSampleRecreator::new(original).recreate(&self.shrinking_sequence)
    }
}

/// Directory of replay records, one JSON file per check name
pub struct ReplayStore {
    root_dir: PathBuf,
}

impl ReplayStore {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let root_dir = path.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root_dir.join(format!("{}.json", file_name))
    }

    /// Save `record`, replacing an earlier record of the same check
    pub fn save(&self, record: &ReplayRecord) -> io::Result<PathBuf> {
        let path = self.path_for(&record.name);
        let json = record
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> io::Result<Option<ReplayRecord>> {
        let path = self.path_for(name);
        if !path.exists() {
            return Ok(None);
        }
        let mut contents = String::new();
        File::open(&path)?.read_to_string(&mut contents)?;
        ReplayRecord::from_json(&contents)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn delete(&self, name: &str) -> io::Result<()> {
        let path = self.path_for(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// All readable records in the store
    pub fn load_all(&self) -> io::Result<Vec<ReplayRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let mut contents = String::new();
                File::open(&path)?.read_to_string(&mut contents)?;
                if let Ok(record) = ReplayRecord::from_json(&contents) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}
