pub mod coc;
pub mod en;
pub mod init;
pub mod pc;
pub mod pool;
pub mod sc;
pub mod show;
pub mod st;

use std::fs;
use std::path::{Path, PathBuf};

use comfy_table::{ContentArrangement, Table};
use kd_core::{DiceRoller, EngineConfig, MemoryStore};
use kd_initiative::InitiativeBoard;

use crate::storage::{self, DirBlobStore};

/// Settings and handles shared by every command.
pub struct Context {
    pub data: PathBuf,
    pub config: EngineConfig,
    pub card: String,
    pub dice: DiceRoller,
}

impl Context {
    /// Read the config file (if any) and apply command-line overrides.
    pub fn load(
        data: PathBuf,
        config_path: Option<&Path>,
        seed: Option<u64>,
        card: String,
    ) -> Result<Self, String> {
        let mut config = match config_path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
                EngineConfig::from_toml_str(&text)
                    .map_err(|e| format!("{}: {e}", path.display()))?
            }
            None => EngineConfig::default(),
        };
        if let Some(seed) = seed {
            config = config.with_seed(seed);
        }

        let dice = match config.seed {
            Some(seed) => DiceRoller::seeded(seed),
            None => DiceRoller::from_entropy(),
        };
        tracing::debug!(data = %data.display(), ?config, "loaded configuration");

        Ok(Self {
            data,
            config,
            card,
            dice,
        })
    }

    pub fn cards(&self) -> Result<MemoryStore, String> {
        storage::load_cards(&self.data)
    }

    pub fn save_cards(&self, store: &MemoryStore) -> Result<(), String> {
        storage::save_cards(&self.data, store)
    }

    pub fn board(&self) -> InitiativeBoard<DirBlobStore> {
        InitiativeBoard::new(DirBlobStore::new(&self.data))
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}
