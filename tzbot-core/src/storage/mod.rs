// File: tzbot-core/src/storage/mod.rs
//! JSON-file backed table storage. Every table is one JSON object stored at
//! `<data_dir>/<name>.json` and is always rewritten as a whole.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::Error;

#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Returns the last saved contents of `name`, or an empty table if it
    /// was never saved. Malformed content yields `Error::StorageCorrupt`.
    pub fn load_table<T>(&self, name: &str) -> Result<T, Error>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.table_path(name);
        let data = match fs::read_to_string(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "table file not found; starting empty");
                return Ok(T::default());
            }
            Err(e) => return Err(Error::Io(e)),
        };

        serde_json::from_str(&data).map_err(|e| Error::StorageCorrupt {
            table: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Serializes the whole table to a temp file and renames it over the
    /// previous one, so readers see either the old or the new table.
    pub fn save_table<T>(&self, name: &str, table: &T) -> Result<(), Error>
    where
        T: Serialize,
    {
        fs::create_dir_all(&self.dir)?;

        let path = self.table_path(name);
        let temp_path = path.with_extension("json.tmp");

        let written = write_temp(&temp_path, table)
            .and_then(|()| fs::rename(&temp_path, &path).map_err(Error::from));
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        info!(path = %path.display(), "table saved");
        Ok(())
    }
}

fn write_temp<T: Serialize>(temp_path: &Path, table: &T) -> Result<(), Error> {
    let file = File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, table)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}
