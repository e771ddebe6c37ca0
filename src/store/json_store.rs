use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::config::Config;
use crate::store::schema::{EXPORT_VERSION, ExportData, ProfileData, ResultHistoryData};

pub const PROFILE_FILE: &str = "profile.json";
pub const RESULTS_FILE: &str = "results.json";

#[derive(Clone, Debug)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data directory {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typedash")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing or unreadable files load as `None`.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.file_path(name);
        if !path.exists() {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = name, error = %e, "could not read store file");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(file = name, error = %e, "store file is corrupt, using defaults");
                None
            }
        }
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        write_synced(&tmp_path, &json)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    pub fn load_profile(&self) -> ProfileData {
        match self.load::<ProfileData>(PROFILE_FILE) {
            Some(profile) if profile.needs_reset() => {
                warn!(
                    version = profile.schema_version,
                    "profile schema is stale, starting fresh"
                );
                ProfileData::default()
            }
            Some(profile) => profile,
            None => ProfileData::default(),
        }
    }

    pub fn save_profile(&self, data: &ProfileData) -> Result<()> {
        self.save(PROFILE_FILE, data)
    }

    pub fn load_history(&self) -> ResultHistoryData {
        match self.load::<ResultHistoryData>(RESULTS_FILE) {
            Some(history) if history.needs_reset() => {
                warn!(
                    version = history.schema_version,
                    "results schema is stale, starting fresh"
                );
                ResultHistoryData::default()
            }
            Some(history) => history,
            None => ResultHistoryData::default(),
        }
    }

    pub fn save_history(&self, data: &ResultHistoryData) -> Result<()> {
        self.save(RESULTS_FILE, data)
    }

    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            typedash_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            profile: self.load_profile(),
            history: self.load_history(),
        }
    }

    pub fn export_to_file(&self, config: &Config, path: &Path) -> Result<ExportData> {
        let data = self.export_all(config);
        let json = serde_json::to_string_pretty(&data)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(data)
    }

    pub fn read_export(path: &Path) -> Result<ExportData> {
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a typedash export", path.display()))?;
        Ok(data)
    }

    /// `import_all`, then write the exported config to `config_path`.
    /// Returns the config as saved.
    pub fn import_with_config(&self, data: &ExportData, config_path: &Path) -> Result<Config> {
        self.import_all(data)?;
        let mut config = data.config.clone();
        config.validate();
        config
            .save_to(config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        info!(path = %config_path.display(), "config restored from export");
        Ok(config)
    }

    /// Replace profile and results with the exported copies.
    ///
    /// Every file is first staged as `.tmp`. Originals are then moved to
    /// `.bak` and the staged files renamed into place. Any failure restores
    /// what was already committed.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.typedash_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.typedash_export_version,
                EXPORT_VERSION
            );
        }

        let files = [
            (PROFILE_FILE, serde_json::to_string_pretty(&data.profile)?),
            (RESULTS_FILE, serde_json::to_string_pretty(&data.history)?),
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            if let Err(e) = write_synced(&tmp_path, json) {
                remove_all(&staged);
                bail!("Import failed during staging: {e}");
            }
            staged.push(tmp_path);
        }

        let mut committed: Vec<Committed> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let entry = Committed {
                final_path: self.file_path(name),
                bak_path: self.file_path(name).with_extension("json.bak"),
                had_original: self.file_path(name).exists(),
            };

            if entry.had_original
                && let Err(e) = fs::rename(&entry.final_path, &entry.bak_path)
            {
                rollback(&committed);
                remove_all(&staged);
                bail!("Import failed during commit (backup): {e}");
            }

            if let Err(e) = fs::rename(&staged[i], &entry.final_path) {
                entry.restore();
                rollback(&committed);
                remove_all(&staged[i..]);
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push(entry);
        }

        for entry in committed.iter().filter(|c| c.had_original) {
            let _ = fs::remove_file(&entry.bak_path);
        }

        Ok(())
    }

    /// Remove `.bak` files left behind by an interrupted import. Returns
    /// true if any were found.
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in [PROFILE_FILE, RESULTS_FILE] {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

struct Committed {
    final_path: PathBuf,
    bak_path: PathBuf,
    had_original: bool,
}

impl Committed {
    fn restore(&self) {
        if self.had_original && self.bak_path.exists() {
            if let Err(e) = fs::rename(&self.bak_path, &self.final_path) {
                warn!(
                    backup = %self.bak_path.display(),
                    error = %e,
                    "rollback could not restore backup"
                );
            }
        } else if !self.had_original
            && let Err(e) = fs::remove_file(&self.final_path)
        {
            warn!(file = %self.final_path.display(), error = %e, "rollback could not remove file");
        }
    }
}

fn rollback(committed: &[Committed]) {
    for entry in committed {
        entry.restore();
    }
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(file = %path.display(), error = %e, "could not remove staged file");
        }
    }
}

fn write_synced(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}
