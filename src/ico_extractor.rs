use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use log::info;

use crate::config::ToolConfig;
use crate::containers::reader::IcoReader;
use crate::error::Result;
use crate::icon_names::entry_file_name;
use crate::manifest::{Manifest, ManifestEntry};
use crate::verify::{verify_container, Finding};

pub const MANIFEST_FILE: &str = "manifest.json";

pub struct IcoExtractor {
    ico_path: PathBuf,
    reader: IcoReader<BufReader<File>>,
}

impl IcoExtractor {
    pub fn new<P: AsRef<Path>>(ico_path: P) -> Result<Self> {
        let ico_path = ico_path.as_ref().to_path_buf();
        let file = File::open(&ico_path)?;
        let reader = IcoReader::new(BufReader::new(file))?;

        Ok(IcoExtractor { ico_path, reader })
    }

    pub fn reader(&self) -> &IcoReader<BufReader<File>> {
        &self.reader
    }

    /// Write every usable entry to `output_dir` as its own file.
    pub fn extract_to_dir(&mut self, output_dir: &Path, config: &ToolConfig) -> Result<Manifest> {
        fs::create_dir_all(output_dir)?;

        let mut manifest = self.empty_manifest();
        for (index, entry) in self.reader.extract_all()? {
            info!("Index: {} - {}", index, entry);

            let file_name = entry_file_name(index, config.use_icon_names, &config.extension);
            fs::write(output_dir.join(&file_name), entry.data())?;

            manifest.entries.push(
                ManifestEntry::new(index, &entry)
                    .with_payload(entry.data())
                    .with_file(file_name),
            );
        }

        if config.write_manifest {
            manifest.save(&output_dir.join(MANIFEST_FILE))?;
        }

        info!(
            "Extracted {} entries from {} into {}",
            manifest.entries.len(),
            self.ico_path.display(),
            output_dir.display()
        );
        Ok(manifest)
    }

    /// Directory listing without payloads.
    pub fn list(&self) -> Manifest {
        Manifest::from_directory(
            self.source_name(),
            self.reader.total_len(),
            self.reader.directory(),
        )
    }

    /// Directory listing with a hash of every readable payload.
    pub fn list_with_hashes(&mut self) -> Result<Manifest> {
        let mut manifest = self.empty_manifest();
        for (index, entry) in self.reader.extract_all()? {
            manifest
                .entries
                .push(ManifestEntry::new(index, &entry).with_payload(entry.data()));
        }
        Ok(manifest)
    }

    pub fn verify(&mut self) -> Result<Vec<Finding>> {
        verify_container(&mut self.reader)
    }

    fn empty_manifest(&self) -> Manifest {
        Manifest::new(self.source_name(), self.reader.total_len())
    }

    fn source_name(&self) -> String {
        self.ico_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.ico_path.display().to_string())
    }
}
