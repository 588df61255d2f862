use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::config::ToolConfig;
use crate::containers::entry::IcoEntry;
use crate::containers::writer::IcoBuilder;
use crate::containers::MAX_ENTRIES;
use crate::error::Result;
use crate::ico_extractor::MANIFEST_FILE;
use crate::icon_names::parse_index;

/// Collects `<index>_*.jpg` files from a directory into a new container.
pub struct IcoCreator {
    source_dir: PathBuf,
    builder: IcoBuilder,
}

impl IcoCreator {
    pub fn from_dir<P: AsRef<Path>>(source_dir: P, config: &ToolConfig) -> Result<Self> {
        let source_dir = source_dir.as_ref().to_path_buf();

        let mut files = Vec::new();
        for dir_entry in fs::read_dir(&source_dir)? {
            let dir_entry = dir_entry?;
            if dir_entry.file_type()?.is_file() {
                files.push(dir_entry.path());
            }
        }
        files.sort();

        let mut builder = IcoBuilder::new();
        for path in files {
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                warn!("Skipping {}: file name is not valid UTF-8", path.display());
                continue;
            };
            if file_name == MANIFEST_FILE || is_container(&path) {
                debug!("Skipping {}", file_name);
                continue;
            }

            let index = match parse_index(file_name) {
                Some(index) if index < MAX_ENTRIES => index,
                Some(index) => {
                    warn!("Skipping {}: index {} is out of range", file_name, index);
                    continue;
                }
                None => {
                    warn!("Skipping {}: name does not start with an index", file_name);
                    continue;
                }
            };

            let data = fs::read(&path)?;
            let entry = if config.strict_dimensions {
                IcoEntry::from_source_strict(data)?
            } else {
                IcoEntry::from_source(data)?
            };
            debug!("{} -> index {}: {}", file_name, index, entry);

            if builder.insert(index, entry)?.is_some() {
                warn!("Index {} given more than once, using {}", index, file_name);
            }
        }

        Ok(IcoCreator {
            source_dir,
            builder,
        })
    }

    pub fn builder(&self) -> &IcoBuilder {
        &self.builder
    }

    /// `<dir>.ICO` next to the source directory.
    pub fn default_output_path(&self) -> PathBuf {
        let name = self
            .source_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());
        let parent = self.source_dir.parent().unwrap_or_else(|| Path::new(""));
        parent.join(format!("{}.ICO", name))
    }

    /// Build the container and write it to `output_path`.
    ///
    /// The file only appears once it is complete.
    pub fn write(&mut self, output_path: &Path) -> Result<()> {
        info!("Creating {}...", output_path.display());
        let data = self.builder.build()?;

        let temp_path = output_path.with_extension("ICO.tmp");
        if let Err(e) = fs::write(&temp_path, &data)
            .and_then(|()| fs::rename(&temp_path, output_path))
        {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!("Output file is \"{}\"", output_path.display());
        Ok(())
    }
}

/// Containers written next to their icons, e.g. `create out -o out/9.ICO`.
fn is_container(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("ico"))
        .unwrap_or(false)
}
