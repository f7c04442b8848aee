use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use tidy_panda::data::loader;
use tidy_panda::pipeline::{self, PipelineOptions, PipelineRun};
use tidy_panda::{Download, FileError, Operation, Table};

// ---------------------------------------------------------------------------
// One uploaded file
// ---------------------------------------------------------------------------

/// Everything the page knows about one uploaded file. Errors stay local to
/// the session that produced them.
pub struct FileSession {
    /// Stable id used to salt widget ids (names may repeat).
    pub id: usize,
    pub name: String,
    /// Parsed upload; `None` when loading failed.
    pub loaded: Option<Table>,
    pub options: PipelineOptions,
    pub run: Option<PipelineRun>,
    /// Set only by a successful conversion, cleared by any control change.
    pub download: Option<Download>,
    /// Where the last download was written.
    pub saved_to: Option<PathBuf>,
    pub error: Option<FileError>,
}

impl FileSession {
    /// Parse an upload and run the pipeline with default options.
    pub fn open(id: usize, name: String, bytes: &[u8]) -> Self {
        let mut session = FileSession {
            id,
            name,
            loaded: None,
            options: PipelineOptions::default(),
            run: None,
            download: None,
            saved_to: None,
            error: None,
        };
        match loader::load(&session.name, bytes) {
            Ok(table) => {
                session.loaded = Some(table);
                session.rerun();
            }
            Err(e) => {
                log::error!("Failed to load '{}': {e}", session.name);
                session.error = Some(FileError::new(&session.name, Operation::Load, e));
            }
        }
        session
    }

    /// A session for a file that could not even be read from disk.
    pub fn unreadable(id: usize, name: String, cause: anyhow::Error) -> Self {
        log::error!("Failed to read '{name}': {cause:#}");
        FileSession {
            id,
            error: Some(FileError::new(&name, Operation::Load, cause)),
            name,
            loaded: None,
            options: PipelineOptions::default(),
            run: None,
            download: None,
            saved_to: None,
        }
    }

    /// Re-run the whole pipeline from the loaded table with the current options.
    pub fn rerun(&mut self) {
        self.download = None;
        self.saved_to = None;
        let Some(loaded) = &self.loaded else {
            return;
        };

        let dropped = self.options.columns.revalidate(loaded);
        if !dropped.is_empty() {
            log::warn!("'{}': dropped stale column selection {dropped:?}", self.name);
        }

        match pipeline::run(loaded, &self.options) {
            Ok(run) => {
                self.run = Some(run);
                self.error = None;
            }
            Err(e) => {
                log::error!("'{}': {e}", self.name);
                self.run = None;
                self.error = Some(FileError::new(&self.name, Operation::Select, e));
            }
        }
    }

    /// Serialize the current run in the chosen format.
    pub fn convert(&mut self) {
        let Some(run) = &self.run else {
            return;
        };
        match pipeline::export(run, &self.options, &self.name) {
            Ok(download) => {
                self.download = Some(download);
                self.saved_to = None;
                self.error = None;
            }
            Err(e) => {
                log::error!("'{}': conversion failed: {e}", self.name);
                self.download = None;
                self.error = Some(FileError::new(&self.name, Operation::Export, e));
            }
        }
    }

    /// Write the converted bytes to `path`.
    pub fn save_to(&mut self, path: &Path) {
        match self.write_download(path) {
            Ok(()) => self.saved_to = Some(path.to_path_buf()),
            Err(e) => {
                log::error!("'{}': {e:#}", self.name);
                self.error = Some(FileError::new(&self.name, Operation::Save, e));
            }
        }
    }

    fn write_download(&self, path: &Path) -> Result<()> {
        let download = self
            .download
            .as_ref()
            .context("nothing has been converted yet")?;
        std::fs::write(path, &download.bytes)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Saved '{}' to {}", download.file_name, path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Uploaded files in upload order.
    pub files: Vec<FileSession>,
    next_id: usize,
}

impl AppState {
    /// Add an upload given its name and content.
    pub fn add_file(&mut self, name: String, bytes: &[u8]) {
        let id = self.allocate_id();
        self.files.push(FileSession::open(id, name, bytes));
    }

    /// Add an upload read from disk.
    pub fn open_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match std::fs::read(path).with_context(|| format!("reading {}", path.display())) {
            Ok(bytes) => self.add_file(name, &bytes),
            Err(e) => {
                let id = self.allocate_id();
                self.files.push(FileSession::unreadable(id, name, e));
            }
        }
    }

    pub fn remove_file(&mut self, id: usize) {
        self.files.retain(|f| f.id != id);
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    fn allocate_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidy_panda::data::select::ColumnSelection;
    use tidy_panda::ExportFormat;

    const CSV: &[u8] = b"id,value,name\n1,10,a\n1,10,a\n2,,b\n";

    #[test]
    fn one_bad_file_does_not_affect_another() {
        let mut state = AppState::default();
        state.add_file("broken.txt".into(), b"???");
        state.add_file("good.csv".into(), CSV);

        assert!(state.files[0].loaded.is_none());
        let err = state.files[0].error.as_ref().unwrap();
        assert_eq!(err.operation, Operation::Load);
        assert_eq!(err.file, "broken.txt");

        assert!(state.files[1].error.is_none());
        assert_eq!(state.files[1].run.as_ref().unwrap().table.len(), 3);
    }

    #[test]
    fn download_is_offered_only_after_conversion_and_dropped_on_change() {
        let mut state = AppState::default();
        state.add_file("data.CSV".into(), CSV);
        let session = &mut state.files[0];
        assert!(session.download.is_none());

        session.options.export_format = ExportFormat::Excel;
        session.convert();
        assert_eq!(session.download.as_ref().unwrap().file_name, "data.xlsx");

        session.options.remove_duplicates = true;
        session.rerun();
        assert!(session.download.is_none());
        assert_eq!(session.run.as_ref().unwrap().table.len(), 2);
    }

    #[test]
    fn stale_selection_is_revalidated_before_running() {
        let mut state = AppState::default();
        state.add_file("data.csv".into(), CSV);
        let session = &mut state.files[0];
        session.options.columns = ColumnSelection::Columns(vec!["gone".into(), "id".into()]);
        session.rerun();
        assert!(session.error.is_none());
        assert_eq!(session.run.as_ref().unwrap().table.column_names(), ["id"]);
    }

    #[test]
    fn same_name_uploads_get_distinct_ids() {
        let mut state = AppState::default();
        state.add_file("data.csv".into(), CSV);
        state.add_file("data.csv".into(), CSV);
        assert_ne!(state.files[0].id, state.files[1].id);
        state.remove_file(state.files[0].id);
        assert_eq!(state.files.len(), 1);
    }
}
