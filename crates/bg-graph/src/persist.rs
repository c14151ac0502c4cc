//! Reading and writing board files.

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use bg_resource::ResourceCache;
use tracing::{debug, info};

use crate::document::BoardDocument;
use crate::error::{GraphError, GraphResult};
use crate::graph::BoardGraph;

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> GraphError + '_ {
    move |source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl BoardGraph {
    /// Load a board file. The graph remembers `path` for [`save`](Self::save).
    pub fn open(path: impl Into<PathBuf>, cache: Rc<ResourceCache>) -> GraphResult<Self> {
        let path = path.into();
        debug!(path = %path.display(), "opening board");
        let text = fs::read_to_string(&path).map_err(io_error(&path))?;
        let mut graph = Self::from_json_str(&text, cache)?;
        graph.set_path(path);
        Ok(graph)
    }

    /// Open `path`, or start an empty board there and write it if no file exists.
    pub fn open_or_create(path: impl Into<PathBuf>, cache: Rc<ResourceCache>) -> GraphResult<Self> {
        let path = path.into();
        if path.exists() {
            return Self::open(path, cache);
        }
        info!(path = %path.display(), "creating new board");
        let mut graph = Self::new(cache);
        graph.save_as(path)?;
        Ok(graph)
    }

    /// Write the board to the path it was opened from or last saved as.
    pub fn save(&self) -> GraphResult<()> {
        let path = self.path().ok_or(GraphError::NoPath)?;
        let text = self.to_json_string()?;
        fs::write(path, text).map_err(io_error(path))?;
        debug!(path = %path.display(), "saved board");
        Ok(())
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> GraphResult<()> {
        self.set_path(path.into());
        self.save()
    }

    pub fn from_json_str(text: &str, cache: Rc<ResourceCache>) -> GraphResult<Self> {
        let doc = BoardDocument::from_json_str(text)?;
        Self::from_document(&doc, cache)
    }

    pub fn to_json_string(&self) -> GraphResult<String> {
        Ok(self.to_document()?.to_json_string()?)
    }
}
