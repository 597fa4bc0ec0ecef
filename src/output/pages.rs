use crate::output::traits::{OutputResult, PageSink, ProcessedPage};
use crate::url::url_hash;
use std::path::{Path, PathBuf};

/// Writes raw page bodies to `<base>/<site>/<url hash>.html`
pub struct PageSaver {
    dir: PathBuf,
}

impl PageSaver {
    pub fn new(base_path: &Path, site: &str) -> Self {
        Self {
            dir: base_path.join(site),
        }
    }

    /// Returns the file a URL's page is saved to
    pub fn page_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.html", url_hash(url)))
    }

    /// Saves a page body, replacing any earlier copy
    pub fn save(&self, url: &str, body: &str) -> OutputResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.page_path(url);
        std::fs::write(&path, body)?;
        tracing::debug!("Saved {} to {}", url, path.display());
        Ok(path)
    }
}

impl PageSink for PageSaver {
    fn name(&self) -> &'static str {
        "page saver"
    }

    fn record_page(&mut self, page: &ProcessedPage<'_>) -> OutputResult<()> {
        self.save(page.url, page.body).map(|_| ())
    }
}
