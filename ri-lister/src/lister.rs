use std::collections::{HashSet, VecDeque};

use clap::ValueEnum;
use log::{debug, trace, warn};
use ri_common::error::ListingError;
use ri_common::schema::github::{GitHubDirectoryEntry, GitHubEntryType};
use serde::{Deserialize, Serialize};

use crate::source::ListingSource;

pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 9] = [
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff",
];

/// Case-insensitive file extension allow-list.
#[derive(Debug, Clone)]
pub struct ImageFilter {
    _extensions: HashSet<String>,
}

impl ImageFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            _extensions: extensions
                .into_iter()
                .map(|extension| extension.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|extension| !extension.is_empty())
                .collect(),
        }
    }

    /// Dotfiles such as `.png` have no extension.
    pub fn is_image(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => {
                self._extensions.contains(&extension.to_lowercase())
            }
            _ => false,
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_EXTENSIONS)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    /// Direct download URL (raw.githubusercontent.com)
    #[default]
    Download,

    /// Browser page of the file on github.com
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub path: String,
    pub name: String,
    pub url: String,
}

/// Depth-first walk over a remote directory tree, yielding image files one at a time.
///
/// Each frame of the stack holds the not yet visited entries of one listing, so a
/// directory is fully expanded before the entries that follow it in its parent.
pub struct ImageLister<S> {
    _source: S,
    _filter: ImageFilter,
    _link: LinkKind,
    _root: String,
    _stack: Vec<VecDeque<GitHubDirectoryEntry>>,
    _started: bool,
    _listed: usize,
}

impl<S> ImageLister<S>
where
    S: ListingSource,
{
    pub fn new(source: S, filter: ImageFilter, link: LinkKind, root_path: &str) -> Self {
        Self {
            _source: source,
            _filter: filter,
            _link: link,
            _root: root_path.to_string(),
            _stack: vec![],
            _started: false,
            _listed: 0,
        }
    }

    /// Number of listing requests issued so far.
    pub fn directories_listed(&self) -> usize {
        self._listed
    }

    async fn _expand(&mut self, path: &str) -> Result<(), ListingError> {
        debug!("Listing \"{path}\"");
        let entries = self._source.list(path).await?;
        self._listed += 1;

        trace!("\"{path}\" has {} entries", entries.len());
        self._stack.push(entries.into());
        Ok(())
    }

    fn _classify(&self, entry: GitHubDirectoryEntry) -> Option<ImageRecord> {
        if !self._filter.is_image(&entry.name) {
            trace!("Skipping non-image file {}", entry.path);
            return None;
        }

        debug_assert!(entry.path.ends_with(&entry.name));

        let url = match self._link {
            LinkKind::Download => entry.download_url,
            LinkKind::Html => entry.html_url,
        };
        let url = url.unwrap_or_else(|| {
            warn!("No {:?} URL for {}", self._link, entry.path);
            String::new()
        });

        Some(ImageRecord {
            path: entry.path,
            name: entry.name,
            url,
        })
    }

    /// The next image in traversal order, or `None` once the tree is exhausted.
    pub async fn next_record(&mut self) -> Result<Option<ImageRecord>, ListingError> {
        if !self._started {
            self._started = true;
            let root = self._root.clone();
            self._expand(&root).await?;
        }

        loop {
            let Some(frame) = self._stack.last_mut() else {
                return Ok(None);
            };

            let Some(entry) = frame.pop_front() else {
                self._stack.pop();
                continue;
            };

            match entry.type_ {
                GitHubEntryType::Dir => self._expand(&entry.path).await?,
                GitHubEntryType::File => {
                    if let Some(record) = self._classify(entry) {
                        trace!("Found image {}", record.path);
                        return Ok(Some(record));
                    }
                }
                other => debug!("Skipping {other:?} entry {}", entry.path),
            }
        }
    }

    /// Drain the rest of the traversal. The first listing failure aborts it.
    pub async fn collect(&mut self) -> Result<Vec<ImageRecord>, ListingError> {
        let mut records = vec![];
        while let Some(record) = self.next_record().await? {
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use ri_common::error::{ListingError, ListingErrorKind};
    use ri_common::schema::github::{GitHubDirectoryEntry, GitHubEntryType};

    use super::{ImageFilter, ImageLister, ImageRecord, LinkKind};
    use crate::source::ListingSource;

    pub fn file(path: &str) -> GitHubDirectoryEntry {
        let name = path.rsplit('/').next().unwrap_or(path);
        GitHubDirectoryEntry {
            name: name.to_string(),
            path: path.to_string(),
            sha: String::new(),
            size: 1,
            url: String::new(),
            html_url: Some(format!("https://github.com/o/r/blob/main/{path}")),
            git_url: None,
            download_url: Some(format!("https://raw.example/{path}")),
            type_: GitHubEntryType::File,
        }
    }

    pub fn dir(path: &str) -> GitHubDirectoryEntry {
        GitHubDirectoryEntry {
            download_url: None,
            html_url: None,
            type_: GitHubEntryType::Dir,
            ..file(path)
        }
    }

    /// In-memory tree keyed by directory path, recording every request.
    #[derive(Default)]
    pub struct FakeSource {
        pub tree: HashMap<String, Vec<GitHubDirectoryEntry>>,
        pub failures: HashMap<String, ListingErrorKind>,
        pub requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeSource {
        pub fn with(mut self, path: &str, entries: Vec<GitHubDirectoryEntry>) -> Self {
            self.tree.insert(path.to_string(), entries);
            self
        }

        pub fn failing(mut self, path: &str, kind: ListingErrorKind) -> Self {
            self.failures.insert(path.to_string(), kind);
            self
        }
    }

    #[async_trait]
    impl ListingSource for FakeSource {
        async fn list(&self, path: &str) -> Result<Vec<GitHubDirectoryEntry>, ListingError> {
            self.requests.lock().unwrap().push(path.to_string());
            if let Some(kind) = self.failures.get(path) {
                return Err(ListingError::new(*kind, path, "injected"));
            }

            self.tree
                .get(path)
                .cloned()
                .ok_or_else(|| ListingError::new(ListingErrorKind::NotFound, path, "HTTP 404"))
        }
    }

    fn _paths(records: &[ImageRecord]) -> Vec<&str> {
        records.iter().map(|record| record.path.as_str()).collect()
    }

    #[test]
    fn extensions_match_case_insensitively() {
        let filter = ImageFilter::default();

        for name in [
            "a.png", "B.JPG", "c.Jpeg", "d.gif", "e.bmp", "f.webp", "g.SVG", "h.tif", "i.tiff",
            "archive.tar.PNG",
        ] {
            assert!(filter.is_image(name), "{name} should be an image");
        }

        for name in ["notes.txt", "png", ".png", "image.png.bak", "photo.", "Makefile"] {
            assert!(!filter.is_image(name), "{name} should not be an image");
        }
    }

    #[test]
    fn custom_allow_list_normalizes_entries() {
        let filter = ImageFilter::new([".AVIF", " heic ", ""]);
        assert!(filter.is_image("shot.avif"));
        assert!(filter.is_image("shot.HEIC"));
        assert!(!filter.is_image("shot.png"));
    }

    #[tokio::test]
    async fn scenario_root_and_one_subdirectory() {
        let source = FakeSource::default()
            .with("", vec![file("a.png"), dir("sub")])
            .with("sub", vec![file("sub/b.jpg"), file("sub/c.txt")]);

        let records = ImageLister::new(source, ImageFilter::default(), LinkKind::Download, "")
            .collect()
            .await
            .unwrap();

        assert_eq!(
            records,
            vec![
                ImageRecord {
                    path: "a.png".to_string(),
                    name: "a.png".to_string(),
                    url: "https://raw.example/a.png".to_string(),
                },
                ImageRecord {
                    path: "sub/b.jpg".to_string(),
                    name: "b.jpg".to_string(),
                    url: "https://raw.example/sub/b.jpg".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn directories_expand_before_later_siblings() {
        let source = FakeSource::default()
            .with("", vec![dir("a"), file("top.png"), dir("b")])
            .with("a", vec![dir("a/deep"), file("a/1.png")])
            .with("a/deep", vec![file("a/deep/2.png")])
            .with("b", vec![file("b/3.png")]);
        let requests = source.requests.clone();

        let records = ImageLister::new(source, ImageFilter::default(), LinkKind::Download, "")
            .collect()
            .await
            .unwrap();

        assert_eq!(
            _paths(&records),
            vec!["a/deep/2.png", "a/1.png", "top.png", "b/3.png"]
        );
        assert_eq!(*requests.lock().unwrap(), vec!["", "a", "a/deep", "b"]);
    }

    #[tokio::test]
    async fn tree_without_images_yields_nothing() {
        let source = FakeSource::default()
            .with("docs", vec![file("docs/README.md"), dir("docs/empty")])
            .with("docs/empty", vec![]);

        let mut lister = ImageLister::new(source, ImageFilter::default(), LinkKind::Download, "docs");

        assert_eq!(lister.next_record().await.unwrap(), None);
        assert_eq!(lister.directories_listed(), 2);
        assert_eq!(lister.next_record().await.unwrap(), None);
    }

    #[tokio::test]
    async fn listing_is_lazy() {
        let source = FakeSource::default()
            .with("", vec![file("first.png"), dir("later")])
            .with("later", vec![file("later/second.png")]);
        let requests = source.requests.clone();

        let mut lister = ImageLister::new(source, ImageFilter::default(), LinkKind::Download, "");
        let first = lister.next_record().await.unwrap().unwrap();

        assert_eq!(first.name, "first.png");
        assert_eq!(*requests.lock().unwrap(), vec![""]);
    }

    #[tokio::test]
    async fn failure_in_subtree_aborts_everything() {
        let source = FakeSource::default()
            .with("", vec![file("a.png"), dir("locked"), file("z.png")])
            .failing("locked", ListingErrorKind::RateLimited);

        let error = ImageLister::new(source, ImageFilter::default(), LinkKind::Download, "")
            .collect()
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ListingErrorKind::RateLimited);
        assert_eq!(error.path(), "locked");
    }

    #[tokio::test]
    async fn html_links_and_ignored_entry_types() {
        let mut link = file("docs/link.png");
        link.type_ = GitHubEntryType::Symlink;
        let mut module = dir("vendor");
        module.type_ = GitHubEntryType::Submodule;

        let source = FakeSource::default().with("docs", vec![link, module, file("docs/shot.PNG")]);

        let records = ImageLister::new(source, ImageFilter::default(), LinkKind::Html, "docs")
            .collect()
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://github.com/o/r/blob/main/docs/shot.PNG");
    }

    #[tokio::test]
    async fn same_tree_same_order() {
        let build = || {
            FakeSource::default()
                .with("", vec![dir("x"), file("b.gif"), file("a.gif")])
                .with("x", vec![file("x/z.webp"), file("x/y.webp")])
        };

        let first = ImageLister::new(build(), ImageFilter::default(), LinkKind::Download, "")
            .collect()
            .await
            .unwrap();
        let second = ImageLister::new(build(), ImageFilter::default(), LinkKind::Download, "")
            .collect()
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(_paths(&first), vec!["x/z.webp", "x/y.webp", "b.gif", "a.gif"]);
    }
}
