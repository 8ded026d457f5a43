use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::lister::ImageRecord;

/// How to fit folder chains deeper than the number of folder columns.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the outermost folders and drop the deepest ones
    #[default]
    Truncate,

    /// Join the deepest folders with "/" into the last folder column
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub folders: Vec<String>,
    pub name: String,
    pub url: String,
}

impl Row {
    pub fn into_fields(self) -> Vec<String> {
        let mut fields = self.folders;
        fields.push(self.name);
        fields.push(self.url);
        fields
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RowBuilder {
    _folder_columns: usize,
    _overflow: OverflowPolicy,
}

impl RowBuilder {
    /// `folder_columns` is clamped to at least one column.
    pub fn new(folder_columns: usize, overflow: OverflowPolicy) -> Self {
        Self {
            _folder_columns: folder_columns.max(1),
            _overflow: overflow,
        }
    }

    pub fn folder_columns(&self) -> usize {
        self._folder_columns
    }

    /// `folder, subfolder, subfolder, ..., name, url`
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self._folder_columns + 2);
        header.push("folder".to_string());
        header.extend((1..self._folder_columns).map(|_| "subfolder".to_string()));
        header.push("name".to_string());
        header.push("url".to_string());
        header
    }

    /// Directory segments of `path` fitted to exactly `folder_columns` entries.
    pub fn folders(&self, path: &str) -> Vec<String> {
        let chain = match path.rsplit_once('/') {
            Some((parent, _)) => parent
                .split('/')
                .filter(|segment| !segment.is_empty())
                .collect::<Vec<_>>(),
            None => vec![],
        };

        let columns = self._folder_columns;
        let mut folders = if chain.len() <= columns {
            chain.iter().map(|segment| (*segment).to_string()).collect::<Vec<_>>()
        } else {
            match self._overflow {
                OverflowPolicy::Truncate => chain[..columns]
                    .iter()
                    .map(|segment| (*segment).to_string())
                    .collect(),
                OverflowPolicy::Merge => {
                    let mut folders = chain[..columns - 1]
                        .iter()
                        .map(|segment| (*segment).to_string())
                        .collect::<Vec<_>>();
                    folders.push(chain[columns - 1..].join("/"));
                    folders
                }
            }
        };

        folders.resize(columns, String::new());
        folders
    }

    pub fn build(&self, record: &ImageRecord) -> Row {
        Row {
            folders: self.folders(&record.path),
            name: record.name.clone(),
            url: record.url.clone(),
        }
    }
}
