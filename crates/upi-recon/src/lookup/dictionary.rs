use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Ordered list of bank handles appended to a seed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuffixDictionary {
    entries: Vec<String>,
}

impl SuffixDictionary {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Line-delimited handles; blank lines are skipped.
    pub fn parse(contents: &str) -> Self {
        Self::from_entries(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty()),
        )
    }

    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Ok(Self::parse(&contents))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("suffix file missing at {}; upload data/mobile_suffixes.txt", .path.display())]
    Missing { path: PathBuf },
    #[error("suffix file at {} could not be read: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source of the suffix dictionary, loaded once per scan.
pub trait SuffixStore: Send + Sync {
    fn load(&self) -> Result<SuffixDictionary, DictionaryError>;
}

#[derive(Debug, Clone)]
pub struct FileSuffixStore {
    path: PathBuf,
}

impl FileSuffixStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SuffixStore for FileSuffixStore {
    fn load(&self) -> Result<SuffixDictionary, DictionaryError> {
        let file = std::fs::File::open(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                DictionaryError::Missing {
                    path: self.path.clone(),
                }
            } else {
                DictionaryError::Unreadable {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        SuffixDictionary::from_reader(file).map_err(|source| DictionaryError::Unreadable {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticSuffixStore {
    dictionary: SuffixDictionary,
}

impl StaticSuffixStore {
    pub fn new(dictionary: SuffixDictionary) -> Self {
        Self { dictionary }
    }
}

impl SuffixStore for StaticSuffixStore {
    fn load(&self) -> Result<SuffixDictionary, DictionaryError> {
        Ok(self.dictionary.clone())
    }
}
