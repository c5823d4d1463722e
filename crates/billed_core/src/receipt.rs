//! Receipt selection and extension checks.

use crate::config::ReceiptConfig;

/// A file picked by the user as proof of expense.
#[derive(Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    name: String,
    bytes: Vec<u8>,
}

impl ReceiptFile {
    /// Creates a receipt from its file name and contents.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// File name, without any directory part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-cased text after the last `.`, if any.
    ///
    /// ```
    /// use billed_core::ReceiptFile;
    ///
    /// assert_eq!(ReceiptFile::new("scan.JPG", vec![]).extension().as_deref(), Some("jpg"));
    /// assert_eq!(ReceiptFile::new("scan", vec![]).extension(), None);
    /// ```
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.name)
    }
}

impl std::fmt::Debug for ReceiptFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiptFile")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Extension allow-list applied to receipt selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptPolicy {
    allowed: Vec<String>,
}

impl ReceiptPolicy {
    /// Builds a policy from extensions, normalised to lower case without dots.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed: allowed
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a file with this name may be uploaded.
    pub fn accepts(&self, file_name: &str) -> bool {
        match extension_of(file_name) {
            Some(ext) => self.allowed.iter().any(|a| *a == ext),
            None => false,
        }
    }
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self::from(&ReceiptConfig::default())
    }
}

impl From<&ReceiptConfig> for ReceiptPolicy {
    fn from(config: &ReceiptConfig) -> Self {
        Self::new(&config.allowed_extensions)
    }
}

/// The form's single-selection file input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInput {
    value: String,
    files: Vec<ReceiptFile>,
}

impl FileInput {
    /// Displayed value, e.g. `C:\fakepath\test.jpg`. Empty when cleared.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Currently selected files (at most one).
    pub fn files(&self) -> &[ReceiptFile] {
        &self.files
    }

    /// The selected file, if any.
    pub fn file(&self) -> Option<&ReceiptFile> {
        self.files.first()
    }

    pub(crate) fn select(&mut self, value: String, file: ReceiptFile) {
        self.value = value;
        self.files = vec![file];
    }

    pub(crate) fn clear(&mut self) {
        self.value.clear();
        self.files.clear();
    }
}

/// Last path segment of an input value, splitting on both separators.
///
/// ```
/// use billed_core::file_name_from_value;
///
/// assert_eq!(file_name_from_value("C:\\fakepath\\test.jpg"), "test.jpg");
/// assert_eq!(file_name_from_value("/home/a/test.png"), "test.png");
/// ```
pub fn file_name_from_value(value: &str) -> &str {
    value.rsplit(&['\\', '/'][..]).next().unwrap_or(value)
}

fn extension_of(file_name: &str) -> Option<String> {
    let name = file_name_from_value(file_name);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
