// YAML persistence for moderation lists.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::document::ListDocument;
use crate::error::ModlistError;
use crate::list::ModerationList;
use crate::platform::PlatformRegistry;

const DOCUMENT_START: &str = "---\n";

impl ModerationList {
    /// Parse a list from YAML text.
    pub fn from_yaml(text: &str, registry: PlatformRegistry) -> Result<Self, ModlistError> {
        let doc: ListDocument = serde_yaml::from_str(text)?;
        ModerationList::from_document(&doc, registry)
    }

    /// Serialize as a single explicit YAML document.
    pub fn to_yaml(&self) -> Result<String, ModlistError> {
        let body = serde_yaml::to_string(&self.as_document())?;
        Ok(format!("{DOCUMENT_START}{body}"))
    }

    /// Load from a file. A missing file is an error; there is no partial load.
    pub fn load(path: &Path, registry: PlatformRegistry) -> Result<Self, ModlistError> {
        let text = fs::read_to_string(path).map_err(|e| ModlistError::io(path, e))?;
        let list = Self::from_yaml(&text, registry)?;
        info!(
            path = %path.display(),
            blocks = list.blocks().len(),
            trusts = list.trusts().len(),
            recommends = list.recommends().len(),
            "loaded moderation list"
        );
        Ok(list)
    }

    pub fn save(&self, path: &Path) -> Result<(), ModlistError> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ModlistError::io(parent, e))?;
        }
        fs::write(path, yaml).map_err(|e| ModlistError::io(path, e))?;
        info!(path = %path.display(), blocks = self.blocks().len(), "saved moderation list");
        Ok(())
    }
}
