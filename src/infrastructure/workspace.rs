//! TOML workspace file backing the in-memory stores
//!
//! A workspace holds navigations, node records, registered elements and every
//! structure as preorder `{node, parent}` entries. Structures are rebuilt into
//! arenas on load and flattened again on save.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{FlatEntry, LinkedElement, Navigation, Node, StructureArena, StructureId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::memory::{
    MemoryElementCatalog, MemoryNavigationRegistry, MemoryNodeRepository, MemoryTreeStore,
};

/// One structure as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureEntries {
    pub id: StructureId,
    #[serde(default)]
    pub entries: Vec<FlatEntry>,
}

/// On-disk layout of a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceFile {
    pub navigations: Vec<Navigation>,
    pub nodes: Vec<Node>,
    pub elements: Vec<LinkedElement>,
    pub structures: Vec<StructureEntries>,
}

/// Loaded workspace: the stores plus where to write them back.
pub struct Workspace {
    path: Option<PathBuf>,
    pub tree: Arc<MemoryTreeStore>,
    pub nodes: Arc<MemoryNodeRepository>,
    pub navs: Arc<MemoryNavigationRegistry>,
    pub elements: Arc<MemoryElementCatalog>,
}

impl Workspace {
    /// Empty workspace that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tree: Arc::new(MemoryTreeStore::new()),
            nodes: Arc::new(MemoryNodeRepository::new()),
            navs: Arc::new(MemoryNavigationRegistry::new()),
            elements: Arc::new(MemoryElementCatalog::new()),
        }
    }

    /// Load the workspace at `path`; a missing file yields an empty workspace.
    pub fn open(path: &Path) -> InfraResult<Self> {
        if !path.exists() {
            debug!("open: {} does not exist, starting empty", path.display());
            let mut workspace = Self::in_memory();
            workspace.path = Some(path.to_path_buf());
            return Ok(workspace);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| InfraError::io(format!("read workspace {}", path.display()), e))?;
        let file: WorkspaceFile =
            toml::from_str(&content).map_err(|e| InfraError::workspace(path, e.to_string()))?;
        let workspace = Self::from_file(file, Some(path.to_path_buf()))?;
        info!(
            "open: loaded {} navigations from {}",
            workspace.navs.export().len(),
            path.display()
        );
        Ok(workspace)
    }

    /// Rebuild stores from a parsed file.
    pub fn from_file(file: WorkspaceFile, path: Option<PathBuf>) -> InfraResult<Self> {
        let label = path.clone().unwrap_or_else(|| PathBuf::from("<memory>"));

        let mut structures = BTreeMap::new();
        for structure in &file.structures {
            let arena = StructureArena::from_entries(&structure.entries).map_err(|e| {
                InfraError::workspace(&label, format!("structure {}: {}", structure.id, e))
            })?;
            structures.insert(structure.id, arena);
        }
        for nav in &file.navigations {
            if !structures.contains_key(&nav.structure_id) {
                return Err(InfraError::workspace(
                    &label,
                    format!(
                        "navigation '{}' references missing structure {}",
                        nav.handle, nav.structure_id
                    ),
                ));
            }
        }

        Ok(Self {
            path,
            tree: Arc::new(MemoryTreeStore::from_structures(structures)),
            nodes: Arc::new(MemoryNodeRepository::from_nodes(file.nodes)),
            navs: Arc::new(MemoryNavigationRegistry::from_navigations(file.navigations)),
            elements: Arc::new(MemoryElementCatalog::from_elements(file.elements)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current state of every store.
    pub fn snapshot(&self) -> WorkspaceFile {
        WorkspaceFile {
            navigations: self.navs.export(),
            nodes: self.nodes.export(),
            elements: self.elements.export(),
            structures: self
                .tree
                .export()
                .into_iter()
                .map(|(id, entries)| StructureEntries { id, entries })
                .collect(),
        }
    }

    /// Write the workspace back to its file. In-memory workspaces are a no-op.
    pub fn save(&self) -> InfraResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let content = toml::to_string_pretty(&self.snapshot())
            .map_err(|e| InfraError::workspace(path, e.to_string()))?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
        }
        fs::write(path, content)
            .map_err(|e| InfraError::io(format!("write workspace {}", path.display()), e))?;
        debug!("save: wrote {}", path.display());
        Ok(())
    }
}
