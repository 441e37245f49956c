use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use certindex::config::ScannerConfig;
use certindex::{Config, Registry, RegistryStore, Scanner};

/// Temporary customer folder tree plus an isolated data directory.
pub struct TestHarness {
    pub temp_dir: TempDir,
    pub config: Config,
}

impl TestHarness {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let harness = Self {
            temp_dir,
            config: Config::default(),
        };
        std::fs::create_dir_all(harness.base())?;
        Ok(harness)
    }

    /// Folder whose subdirectories are customers.
    pub fn base(&self) -> PathBuf {
        self.temp_dir.path().join("clientes")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Create `<base>/<customer>/<relative>` with placeholder content.
    pub fn add_file(&self, customer: &str, relative: &str) -> Result<PathBuf> {
        let file_path = self.base().join(customer).join(relative);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, format!("certificate {}", relative))?;
        Ok(file_path)
    }

    pub fn add_customer(&self, customer: &str) -> Result<PathBuf> {
        let dir = self.base().join(customer);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn scanner(&self) -> Scanner {
        Scanner::new(self.scanner_config())
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        self.config.scanner.clone()
    }

    pub fn store(&self) -> RegistryStore {
        RegistryStore::in_dir(&self.data_dir())
    }

    pub fn scan(&self) -> Result<Registry> {
        Ok(self.scanner().scan(&self.base())?.registry)
    }

    /// A small notary office: two persons, one company.
    pub fn with_sample_tree() -> Result<Self> {
        let harness = Self::new()?;
        harness.add_file("Ana Perez", "certificado_bps_2024-11-15.pdf")?;
        harness.add_file("Ana Perez", "ERROR_certificado_bps_2024.pdf")?;
        harness.add_file("Ana Perez", "dgi/constancia DGI 15-11-2023.pdf")?;
        harness.add_file("Ana Perez", "notas.xlsx")?;
        harness.add_file("Juan Gomez", "BPS_20240301.pdf")?;
        harness.add_file("Juan Gomez", "escaneo.jpg")?;
        harness.add_file("Transportes del Sur S.A.", "abitab firma 2023-05-02.pdf")?;
        harness.add_file("Transportes del Sur S.A.", "ERROR msp 2022-01-10.docx")?;
        Ok(harness)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}
