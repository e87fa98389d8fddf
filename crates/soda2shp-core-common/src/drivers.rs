//! Driver capability types shared by the registry and the output drivers.
//!
//! A driver describes one file format and whether `soda2shp` can inspect it
//! (info), read features from it, or write features to it.

/// Support status for a specific driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The operation is implemented.
    Supported,
    /// The operation is not supported by the driver.
    NotSupported,
    /// The operation is planned for future implementation.
    Planned,
}

impl SupportStatus {
    /// Returns `true` if the operation is fully supported and implemented.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    /// Returns `true` if the operation is supported or planned (i.e., not explicitly unsupported).
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self, SupportStatus::NotSupported)
    }

    /// Returns the string representation of this support status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
            SupportStatus::Planned => "Planned",
        }
    }
}

/// Capabilities of a format driver: inspecting a dataset's schema (info),
/// reading rows from it (read), and writing features to it (write).
#[derive(Debug, Clone, Copy)]
pub struct DriverCapabilities {
    /// Support status for listing a dataset's columns.
    pub info: SupportStatus,
    /// Support status for reading rows from this format.
    pub read: SupportStatus,
    /// Support status for writing features to this format.
    pub write: SupportStatus,
}

impl DriverCapabilities {
    /// Returns `true` if at least one operation is fully supported and implemented.
    #[must_use]
    pub fn has_supported_operation(&self) -> bool {
        self.info.is_supported() || self.read.is_supported() || self.write.is_supported()
    }
}

/// Format driver definition.
#[derive(Debug, Clone)]
pub struct Driver {
    /// Short name used on the command line (e.g. `"ESRI Shapefile"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes.
    pub long_name: &'static str,
    /// File extension written by this driver, without the leading dot.
    pub extension: &'static str,
    /// Operations supported by this driver.
    pub capabilities: DriverCapabilities,
}

impl Driver {
    /// Creates a new driver definition with specified capabilities.
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        extension: &'static str,
        info: SupportStatus,
        read: SupportStatus,
        write: SupportStatus,
    ) -> Self {
        Self {
            short_name,
            long_name,
            extension,
            capabilities: DriverCapabilities { info, read, write },
        }
    }
}
