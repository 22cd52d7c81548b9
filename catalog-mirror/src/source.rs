//! Collaborator seams
//!
//! The core never touches storage itself. Reference data comes from a
//! [`ReferenceSource`], catalog rows from a [`RowSource`], and results go to a
//! [`RowSink`]; implementations decide the file formats.

use crate::error::MirrorResult;
use crate::record::ReferenceCollection;
use crate::row::CatalogRow;

pub trait ReferenceSource {
    /// Load every valid tri-lingual record
    ///
    /// Records missing a brand or model in any language must be excluded here.
    fn load(&self) -> MirrorResult<ReferenceCollection>;
}

pub trait RowSource {
    /// Read rows preserving both row order and column order
    fn read(&self) -> MirrorResult<Vec<CatalogRow>>;
}

pub trait RowSink {
    /// Write rows in the order given
    fn write(&self, rows: &[CatalogRow]) -> MirrorResult<()>;
}

impl ReferenceSource for ReferenceCollection {
    fn load(&self) -> MirrorResult<ReferenceCollection> {
        Ok(self.clone())
    }
}

impl RowSource for Vec<CatalogRow> {
    fn read(&self) -> MirrorResult<Vec<CatalogRow>> {
        Ok(self.clone())
    }
}
