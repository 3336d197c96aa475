use crate::domain::{FileType, Identifier, ResidueRange, Retrieved};
use crate::error::ProtfetchError;

/// A remote database that may hold a structure for an identifier.
pub trait StructureSource: Send + Sync {
    fn check_structure(&self, id: &Identifier) -> Result<bool, ProtfetchError>;

    /// Downloads the structure. If `filetype` is unavailable the source
    /// tries the other format and reports it in [`Retrieved::filetype`].
    fn get_structure(&self, id: &Identifier, filetype: FileType)
    -> Result<Retrieved, ProtfetchError>;
}

/// Sequence annotations used to locate signal peptides.
pub trait AnnotationClient: Send + Sync {
    fn signal_peptides(&self, id: &Identifier) -> Result<Vec<ResidueRange>, ProtfetchError>;
}

impl<T: StructureSource + ?Sized> StructureSource for &T {
    fn check_structure(&self, id: &Identifier) -> Result<bool, ProtfetchError> {
        (**self).check_structure(id)
    }

    fn get_structure(
        &self,
        id: &Identifier,
        filetype: FileType,
    ) -> Result<Retrieved, ProtfetchError> {
        (**self).get_structure(id, filetype)
    }
}

impl<T: AnnotationClient + ?Sized> AnnotationClient for &T {
    fn signal_peptides(&self, id: &Identifier) -> Result<Vec<ResidueRange>, ProtfetchError> {
        (**self).signal_peptides(id)
    }
}
