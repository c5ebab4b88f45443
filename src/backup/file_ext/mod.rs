use std::sync::Arc;

/// Something that contributes a dotted suffix to an artifact file name.
pub trait FileExtProvider {
    fn file_ext(&self) -> Option<Arc<str>>;
}
