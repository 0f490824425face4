/// Identifier of a loaded source, assigned by the loader in load order.
///
/// A `FileId` is an index into the loader's origin table; it is stable for
/// the lifetime of a compilation and cheap to copy into every AST node and
/// diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
