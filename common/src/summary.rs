/// Counters describing what one or more mirror passes did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub bytes_copied: u64,
    pub files_copied: usize,
    pub files_unchanged: usize,
    pub directories_created: usize,
    pub directories_unchanged: usize,
    pub files_removed: usize,
    pub directories_removed: usize,
    /// Entries left alone because of a kind conflict or an unsupported kind.
    pub entries_skipped: usize,
    pub errors: usize,
}

impl Summary {
    /// True if the pass changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.files_copied == 0
            && self.directories_created == 0
            && self.files_removed == 0
            && self.directories_removed == 0
    }
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            bytes_copied: self.bytes_copied + other.bytes_copied,
            files_copied: self.files_copied + other.files_copied,
            files_unchanged: self.files_unchanged + other.files_unchanged,
            directories_created: self.directories_created + other.directories_created,
            directories_unchanged: self.directories_unchanged + other.directories_unchanged,
            files_removed: self.files_removed + other.files_removed,
            directories_removed: self.directories_removed + other.directories_removed,
            entries_skipped: self.entries_skipped + other.entries_skipped,
            errors: self.errors + other.errors,
        }
    }
}

impl std::ops::AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "bytes copied: {}\n\
            files copied: {}\n\
            files unchanged: {}\n\
            directories created: {}\n\
            directories unchanged: {}\n\
            files removed: {}\n\
            directories removed: {}\n\
            entries skipped: {}\n\
            errors: {}\n",
            bytesize::ByteSize(self.bytes_copied),
            self.files_copied,
            self.files_unchanged,
            self.directories_created,
            self.directories_unchanged,
            self.files_removed,
            self.directories_removed,
            self.entries_skipped,
            self.errors,
        )
    }
}
