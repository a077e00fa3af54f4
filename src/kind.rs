//! Resource kind tags for native objects.
//!
//! Every handle wraps exactly one native resource type, identified by a
//! [`VariantKind`]. The enumeration is closed: the set of kinds is fixed by
//! the native library's catalogue, and the discriminants are stable so host
//! runtimes can export them as integer constants.

use std::fmt;

/// Identifies which native resource type a handle wraps.
///
/// Discriminants are part of the host-facing contract and never change.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// A repository.
    Repository = 0,
    /// A commit object.
    Commit = 1,
    /// A tree object.
    Tree = 2,
    /// A single entry inside a tree.
    TreeEntry = 3,
    /// A blob object.
    Blob = 4,
    /// A revision walker.
    Revwalk = 5,
    /// An in-memory tree builder.
    Treebuilder = 6,
    /// A reference (branch, tag ref, symbolic ref).
    Reference = 7,
    /// An iterator over references.
    ReferenceIterator = 8,
    /// A configuration accessor.
    Config = 9,
    /// An iterator over configuration entries.
    ConfigIterator = 10,
    /// A generic object (commit, tree, blob or tag seen polymorphically).
    Object = 11,
    /// An index (staging area).
    Index = 12,
    /// An object database.
    Odb = 13,
    /// A reference database.
    Refdb = 14,
    /// A status list.
    StatusList = 15,
    /// An iterator over branches.
    BranchIterator = 16,
    /// An annotated tag object.
    Tag = 17,
    /// A credential object.
    Cred = 18,
    /// A network transport.
    Transport = 19,
    /// A remote.
    Remote = 20,
    /// A diff between two snapshots.
    Diff = 21,
    /// The result of a merge computation.
    MergeResult = 22,
    /// A commit annotated for merge/rebase operations.
    AnnotatedCommit = 23,
    /// A compiled pathspec.
    Pathspec = 24,
    /// The match list produced by a pathspec query.
    PathspecMatchList = 25,
    /// A patch (textual diff of a single delta).
    Patch = 26,
    /// A hunk within a diff.
    DiffHunk = 27,
    /// A growable buffer owned by the native library.
    Buf = 28,
    /// An ordered list of content filters.
    FilterList = 29,
    /// The source description passed to a filter.
    FilterSource = 30,
    /// A single line within a diff.
    DiffLine = 31,
    /// An iterator over index conflicts.
    IndexConflictIterator = 32,
    /// A smart-protocol subtransport.
    SmartSubtransport = 33,
    /// A note attached to an object.
    Note = 34,
    /// An iterator over notes.
    NoteIterator = 35,
    /// A stream into the object database.
    OdbStream = 36,
    /// An object read back from the object database.
    OdbObject = 37,
    /// A packfile writer for the object database.
    OdbWritepack = 38,
    /// A host-provided object-database backend (composite kind).
    OdbBackend = 39,
    /// A reference log.
    Reflog = 40,
    /// A single reference-log entry.
    ReflogEntry = 41,
    /// A blame computation.
    Blame = 42,
    /// A packbuilder.
    Packbuilder = 43,
    /// A submodule.
    Submodule = 44,
    /// A push operation.
    Push = 45,
    /// A host-provided content filter (composite kind).
    Filter = 46,
}

impl VariantKind {
    /// Number of kinds in the catalogue.
    pub const COUNT: usize = 47;

    /// Every kind, in discriminant order.
    pub const ALL: [VariantKind; Self::COUNT] = [
        VariantKind::Repository,
        VariantKind::Commit,
        VariantKind::Tree,
        VariantKind::TreeEntry,
        VariantKind::Blob,
        VariantKind::Revwalk,
        VariantKind::Treebuilder,
        VariantKind::Reference,
        VariantKind::ReferenceIterator,
        VariantKind::Config,
        VariantKind::ConfigIterator,
        VariantKind::Object,
        VariantKind::Index,
        VariantKind::Odb,
        VariantKind::Refdb,
        VariantKind::StatusList,
        VariantKind::BranchIterator,
        VariantKind::Tag,
        VariantKind::Cred,
        VariantKind::Transport,
        VariantKind::Remote,
        VariantKind::Diff,
        VariantKind::MergeResult,
        VariantKind::AnnotatedCommit,
        VariantKind::Pathspec,
        VariantKind::PathspecMatchList,
        VariantKind::Patch,
        VariantKind::DiffHunk,
        VariantKind::Buf,
        VariantKind::FilterList,
        VariantKind::FilterSource,
        VariantKind::DiffLine,
        VariantKind::IndexConflictIterator,
        VariantKind::SmartSubtransport,
        VariantKind::Note,
        VariantKind::NoteIterator,
        VariantKind::OdbStream,
        VariantKind::OdbObject,
        VariantKind::OdbWritepack,
        VariantKind::OdbBackend,
        VariantKind::Reflog,
        VariantKind::ReflogEntry,
        VariantKind::Blame,
        VariantKind::Packbuilder,
        VariantKind::Submodule,
        VariantKind::Push,
        VariantKind::Filter,
    ];

    /// Recover a kind from its host-facing integer constant.
    ///
    /// Returns `None` for values outside the catalogue.
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Host-facing integer constant for this kind.
    #[inline]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// True for kinds whose handles additionally own a callback adapter.
    #[inline]
    pub const fn is_composite(self) -> bool {
        matches!(self, VariantKind::Filter | VariantKind::OdbBackend)
    }

    /// Stable lowercase name, as exposed to the host runtime.
    pub const fn as_str(self) -> &'static str {
        match self {
            VariantKind::Repository => "repository",
            VariantKind::Commit => "commit",
            VariantKind::Tree => "tree",
            VariantKind::TreeEntry => "tree_entry",
            VariantKind::Blob => "blob",
            VariantKind::Revwalk => "revwalk",
            VariantKind::Treebuilder => "treebuilder",
            VariantKind::Reference => "reference",
            VariantKind::ReferenceIterator => "reference_iterator",
            VariantKind::Config => "config",
            VariantKind::ConfigIterator => "config_iterator",
            VariantKind::Object => "object",
            VariantKind::Index => "index",
            VariantKind::Odb => "odb",
            VariantKind::Refdb => "refdb",
            VariantKind::StatusList => "status_list",
            VariantKind::BranchIterator => "branch_iterator",
            VariantKind::Tag => "tag",
            VariantKind::Cred => "cred",
            VariantKind::Transport => "transport",
            VariantKind::Remote => "remote",
            VariantKind::Diff => "diff",
            VariantKind::MergeResult => "merge_result",
            VariantKind::AnnotatedCommit => "annotated_commit",
            VariantKind::Pathspec => "pathspec",
            VariantKind::PathspecMatchList => "pathspec_match_list",
            VariantKind::Patch => "patch",
            VariantKind::DiffHunk => "diff_hunk",
            VariantKind::Buf => "buf",
            VariantKind::FilterList => "filter_list",
            VariantKind::FilterSource => "filter_source",
            VariantKind::DiffLine => "diff_line",
            VariantKind::IndexConflictIterator => "index_conflict_iterator",
            VariantKind::SmartSubtransport => "smart_subtransport",
            VariantKind::Note => "note",
            VariantKind::NoteIterator => "note_iterator",
            VariantKind::OdbStream => "odb_stream",
            VariantKind::OdbObject => "odb_object",
            VariantKind::OdbWritepack => "odb_writepack",
            VariantKind::OdbBackend => "odb_backend",
            VariantKind::Reflog => "reflog",
            VariantKind::ReflogEntry => "reflog_entry",
            VariantKind::Blame => "blame",
            VariantKind::Packbuilder => "packbuilder",
            VariantKind::Submodule => "submodule",
            VariantKind::Push => "push",
            VariantKind::Filter => "filter",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip_covers_catalogue() {
        for kind in VariantKind::ALL {
            assert_eq!(VariantKind::from_raw(kind.as_raw()), Some(kind));
        }
        assert_eq!(VariantKind::from_raw(VariantKind::COUNT as u32), None);
        assert_eq!(VariantKind::from_raw(u32::MAX), None);
    }

    #[test]
    fn discriminants_are_dense() {
        for (index, kind) in VariantKind::ALL.iter().enumerate() {
            assert_eq!(kind.as_raw() as usize, index);
        }
    }

    #[test]
    fn only_filter_and_odb_backend_are_composite() {
        let composite: Vec<_> = VariantKind::ALL
            .iter()
            .filter(|k| k.is_composite())
            .collect();
        assert_eq!(composite, [&VariantKind::OdbBackend, &VariantKind::Filter]);
    }
}
