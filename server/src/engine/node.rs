/*
 * This file is part of nsd.
 *
 * nsd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! The node data model: a slot in the table is either free, a file, or a
//! directory. A directory's payload is a fixed-capacity array of entries; a
//! free slot in that array is an `Option::None` rather than a sentinel id,
//! per the "sentinel returns -> sum type" design rule this crate follows
//! throughout.

/// A `(name, id)` pair living inside a directory's entry array.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub name: Box<str>,
    pub id: usize,
}

/// A directory's payload: a dense-by-id set of entries, bounded at creation
/// time by `max_dir_entries`. Iteration order is not meaningful.
#[derive(Debug, Clone)]
pub struct Directory {
    entries: Vec<Option<DirEntry>>,
}

impl Directory {
    pub fn new(max_dir_entries: usize) -> Self {
        Self {
            entries: vec![None; max_dir_entries],
        }
    }
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter().filter_map(|e| e.as_ref())
    }
    /// Linear scan for an entry with the given name.
    pub fn find_entry(&self, name: &str) -> Option<usize> {
        self.iter().find(|e| &*e.name == name).map(|e| e.id)
    }
    /// Insert into the first free slot. Fails if the array is full or the
    /// name is empty. Caller must have already verified `name` is unique.
    pub fn add_entry(&mut self, name: &str, id: usize) -> bool {
        if name.is_empty() {
            return false;
        }
        if let Some(slot) = self.entries.iter_mut().find(|e| e.is_none()) {
            *slot = Some(DirEntry {
                name: name.into(),
                id,
            });
            true
        } else {
            false
        }
    }
    /// Remove the entry whose child id is `id`. Fails if no such entry.
    pub fn remove_entry(&mut self, id: usize) -> bool {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|e| matches!(e, Some(entry) if entry.id == id))
        {
            *slot = None;
            true
        } else {
            false
        }
    }
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|e| e.is_none())
    }
}

/// The kind and payload of a node slot, bundled into one value so that both
/// change together under a single write-lock acquisition (invariant: every
/// mutation of a slot's kind/payload happens while its lock is held in write
/// mode).
#[derive(Debug, Clone)]
pub enum Node {
    /// a free slot: holds no resources
    None,
    /// an opaque file placeholder; no content I/O in this engine
    File,
    Directory(Directory),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::None => NodeKind::None,
            Node::File => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }
    pub fn is_none(&self) -> bool {
        matches!(self, Node::None)
    }
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(d) => Some(d),
            _ => None,
        }
    }
    pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Node::Directory(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    None,
    File,
    Directory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_add_find_remove() {
        let mut dir = Directory::new(4);
        assert!(dir.is_empty());
        assert!(dir.add_entry("a", 1));
        assert!(dir.add_entry("b", 2));
        assert_eq!(dir.find_entry("a"), Some(1));
        assert_eq!(dir.find_entry("b"), Some(2));
        assert_eq!(dir.find_entry("c"), None);
        assert!(!dir.is_empty());
        assert!(dir.remove_entry(1));
        assert_eq!(dir.find_entry("a"), None);
        assert!(!dir.remove_entry(1));
    }

    #[test]
    fn directory_rejects_empty_name_and_overflow() {
        let mut dir = Directory::new(1);
        assert!(!dir.add_entry("", 1));
        assert!(dir.add_entry("only", 1));
        assert!(!dir.add_entry("second", 2));
    }

    #[test]
    fn directory_unique_slot_reuse_after_remove() {
        let mut dir = Directory::new(1);
        assert!(dir.add_entry("a", 1));
        assert!(!dir.add_entry("b", 2));
        assert!(dir.remove_entry(1));
        assert!(dir.add_entry("b", 2));
        assert_eq!(dir.find_entry("b"), Some(2));
    }
}
