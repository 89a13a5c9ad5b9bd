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

//! Hand-over-hand lock-coupling traversal.
//!
//! A traversal walks a path from the root down, taking each directory's lock
//! before releasing none of the locks behind it: every ancestor visited stays
//! held until the caller commits or aborts the operation. This is the
//! "retained-prefix" variant -- it trades a little concurrency (a write deep
//! in a tree briefly blocks an unrelated read of one of its ancestors) for a
//! simple invariant: nothing about the path from root to target can change
//! between the moment traversal ends and the moment the caller mutates it.
//!
//! A single operation may need to resolve more than one path against the
//! same [`NodeTable`] (`move` resolves both endpoints). [`AcquiredLocks`]
//! tracks every id the current operation already holds, so resolving a
//! second path that shares a prefix with the first does not try to lock the
//! same slot twice -- which would at best be redundant and at worst
//! self-deadlock a single-writer-preferring lock.

use crate::engine::{
    error::{FsError, FsResult},
    node::Node,
    path,
    table::{CoarseGuard, LockMode, NodeTable, SlotGuard, ROOT},
};

/// Every lock the current operation holds, in acquisition order. Dropping
/// this releases them in strict LIFO order -- last acquired, first
/// released -- regardless of the order Rust would otherwise drop a `Vec`'s
/// elements in.
///
/// Under a coarse [`crate::engine::config::LockStrategy`], `coarse` is the
/// table-wide lock for this operation, taken exactly once by [`Self::new`]
/// and held until the whole `AcquiredLocks` is dropped. Per-slot locks taken
/// afterward via [`Self::acquire`] never touch it again -- re-requesting it
/// per slot would deadlock the very first traversal past depth 0, since a
/// hand-over-hand walk retains every ancestor's lock instead of releasing it
/// (spec.md §4.4), and `parking_lot::RwLock` is not reentrant.
pub struct AcquiredLocks<'a> {
    table: &'a NodeTable,
    coarse: CoarseGuard<'a>,
    held: Vec<(usize, SlotGuard<'a>)>,
}

impl<'a> AcquiredLocks<'a> {
    /// `coarse_mode` is the strongest mode any lock taken during this
    /// operation's lifetime will need -- `Write` for any operation that
    /// mutates (`create`/`delete`/`move_node`), `Read` for one that only
    /// reads (`lookup`). Every one of this crate's operations requests at
    /// most one coarse mode for its entire duration, so this is decided once
    /// up front rather than re-derived per lock.
    pub fn new(table: &'a NodeTable, coarse_mode: LockMode) -> Self {
        Self {
            table,
            coarse: table.lock_coarse(coarse_mode),
            held: Vec::new(),
        }
    }

    pub fn contains(&self, id: usize) -> bool {
        self.held.iter().any(|(i, _)| *i == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.held.iter().map(|(id, _)| *id)
    }

    /// Lock `id` directly (not by walking a path) and retain it. Used when
    /// an operation already knows a child's id from its parent's directory
    /// entries and needs to hold the child's own lock too -- `delete` and
    /// `move` both do this.
    pub fn acquire(&mut self, id: usize, mode: LockMode) {
        let guard = self.table.lock(id, mode);
        self.held.push((id, guard));
    }

    pub fn node_of(&self, id: usize) -> Option<&Node> {
        self.held.iter().find(|(i, _)| *i == id).map(|(_, g)| g.node())
    }

    pub fn node_of_mut(&mut self, id: usize) -> Option<&mut Node> {
        self.held.iter_mut().find(|(i, _)| *i == id).and_then(|(_, g)| g.node_mut())
    }
}

impl<'a> Drop for AcquiredLocks<'a> {
    fn drop(&mut self) {
        while self.held.pop().is_some() {}
    }
}

/// Resolve `path` against `table`, extending `acquired` with whatever new
/// locks the walk needs (skipping any id `acquired` already holds). The
/// final path component is locked in `final_mode`; every ancestor along the
/// way is locked for read. Returns the resolved id.
pub fn resolve_into<'a>(
    table: &'a NodeTable,
    acquired: &mut AcquiredLocks<'a>,
    path: &str,
    final_mode: LockMode,
) -> FsResult<usize> {
    let comps = path::components(path);
    if !acquired.contains(ROOT) {
        acquired.acquire(ROOT, if comps.is_empty() { final_mode } else { LockMode::Read });
    }
    let mut current = ROOT;
    for (i, comp) in comps.iter().enumerate() {
        let is_last = i == comps.len() - 1;
        let next_id = {
            let dir = acquired
                .node_of(current)
                .and_then(Node::as_directory)
                .ok_or(FsError::ParentNotDir)?;
            dir.find_entry(comp).ok_or(FsError::FileNotFound)?
        };
        if !acquired.contains(next_id) {
            let mode = if is_last { final_mode } else { LockMode::Read };
            acquired.acquire(next_id, mode);
        }
        current = next_id;
    }
    Ok(current)
}

/// Resolve `path` from scratch, retaining every lock along the way. The
/// coarse lock (if any) is taken once, in `final_mode` -- every caller of
/// `resolve`/`resolve_parent` that later acquires any additional direct lock
/// on this same `AcquiredLocks` (e.g. `delete`'s child lock) does so in that
/// same mode or does not acquire again at all.
pub fn resolve<'a>(table: &'a NodeTable, path: &str, final_mode: LockMode) -> FsResult<(AcquiredLocks<'a>, usize)> {
    let mut acquired = AcquiredLocks::new(table, final_mode);
    let id = resolve_into(table, &mut acquired, path, final_mode)?;
    Ok((acquired, id))
}

/// Resolve `path`'s parent directory (locked in `parent_mode`) and return it
/// alongside the final component's name, without resolving the final
/// component itself -- used by `create`, which names a child that does not
/// exist yet.
pub fn resolve_parent<'a>(
    table: &'a NodeTable,
    path: &str,
    parent_mode: LockMode,
) -> FsResult<(AcquiredLocks<'a>, usize, String)> {
    let (parent_path, child_name, _depth) = path::split(path);
    let (acquired, parent_id) = resolve(table, &parent_path, parent_mode)?;
    Ok((acquired, parent_id, child_name))
}

/// A short-lived, non-retaining walk used only to read the current shape of
/// the tree (e.g. to order two chains of a `move` before locking either).
/// Every lock taken here is released again before the next step, so the
/// answer is a snapshot that may already be stale by the time the caller
/// acts on it -- callers must not treat this as a substitute for a real
/// `resolve`.
pub fn peek(table: &NodeTable, path: &str) -> FsResult<usize> {
    let comps = path::components(path);
    let mut current = ROOT;
    for comp in &comps {
        let next_id = {
            let guard = table.lock(current, LockMode::Read);
            let dir = guard.node().as_directory().ok_or(FsError::ParentNotDir)?;
            dir.find_entry(comp).ok_or(FsError::FileNotFound)?
        };
        current = next_id;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{config::EngineConfig, node::NodeKind};

    fn table_with_dir(name: &str) -> NodeTable {
        let table = NodeTable::new(EngineConfig::default());
        let id = table.allocate(NodeKind::Directory).unwrap();
        let mut root = table.lock(ROOT, LockMode::Write);
        root.node_mut().unwrap().as_directory_mut().unwrap().add_entry(name, id);
        table
    }

    #[test]
    fn resolve_walks_into_nested_directory() {
        let table = table_with_dir("a");
        let (_locks, id) = resolve(&table, "/a", LockMode::Read).unwrap();
        assert_ne!(id, ROOT);
    }

    #[test]
    fn resolve_missing_component_is_not_found() {
        let table = table_with_dir("a");
        assert_eq!(resolve(&table, "/missing", LockMode::Read).unwrap_err(), FsError::FileNotFound);
    }

    #[test]
    fn overlapping_resolves_do_not_relock_shared_ancestor() {
        let table = table_with_dir("a");
        let mut acquired = AcquiredLocks::new(&table, LockMode::Read);
        resolve_into(&table, &mut acquired, "/a", LockMode::Read).unwrap();
        assert!(acquired.contains(ROOT));
        // resolving root again must not attempt a second acquisition of id 0
        resolve_into(&table, &mut acquired, "", LockMode::Read).unwrap();
        assert_eq!(acquired.ids().filter(|id| *id == ROOT).count(), 1);
    }

    #[test]
    fn resolve_parent_splits_off_final_component() {
        let table = table_with_dir("a");
        let (_locks, parent_id, child_name) = resolve_parent(&table, "/a/b", LockMode::Write).unwrap();
        assert_ne!(parent_id, ROOT);
        assert_eq!(child_name, "b");
    }
}
