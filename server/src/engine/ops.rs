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

//! The five namespace operations: `create`, `delete`, `lookup`, `move_node`
//! and `print_tree`. Each one resolves whatever it needs through
//! [`crate::engine::lock`], mutates under the locks it is still holding, and
//! lets [`AcquiredLocks`]'s `Drop` release everything in one LIFO unwind --
//! there is no success path in this module that releases a lock early and
//! re-acquires it later.

use crate::engine::{
    error::{FsError, FsResult},
    lock::{self, AcquiredLocks},
    node::{Node, NodeKind},
    path,
    table::{LockMode, NodeTable, ROOT},
};

/// Create a new file or (empty) directory at `path`. The parent directory
/// must already exist; `path`'s final component must not.
pub fn create(table: &NodeTable, path_str: &str, kind: NodeKind) -> FsResult<usize> {
    let (mut acquired, parent_id, child_name) = lock::resolve_parent(table, path_str, LockMode::Write)?;
    if child_name.is_empty() {
        return Err(FsError::CouldntAddEntry);
    }
    let parent_dir = acquired
        .node_of(parent_id)
        .and_then(Node::as_directory)
        .ok_or(FsError::ParentNotDir)?;
    if parent_dir.find_entry(&child_name).is_some() {
        return Err(FsError::FileAlreadyExists);
    }

    let new_id = table.allocate(kind).ok_or(FsError::CouldntAllocateInode)?;
    let parent_dir = acquired
        .node_of_mut(parent_id)
        .and_then(Node::as_directory_mut)
        .expect("checked above");
    if !parent_dir.add_entry(&child_name, new_id) {
        // roll back the allocation: nobody else can have observed `new_id`
        // since it was never linked into any directory.
        table.release(new_id);
        return Err(FsError::CouldntAddEntry);
    }
    Ok(new_id)
}

/// Remove an empty file or directory at `path`.
pub fn delete(table: &NodeTable, path_str: &str) -> FsResult<()> {
    let (mut acquired, parent_id, child_name) = lock::resolve_parent(table, path_str, LockMode::Write)?;
    let child_id = {
        let parent_dir = acquired
            .node_of(parent_id)
            .and_then(Node::as_directory)
            .ok_or(FsError::ParentNotDir)?;
        parent_dir.find_entry(&child_name).ok_or(FsError::DoesntExistInDir)?
    };
    acquired.acquire(child_id, LockMode::Write);

    if let Some(dir) = acquired.node_of(child_id).and_then(Node::as_directory) {
        if !dir.is_empty() {
            return Err(FsError::DirNotEmpty);
        }
    }

    let parent_dir = acquired
        .node_of_mut(parent_id)
        .and_then(Node::as_directory_mut)
        .expect("checked above");
    if !parent_dir.remove_entry(child_id) {
        return Err(FsError::FailedRemoveFromDir);
    }

    let child_node = acquired.node_of_mut(child_id).expect("locked above");
    *child_node = Node::None;
    Ok(())
}

/// What `lookup` reports about a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    File,
    Directory(Vec<String>),
}

/// Resolve `path` and report its kind. For a directory, also snapshots the
/// names of its current entries -- the snapshot is a copy, so it remains
/// valid after the traversal's locks are released on return.
pub fn lookup(table: &NodeTable, path_str: &str) -> FsResult<Lookup> {
    let (acquired, id) = lock::resolve(table, path_str, LockMode::Read)?;
    let result = match acquired.node_of(id).expect("just resolved") {
        Node::File => Lookup::File,
        Node::Directory(dir) => Lookup::Directory(dir.iter().map(|e| e.name.to_string()).collect()),
        Node::None => unreachable!("resolve never returns a free slot's id"),
    };
    drop(acquired);
    Ok(result)
}

/// Move (and optionally rename) the node at `src` to `dst`.
///
/// Two independent chains of ancestors must be locked for this -- one down
/// to `src`'s parent, one down to `dst`'s parent -- and a second concurrent
/// `move_node` may be resolving the same two paths in the opposite roles.
/// To avoid the A-locks-B/B-locks-A cycle that would otherwise result, both
/// calls order their chain acquisitions by the same key: parent depth first,
/// then (for two parents at equal depth) the parent's id as observed by a
/// short, non-retaining probe taken before either chain is locked. Every
/// thread computes the same key from the same paths, so every thread picks
/// the same order.
pub fn move_node(table: &NodeTable, src: &str, dst: &str) -> FsResult<()> {
    if path::is_same_or_descendant(src, dst) {
        return Err(FsError::MoveToItself);
    }

    let (sparent_path, schild_name, _) = path::split(src);
    let (dparent_path, dchild_name, _) = path::split(dst);
    if dchild_name.is_empty() {
        return Err(FsError::CouldntAddEntry);
    }

    let s_key = (path::components(&sparent_path).len(), lock::peek(table, &sparent_path)?);
    let d_key = (path::components(&dparent_path).len(), lock::peek(table, &dparent_path)?);

    // both traversals below lock their target in write mode, so the coarse
    // lock (under a `GlobalMutex`/`GlobalRwLock` strategy) is taken once,
    // here, in write mode -- never re-requested per traversal or per slot.
    let mut acquired = AcquiredLocks::new(table, LockMode::Write);
    let (sparent_id, dparent_id) = if s_key <= d_key {
        let s = lock::resolve_into(table, &mut acquired, &sparent_path, LockMode::Write)?;
        let d = lock::resolve_into(table, &mut acquired, &dparent_path, LockMode::Write)?;
        (s, d)
    } else {
        let d = lock::resolve_into(table, &mut acquired, &dparent_path, LockMode::Write)?;
        let s = lock::resolve_into(table, &mut acquired, &sparent_path, LockMode::Write)?;
        (s, d)
    };

    let child_id = {
        let sparent_dir = acquired
            .node_of(sparent_id)
            .and_then(Node::as_directory)
            .ok_or(FsError::ParentNotDir)?;
        sparent_dir.find_entry(&schild_name).ok_or(FsError::FileNotFound)?
    };
    if !acquired.contains(child_id) {
        acquired.acquire(child_id, LockMode::Write);
    }

    {
        let dparent_dir = acquired
            .node_of(dparent_id)
            .and_then(Node::as_directory)
            .ok_or(FsError::ParentNotDir)?;
        if dparent_dir.find_entry(&dchild_name).is_some() {
            return Err(FsError::FileAlreadyExists);
        }
    }

    let sparent_dir = acquired
        .node_of_mut(sparent_id)
        .and_then(Node::as_directory_mut)
        .expect("checked above");
    if !sparent_dir.remove_entry(child_id) {
        return Err(FsError::FailedRemoveFromDir);
    }

    let dparent_dir = acquired
        .node_of_mut(dparent_id)
        .and_then(Node::as_directory_mut)
        .expect("checked above");
    if !dparent_dir.add_entry(&dchild_name, child_id) {
        // put it back where it came from -- the source slot is still ours,
        // still locked, and its name is still free in the source directory.
        let sparent_dir = acquired
            .node_of_mut(sparent_id)
            .and_then(Node::as_directory_mut)
            .expect("checked above");
        sparent_dir.add_entry(&schild_name, child_id);
        return Err(FsError::CouldntAddEntry);
    }
    Ok(())
}

/// Render the whole tree as an indented listing. The caller is responsible
/// for ensuring no concurrent mutation is in flight -- unlike the other
/// operations, this one does not hold a consistent set of locks across the
/// whole walk, only ever one slot's lock at a time, so a tree being mutated
/// underneath it can produce an inconsistent (though never corrupted)
/// rendering.
pub fn print_tree(table: &NodeTable) -> String {
    let mut out = String::new();
    print_rec(table, ROOT, "/", 0, &mut out);
    out
}

fn print_rec(table: &NodeTable, id: usize, name: &str, depth: usize, out: &mut String) {
    use std::fmt::Write;
    let guard = table.lock(id, LockMode::Read);
    let _ = writeln!(out, "{}{}", "  ".repeat(depth), name);
    if let Some(dir) = guard.node().as_directory() {
        let mut entries: Vec<_> = dir.iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let entries: Vec<(String, usize)> = entries.into_iter().map(|e| (e.name.to_string(), e.id)).collect();
        drop(guard);
        for (child_name, child_id) in entries {
            print_rec(table, child_id, &child_name, depth + 1, out);
        }
    }
}
