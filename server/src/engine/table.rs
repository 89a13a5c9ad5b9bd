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

//! The node table: a fixed-capacity array of node slots, each behind its own
//! reader/writer lock (or, under a coarser [`LockStrategy`], gated by one
//! table-wide lock as well). This is an explicit owned handle -- never
//! global/static state -- so a caller can run several independent tables
//! side by side (tests do exactly that) and `Arc` it for sharing across
//! threads.

use {
    crate::engine::{
        config::{EngineConfig, LockStrategy},
        node::{Directory, Node, NodeKind},
    },
    parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const ROOT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Read,
    Write,
}

/// The table-wide lock a coarse [`LockStrategy`] gates every slot access
/// behind. Absent entirely under `PerNode`.
enum Coarse {
    None,
    Lock(RwLock<()>),
}

/// The guard on the table-wide lock. Acquired exactly **once** per operation
/// by [`crate::engine::lock::AcquiredLocks::new`] and held for that
/// operation's whole lifetime -- never per slot. A hand-over-hand traversal
/// retains every ancestor's slot lock until commit (spec.md §4.4), so a
/// scheme that re-requested the coarse lock on every individual slot lock
/// would have the same thread ask `parking_lot::RwLock` for a second
/// (non-reentrant) guard on its very first multi-level traversal -- a
/// guaranteed self-deadlock, not a race. Keying the coarse acquisition to the
/// operation instead of the slot closes that off.
pub enum CoarseGuard<'a> {
    None,
    Read(RwLockReadGuard<'a, ()>),
    Write(RwLockWriteGuard<'a, ()>),
}

/// A lock held on a single node slot, retained by the caller for as long as
/// the traversal or operation needs it -- this crate never releases a lock
/// early and re-acquires it, since that reopens exactly the race the
/// hand-over-hand protocol exists to close.
pub enum SlotGuard<'a> {
    Read(RwLockReadGuard<'a, Node>),
    Write(RwLockWriteGuard<'a, Node>),
}

impl<'a> SlotGuard<'a> {
    pub fn node(&self) -> &Node {
        match self {
            Self::Read(g) => g,
            Self::Write(g) => g,
        }
    }

    /// `None` if this guard was taken in read mode.
    pub fn node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Write(g) => Some(g),
            Self::Read(..) => None,
        }
    }
}

struct Slot {
    node: RwLock<Node>,
}

pub struct NodeTable {
    slots: Vec<Slot>,
    coarse: Coarse,
    config: EngineConfig,
}

impl NodeTable {
    pub fn new(config: EngineConfig) -> Self {
        let slots = (0..config.inode_table_size)
            .map(|_| Slot {
                node: RwLock::new(Node::None),
            })
            .collect::<Vec<_>>();
        let coarse = match config.lock_strategy {
            LockStrategy::PerNode => Coarse::None,
            LockStrategy::GlobalMutex | LockStrategy::GlobalRwLock => Coarse::Lock(RwLock::new(())),
        };
        let table = Self { slots, coarse, config };
        // id 0 is always the root directory (invariant 1)
        *table.slots[ROOT].node.write() = Node::Directory(Directory::new(config.max_dir_entries));
        table
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Acquire a lock on a single slot's node data. Panics if `id` is out of
    /// range -- callers only ever lock ids they resolved from a prior lookup
    /// or allocation within this same table.
    ///
    /// This touches only the per-slot lock -- never the table-wide coarse
    /// lock a `GlobalMutex`/`GlobalRwLock` strategy installs. An operation
    /// that needs the coarse lock takes it once, up front, via
    /// [`NodeTable::lock_coarse`] (see [`crate::engine::lock::AcquiredLocks`]);
    /// by the time it calls this method for any slot, it already holds
    /// whatever table-wide exclusion it needs.
    pub fn lock(&self, id: usize, mode: LockMode) -> SlotGuard<'_> {
        let node_lock = &self.slots[id].node;
        match mode {
            LockMode::Read => SlotGuard::Read(node_lock.read()),
            LockMode::Write => SlotGuard::Write(node_lock.write()),
        }
    }

    /// Acquire the table-wide coarse lock in `mode`, honoring the table's
    /// [`LockStrategy`]. A `PerNode` table installs no coarse lock and
    /// returns `CoarseGuard::None` immediately. `GlobalMutex` always takes
    /// its single lock in write mode regardless of `mode`, since a plain
    /// mutex has no concept of concurrent readers.
    ///
    /// Call this **once** per operation, not once per slot -- see
    /// [`CoarseGuard`]'s documentation for why a per-slot acquisition
    /// self-deadlocks.
    pub fn lock_coarse(&self, mode: LockMode) -> CoarseGuard<'_> {
        match (&self.coarse, self.config.lock_strategy, mode) {
            (Coarse::None, ..) => CoarseGuard::None,
            (Coarse::Lock(l), LockStrategy::GlobalMutex, _) => CoarseGuard::Write(l.write()),
            (Coarse::Lock(l), LockStrategy::GlobalRwLock, LockMode::Read) => CoarseGuard::Read(l.read()),
            (Coarse::Lock(l), LockStrategy::GlobalRwLock, LockMode::Write) => CoarseGuard::Write(l.write()),
            (Coarse::Lock(_), LockStrategy::PerNode, _) => unreachable!("PerNode never installs a coarse lock"),
        }
    }

    /// Scan for the first free slot and install `kind`'s empty payload.
    pub fn allocate(&self, kind: NodeKind) -> Option<usize> {
        for id in 0..self.slots.len() {
            let mut guard = self.lock(id, LockMode::Write);
            let slot = guard.node_mut().expect("write-mode guard always yields node_mut");
            if slot.is_none() {
                *slot = match kind {
                    NodeKind::Directory => Node::Directory(Directory::new(self.config.max_dir_entries)),
                    NodeKind::File => Node::File,
                    NodeKind::None => Node::None,
                };
                return Some(id);
            }
        }
        None
    }

    /// Free a slot. Fails if out of range or already free.
    pub fn release(&self, id: usize) -> bool {
        if id >= self.slots.len() {
            return false;
        }
        let mut guard = self.lock(id, LockMode::Write);
        let slot = guard.node_mut().expect("write-mode guard always yields node_mut");
        if slot.is_none() {
            false
        } else {
            *slot = Node::None;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;

    #[test]
    fn root_starts_as_empty_directory() {
        let table = NodeTable::new(EngineConfig::default());
        let guard = table.lock(ROOT, LockMode::Read);
        assert!(guard.node().as_directory().unwrap().is_empty());
    }

    #[test]
    fn allocate_reuses_freed_slots() {
        let table = NodeTable::new(EngineConfig::new(2, 4, 16));
        let a = table.allocate(NodeKind::File).unwrap();
        assert!(table.allocate(NodeKind::File).is_none(), "root + a fill a 2-slot table");
        assert!(table.release(a));
        let b = table.allocate(NodeKind::File).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn global_rwlock_strategy_allows_concurrent_reads() {
        let table = NodeTable::new(EngineConfig::default().with_strategy(LockStrategy::GlobalRwLock));
        let _r1 = table.lock_coarse(LockMode::Read);
        let _r2 = table.lock_coarse(LockMode::Read);
    }

    #[test]
    fn per_node_strategy_has_no_coarse_lock() {
        let table = NodeTable::new(EngineConfig::default());
        assert!(matches!(table.lock_coarse(LockMode::Write), CoarseGuard::None));
    }
}
