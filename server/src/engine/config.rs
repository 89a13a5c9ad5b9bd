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

//! Tunable constants for the namespace engine. A collaborator picks these at
//! [`crate::engine::table::NodeTable`] construction time; there is no global
//! default baked into the engine itself.

/// The synchronization strategy applied to the node table.
///
/// `PerNode` is the fine-grained design this crate is built around: every
/// slot owns its own reader/writer lock, and the locking traversal
/// (`engine::lock`) couples across them hand-over-hand. `GlobalMutex` and
/// `GlobalRwLock` collapse every slot lock into a single table-wide lock,
/// trading concurrency for simplicity; both exist so a caller can A/B the
/// concurrency substrate without touching operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStrategy {
    /// one reader/writer lock per node slot (the default, fine-grained mode)
    PerNode,
    /// a single mutex guarding the entire table
    GlobalMutex,
    /// a single reader/writer lock guarding the entire table
    GlobalRwLock,
}

impl Default for LockStrategy {
    fn default() -> Self {
        Self::PerNode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// number of slots in the node table; id 0 is always the root directory
    pub inode_table_size: usize,
    /// maximum number of live entries a single directory may hold
    pub max_dir_entries: usize,
    /// maximum length, in bytes, of a single path component
    pub max_file_name: usize,
    /// the synchronization strategy applied to the table
    pub lock_strategy: LockStrategy,
}

impl EngineConfig {
    pub const fn new(inode_table_size: usize, max_dir_entries: usize, max_file_name: usize) -> Self {
        Self {
            inode_table_size,
            max_dir_entries,
            max_file_name,
            lock_strategy: LockStrategy::PerNode,
        }
    }
    pub const fn with_strategy(mut self, strategy: LockStrategy) -> Self {
        self.lock_strategy = strategy;
        self
    }
}

impl Default for EngineConfig {
    /// Mirrors the defaults of the original instructional filesystem this
    /// engine generalizes: 50 inodes, 20 entries per directory, 40-byte names.
    fn default() -> Self {
        Self::new(50, 20, 40)
    }
}
