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

#![allow(dead_code)]

pub mod config;
pub mod error;
pub mod lock;
pub mod node;
pub mod ops;
pub mod path;
pub mod table;

#[cfg(test)]
mod tests;

use {
    self::{config::EngineConfig, error::FsResult, node::NodeKind, ops::Lookup, table::NodeTable},
    log::info,
};

/// The top-level handle a collaborator constructs and shares (typically
/// behind an `Arc`) across every thread that touches the namespace. Thin on
/// purpose: it owns the table and forwards to [`ops`], logging each call the
/// way a long-running server logs its request handlers.
pub struct Engine {
    table: NodeTable,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        info!(
            "starting namespace engine: {} slots, {:?} lock strategy",
            config.inode_table_size, config.lock_strategy
        );
        Self {
            table: NodeTable::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.table.config()
    }

    pub fn create(&self, path: &str, kind: NodeKind) -> FsResult<usize> {
        ops::create(&self.table, path, kind)
    }

    pub fn delete(&self, path: &str) -> FsResult<()> {
        ops::delete(&self.table, path)
    }

    pub fn lookup(&self, path: &str) -> FsResult<Lookup> {
        ops::lookup(&self.table, path)
    }

    pub fn move_node(&self, src: &str, dst: &str) -> FsResult<()> {
        ops::move_node(&self.table, src, dst)
    }

    pub fn print_tree(&self) -> String {
        ops::print_tree(&self.table)
    }
}
