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

//! `nsd`: an in-memory, concurrently-accessible hierarchical namespace. A
//! fixed-size table of nodes (files and directories) is traversed with
//! hand-over-hand lock coupling, so independent subtrees can be read and
//! written concurrently without a single global lock serializing every
//! operation.

pub mod engine;

pub use engine::{
    config::{EngineConfig, LockStrategy},
    error::{FsError, FsResult},
    node::NodeKind,
    ops::Lookup,
    Engine,
};
