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

use {clap::Parser, nsd::LockStrategy, std::path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "nsd-cli", about = "Batch dispatcher for the nsd namespace engine", version)]
pub struct Args {
    /// path to the file of newline-delimited commands to run
    pub input: PathBuf,
    /// path to write the final tree listing to
    pub output: PathBuf,
    /// number of worker threads the command file is fanned out across
    #[arg(short = 't', long = "threads", default_value_t = 4)]
    pub threads: usize,
    /// concurrency strategy applied to the node table
    #[arg(short = 's', long = "strategy", default_value = "per-node")]
    pub strategy: StrategyArg,
    /// number of slots in the node table
    #[arg(long = "capacity", default_value_t = 50)]
    pub capacity: usize,
    /// maximum number of entries a single directory may hold
    #[arg(long = "max-dir-entries", default_value_t = 20)]
    pub max_dir_entries: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyArg {
    #[value(name = "per-node")]
    PerNode,
    #[value(name = "mutex")]
    GlobalMutex,
    #[value(name = "rwlock")]
    GlobalRwLock,
}

impl From<StrategyArg> for LockStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::PerNode => LockStrategy::PerNode,
            StrategyArg::GlobalMutex => LockStrategy::GlobalMutex,
            StrategyArg::GlobalRwLock => LockStrategy::GlobalRwLock,
        }
    }
}
