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

use core::fmt;

pub type FsResult<T> = Result<T, FsError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
/// Status code returned by every namespace operation. A value, never an
/// exception: validation failures leave the tree unchanged.
pub enum FsError {
    /// a path component along `parent` did not resolve
    InvalidParentDir,
    /// `parent` resolved to a file, not a directory
    ParentNotDir,
    /// the target name already exists in the destination directory
    FileAlreadyExists,
    /// the name to delete was not found in its parent
    DoesntExistInDir,
    /// a non-empty directory was targeted for deletion
    DirNotEmpty,
    /// the node table has no free slots
    CouldntAllocateInode,
    /// the destination directory's entry array is full
    CouldntAddEntry,
    /// internal inconsistency: entry present in the traversal but not found
    /// for removal at commit time
    FailedRemoveFromDir,
    /// internal inconsistency: slot already free when asked to release it
    FailedDeleteInode,
    /// `lookup`/`move` could not resolve the source path
    FileNotFound,
    /// a move would place a node inside itself
    MoveToItself,
}

impl FsError {
    /// A short, stable, machine-checkable name for this status, independent
    /// of the human-readable [`Display`] text.
    pub fn name(&self) -> &'static str {
        use FsError::*;
        match self {
            InvalidParentDir => "INVALID_PARENT_DIR",
            ParentNotDir => "PARENT_NOT_DIR",
            FileAlreadyExists => "FILE_ALREADY_EXISTS",
            DoesntExistInDir => "DOESNT_EXIST_IN_DIR",
            DirNotEmpty => "DIR_NOT_EMPTY",
            CouldntAllocateInode => "COULDNT_ALLOCATE_INODE",
            CouldntAddEntry => "COULDNT_ADD_ENTRY",
            FailedRemoveFromDir => "FAILED_REMOVE_FROM_DIR",
            FailedDeleteInode => "FAILED_DELETE_INODE",
            FileNotFound => "FILE_NOT_FOUND",
            MoveToItself => "MOVE_TO_ITSELF",
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidParentDir => "invalid parent directory",
            Self::ParentNotDir => "parent is not a directory",
            Self::FileAlreadyExists => "entry already exists",
            Self::DoesntExistInDir => "entry does not exist in directory",
            Self::DirNotEmpty => "directory is not empty",
            Self::CouldntAllocateInode => "node table is full",
            Self::CouldntAddEntry => "directory entry table is full",
            Self::FailedRemoveFromDir => "failed to remove entry from directory",
            Self::FailedDeleteInode => "failed to release node slot",
            Self::FileNotFound => "no such file or directory",
            Self::MoveToItself => "cannot move a node inside itself",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for FsError {}
