//! Soft-delete query helpers.
//!
//! Rows are never physically removed; `deleted_at` marks them deleted.
//! Default lookups go through these helpers so deleted rows stay hidden,
//! while plain `find_by_id` still reaches them when the caller needs it.

use sea_orm::{ColumnTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, Select};

use crate::entity::{analysis, image, vehicle};

/// Entities carrying a nullable `deleted_at` tombstone.
pub trait SoftDelete: EntityTrait {
    /// The tombstone column.
    fn deleted_at() -> Self::Column;

    /// Select all rows that are not soft-deleted.
    fn find_active() -> Select<Self> {
        Self::find().filter(Self::deleted_at().is_null())
    }

    /// Select a row by primary key unless it is soft-deleted.
    fn find_active_by_id<T>(id: T) -> Select<Self>
    where
        T: Into<<Self::PrimaryKey as PrimaryKeyTrait>::ValueType>,
    {
        Self::find_by_id(id).filter(Self::deleted_at().is_null())
    }
}

impl SoftDelete for vehicle::Entity {
    fn deleted_at() -> vehicle::Column {
        vehicle::Column::DeletedAt
    }
}

impl SoftDelete for image::Entity {
    fn deleted_at() -> image::Column {
        image::Column::DeletedAt
    }
}

impl SoftDelete for analysis::Entity {
    fn deleted_at() -> analysis::Column {
        analysis::Column::DeletedAt
    }
}
