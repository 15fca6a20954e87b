//! Identifier and discriminator types.

mod enums;
mod ids;

pub(crate) use enums::open_enum;
pub use enums::{ChemicalDrawingFormat, EntityType, MaterialType, ObjectType};
pub use ids::{AttrId, Eid, IdError, IdErrorReason, Mid};
