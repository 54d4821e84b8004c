//! Value objects - immutable types that represent domain concepts

mod actor;
mod permissions;
mod snowflake;

pub use actor::Actor;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
