//! Value objects - immutable types that represent domain concepts

mod platform;
mod snowflake;

pub use platform::Platform;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
