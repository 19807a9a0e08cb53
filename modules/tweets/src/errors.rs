//! Client-facing error catalog of the tweets module.

use api_errors::ErrDef;

pub const FIELDS_REQUIRED: ErrDef = ErrDef::new(400, "Fields are required.");
pub const TWEET_NOT_FOUND: ErrDef = ErrDef::new(404, "Tweet not found.");
pub const USER_NOT_FOUND: ErrDef = ErrDef::new(404, "User not found.");
