//! Client-facing error catalog of the users module.

use api_errors::ErrDef;

pub const ALL_FIELDS_REQUIRED: ErrDef = ErrDef::new(400, "All fields are required.");
pub const USER_ALREADY_EXISTS: ErrDef = ErrDef::new(400, "User already exists.");
pub const USERNAME_TAKEN: ErrDef = ErrDef::new(400, "Username already taken.");
pub const NOT_FOLLOWING: ErrDef = ErrDef::new(400, "You are not following this user.");
pub const CANNOT_FOLLOW_SELF: ErrDef = ErrDef::new(400, "You cannot follow yourself.");
pub const INCORRECT_CREDENTIALS: ErrDef = ErrDef::new(401, "Incorrect email or password.");
pub const NOT_AUTHENTICATED: ErrDef = ErrDef::new(401, "User not authenticated.");
pub const USER_NOT_FOUND: ErrDef = ErrDef::new(404, "User not found.");
