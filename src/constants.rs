//! Application-wide constants
//!
//! Field limits mirror the database column sizes.

/// Maximum length for user names, first/last names and catalogue names.
pub const MAX_NAME_LENGTH: u64 = 150;

/// Maximum length for tag slugs and measurement units.
pub const MAX_SLUG_LENGTH: u64 = 50;

/// Maximum length for email addresses.
pub const MAX_EMAIL_LENGTH: u64 = 254;

/// Maximum length for recipe names.
pub const MAX_RECIPE_NAME_LENGTH: u64 = 256;

/// Cooking time bounds, in minutes.
pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 1440;

/// Smallest amount an ingredient may be used in.
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;

/// Length of issued auth tokens.
pub const AUTH_TOKEN_LENGTH: usize = 40;

/// Username reserved for the `/users/me/` endpoint.
pub const RESERVED_USERNAME: &str = "me";

/// Storage prefix for recipe images.
pub const RECIPE_IMAGE_PREFIX: &str = "recipes/images";

/// Storage prefix for user avatars.
pub const AVATAR_IMAGE_PREFIX: &str = "users/images";

/// Filename of the exported shopping list.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";
