//! Form input checks shared by the front ends.
//!
//! Validators return every failing field at once (not just the first), as
//! a field name → message map, so a form can flag all of its inputs in one
//! pass.

pub mod reset;
pub mod validation;

pub use reset::{MissingTokenError, ResetToken};
pub use validation::{
    is_valid_email, validate_reset_password, validate_sign_in, ResetPasswordForm, SignInForm,
    ValidationErrors,
};
