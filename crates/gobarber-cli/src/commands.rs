//! Command handlers. Each takes the process-wide session store.

use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::warn;

use gobarber_core::forms::{
    is_valid_email, validate_reset_password, validate_sign_in, ResetPasswordForm, ResetToken,
    SignInForm, ValidationErrors,
};
use gobarber_core::{
    ApiClient, Config, KeyValueStorage, SessionError, SessionState, SessionStore, UserProfile,
};

pub type Store = SessionStore<ApiClient, Box<dyn KeyValueStorage>>;

pub async fn sign_in(store: &Store, config: &mut Config, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_email(config.last_email.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    let form = SignInForm {
        email: email.trim().to_string(),
        password,
    };
    if let Err(errors) = validate_sign_in(&form) {
        return report_invalid(&errors);
    }

    match store.sign_in(&form.email, &form.password).await {
        Ok(session) => {
            config.last_email = Some(form.email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            println!("Welcome, {}!", session.user.name);
            Ok(())
        }
        Err(SessionError::Authentication(e)) => bail!("{}", e.user_message()),
        Err(e) => Err(e.into()),
    }
}

pub fn sign_out(store: &Store) -> Result<()> {
    store.sign_out();
    println!("Signed out.");
    Ok(())
}

pub fn whoami(store: &Store) -> Result<()> {
    match store.snapshot() {
        SessionState::SignedIn(session) => print_user(&session.user),
        SessionState::ProfileOnly(user) => {
            print_user(&user);
            println!("(not signed in)");
        }
        SessionState::SignedOut => println!("Not signed in"),
    }
    Ok(())
}

pub fn update_profile(
    store: &Store,
    id: Option<String>,
    name: String,
    email: String,
    avatar_url: Option<String>,
) -> Result<()> {
    if !is_valid_email(&email) {
        bail!("Enter a valid email");
    }

    let current = store.user();
    let id = match (id, current.as_ref()) {
        (Some(id), _) => id,
        (None, Some(user)) => user.id.clone(),
        (None, None) => bail!("Not signed in; pass --id to set a profile anyway"),
    };

    // Fields this command does not edit are carried over from the current profile
    let mut profile = UserProfile::new(id, name, email);
    if let Some(user) = current {
        profile.extra = user.extra;
    }
    if let Some(url) = avatar_url {
        profile.set_avatar_url(Some(url));
    }

    store.update_user(profile)?;
    println!("Profile updated.");
    Ok(())
}

pub async fn reset_password(store: &Store, link: &str) -> Result<()> {
    let token = ResetToken::from_link(link)?;

    let form = ResetPasswordForm {
        password: rpassword::prompt_password("New password: ")?,
        password_confirmation: rpassword::prompt_password("Confirm new password: ")?,
    };
    if let Err(errors) = validate_reset_password(&form) {
        return report_invalid(&errors);
    }

    if let Err(e) = store
        .auth()
        .reset_password(&form.password, &form.password_confirmation, token.as_str())
        .await
    {
        warn!(error = %e, "Password reset failed");
        bail!("Could not reset your password, please try again: {}", e.user_message());
    }

    println!("Password changed. You can sign in now.");
    Ok(())
}

fn print_user(user: &UserProfile) {
    println!("{} <{}>", user.name, user.email);
    println!("Avatar: {}", user.display_avatar());
}

fn report_invalid(errors: &ValidationErrors) -> Result<()> {
    for (field, message) in errors.iter() {
        eprintln!("  {}: {}", field, message);
    }
    bail!("Invalid input")
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_email) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}
