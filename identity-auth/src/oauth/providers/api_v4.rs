//! Profile and email resources of the `/api/v4` user API.
//!
//! Served by GitLab and by Nextcloud instances fronted by the same API shape.

use serde::Deserialize;

use crate::error::{profile_fetch_error, Error};
use crate::http::{get_json, AuthenticatedClient};
use crate::identity::{text, Claims, EmailList, UserProvidedData};
use crate::oauth::token::Tokens;

#[derive(Debug, Deserialize)]
pub(crate) struct User {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    confirmed_at: Option<String>,
    id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEmail {
    #[serde(default)]
    email: Option<String>,
}

/// Fetch `/api/v4/user`, then `/api/v4/user/emails`, and normalize.
pub(crate) async fn fetch_user_data(
    client: &AuthenticatedClient,
    tokens: &Tokens,
    host: &str,
) -> Result<UserProvidedData, Error> {
    let user: User = get_json(client, tokens, &format!("{}/api/v4/user", host))
        .await
        .map_err(profile_fetch_error)?;

    let emails: Option<Vec<UserEmail>> =
        get_json(client, tokens, &format!("{}/api/v4/user/emails", host))
            .await
            .map_err(profile_fetch_error)?;

    Ok(normalize(host, &user, &emails.unwrap_or_default()))
}

pub(crate) fn normalize(host: &str, user: &User, emails: &[UserEmail]) -> UserProvidedData {
    let mut list = EmailList::new();

    // The email listing carries no confirmation status.
    for email in emails {
        list.push_unverified(text(&email.email));
    }

    let confirmed = !text(&user.confirmed_at).is_empty();
    list.set_primary(text(&user.email), confirmed);

    UserProvidedData {
        emails: list.into_emails(),
        metadata: Claims::new(host, user.id.to_string())
            .with_name(text(&user.name))
            .with_picture(text(&user.avatar_url)),
    }
}
