//! Sign-in form handling. No challenge solving: a challenge page is logged
//! and the run carries on.
use crate::selectors::{click_first_match, fill_first_match};
use crate::session::SessionDriver;
use autoapply_common::ApplyError;
use autoapply_config::{Credentials, PacingConfig, SelectorCatalog, SiteConfig};
use tracing::{info, warn};
use url::Url;

pub fn login_url(site: &SiteConfig) -> Result<Url, ApplyError> {
    Url::parse(&site.base_url)
        .and_then(|base| base.join(&site.login_path))
        .map_err(|e| ApplyError::Config(format!("invalid login URL: {e}")))
}

pub async fn login<S>(
    session: &mut S,
    site: &SiteConfig,
    catalog: &SelectorCatalog,
    pacing: &PacingConfig,
    credentials: &Credentials,
) -> Result<(), ApplyError>
where
    S: SessionDriver + ?Sized,
{
    let url = login_url(site)?;
    info!(target: "apply.login", email = %credentials.email, "signing in");
    session.navigate(url.as_str()).await?;
    let settle = pacing.navigation_settle_ms;
    session.pause(settle, settle).await;

    if !fill_first_match(session, &catalog.username, &credentials.email).await {
        return Err(ApplyError::Login("username field not found".into()));
    }
    if !fill_first_match(session, &catalog.password, &credentials.password).await {
        return Err(ApplyError::Login("password field not found".into()));
    }
    if !click_first_match(session, &catalog.sign_in).await {
        return Err(ApplyError::Login("sign-in button not found".into()));
    }
    let settle = pacing.login_settle_ms;
    session.pause(settle, settle).await;

    match session.current_url().await {
        Ok(landed) => {
            if let Some(marker) = site
                .challenge_markers
                .iter()
                .find(|m| landed.contains(m.as_str()))
            {
                warn!(target: "apply.login", url = %landed, %marker, "security challenge after sign-in; continuing without solving it");
            } else {
                info!(target: "apply.login", url = %landed, "signed in");
            }
        }
        Err(err) => warn!(target: "apply.login", error = %err, "could not read URL after sign-in"),
    }
    Ok(())
}
