//! Data-driven selector catalog.
//!
//! The target site's markup changes often, so every semantic action carries an
//! ordered list of candidate locators. Control flow never names a concrete
//! selector; it asks the catalog group and tries candidates in order.
use autoapply_common::Locator;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorCatalog {
    /// Login form: email/username input.
    pub username: Vec<Locator>,
    /// Login form: password input.
    pub password: Vec<Locator>,
    /// Login form: submit button.
    pub sign_in: Vec<Locator>,
    /// Links to individual postings on the search results page.
    pub job_links: Vec<Locator>,
    /// Control that opens the in-page application flow.
    pub apply: Vec<Locator>,
    /// Optional contact phone input inside the application flow.
    pub phone: Vec<Locator>,
    /// Submit / review / continue / next controls, in priority order.
    pub progress: Vec<Locator>,
    /// Closes the confirmation dialog after a submission.
    pub dismiss: Vec<Locator>,
    /// Page text that proves an application was sent.
    pub confirmation_texts: Vec<String>,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self {
            username: vec![
                Locator::css("#username"),
                Locator::css("input[name='session_key']"),
                Locator::css("input[type='email']"),
            ],
            password: vec![
                Locator::css("#password"),
                Locator::css("input[name='session_password']"),
                Locator::css("input[type='password']"),
            ],
            sign_in: vec![
                Locator::css("button[type='submit']"),
                Locator::css("button[data-litms-control-urn='login-submit']"),
                Locator::text("Sign in"),
            ],
            job_links: vec![
                Locator::css("a.job-card-container__link"),
                Locator::css("a.job-card-list__title"),
                Locator::css("a[href*='/jobs/view/']"),
            ],
            apply: vec![
                Locator::css("button.jobs-apply-button"),
                Locator::css("button[aria-label*='Easy Apply']"),
                Locator::text("Easy Apply"),
            ],
            phone: vec![
                Locator::css("input[id*='phoneNumber']"),
                Locator::css("input[name*='phone']"),
                Locator::css("input[type='tel']"),
            ],
            progress: vec![
                Locator::css("button[aria-label='Submit application']"),
                Locator::css("button[aria-label='Review your application']"),
                Locator::css("button[aria-label='Continue to next step']"),
                Locator::text("Submit application"),
                Locator::Xpath(modal_button("Review")),
                Locator::Xpath(modal_button("Next")),
            ],
            dismiss: vec![
                Locator::css("button[aria-label='Dismiss']"),
                Locator::text("Done"),
            ],
            confirmation_texts: vec![
                "Application sent".to_string(),
                "Your application was sent".to_string(),
                "application was submitted".to_string(),
            ],
        }
    }
}

/// A button inside the apply dialog whose whole text is `label`; short labels
/// like "Next" would otherwise match unrelated links on the posting page.
fn modal_button(label: &str) -> String {
    format!(
        "//div[@role='dialog' or contains(@class, 'jobs-easy-apply-modal')]\
         //button[normalize-space(.)='{label}']"
    )
}
