use crate::browser::{
    behavioral::BehavioralEngine,
    fingerprint::UserAgentProfile,
    locator::Query,
    stealth::StealthScripts,
};
use anyhow::Result;
use autoapply_common::{Locator, StealthProfile};
use fantoccini::{elements::Element, Client};
use std::time::Duration;
use tracing::debug;

/// Page wrapper bound to the session's current window.
///
/// Lookups wait at most `element_timeout` and report "not found" as `None`
/// or an empty list; they never fail the caller.
#[derive(Clone)]
pub struct BrowserPage {
    pub(crate) client: Client,
    pub(crate) stealth_profile: StealthProfile,
    pub(crate) user_agent: UserAgentProfile,
    pub(crate) behavioral_engine: BehavioralEngine,
    pub(crate) element_timeout: Duration,
}

impl BrowserPage {
    /// Navigate to `url` and apply stealth scripts.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.behavioral_engine.random_delay(300, 1200).await;
        self.client.goto(url).await?;
        self.apply_stealth().await;
        Ok(())
    }

    /// Evasion scripts are best effort: a page that rejects them is still usable.
    async fn apply_stealth(&self) {
        for script in StealthScripts::for_profile(self.stealth_profile, &self.user_agent) {
            if let Err(err) = self.client.execute(&script, vec![]).await {
                debug!(target: "browser.stealth", error = %err, "evasion script failed");
            }
        }
    }

    /// Return the visible text of the document body.
    pub async fn body_text(&self) -> Result<String> {
        let body = self.client.find(fantoccini::Locator::Css("body")).await?;
        Ok(body.text().await?)
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    /// First displayed element matching `locator`, if one shows up in time.
    pub async fn first_displayed(&self, locator: &Locator) -> Option<PageElement> {
        let query = Query::from(locator);
        if let Err(err) = self
            .client
            .wait()
            .at_most(self.element_timeout)
            .for_element(query.as_fantoccini())
            .await
        {
            debug!(target: "browser.locator", %locator, error = %err, "no match before timeout");
            return None;
        }

        for element in self.find_all(locator).await {
            if element.is_displayed().await {
                return Some(element);
            }
        }
        debug!(target: "browser.locator", %locator, "matches present but none displayed");
        None
    }

    /// All elements matching `locator` right now, without waiting.
    pub async fn find_all(&self, locator: &Locator) -> Vec<PageElement> {
        let query = Query::from(locator);
        match self.client.find_all(query.as_fantoccini()).await {
            Ok(elements) => elements
                .into_iter()
                .map(|element| PageElement::new(element, &self.behavioral_engine))
                .collect(),
            Err(err) => {
                debug!(target: "browser.locator", %locator, error = %err, "find_all failed");
                Vec::new()
            }
        }
    }
}

#[derive(Clone)]
/// Wrapper for DOM elements with human-like input helpers.
pub struct PageElement {
    pub element: Element,
    pub behavioral_engine: BehavioralEngine,
}

impl PageElement {
    pub fn new(element: Element, behavioral: &BehavioralEngine) -> Self {
        Self {
            element,
            behavioral_engine: behavioral.clone(),
        }
    }

    /// Stale or detached elements count as hidden.
    pub async fn is_displayed(&self) -> bool {
        self.element.is_displayed().await.unwrap_or(false)
    }

    pub async fn click(&self) -> Result<()> {
        self.behavioral_engine.random_delay(80, 250).await;
        self.element.click().await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.element.clear().await?;
        Ok(())
    }

    /// Type into the element using human-like timings.
    pub async fn type_str(&self, text: &str) -> Result<()> {
        self.behavioral_engine
            .type_text_human_like(&self.element, text)
            .await
    }

    pub async fn get_attribute(&self, attribute: &str) -> Result<Option<String>> {
        Ok(self.element.attr(attribute).await?)
    }

    /// Return the element's visible text.
    pub async fn get_inner_text(&self) -> Result<String> {
        Ok(self.element.text().await?)
    }
}
