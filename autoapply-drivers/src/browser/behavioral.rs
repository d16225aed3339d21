use anyhow::Result;
use fantoccini::elements::Element;
use rand::rngs::OsRng;
use rand::Rng;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, Default)]
/// Produces human-like delays and typing behavior to reduce automation signals.
pub struct BehavioralEngine {}

impl BehavioralEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// Sleep for a random duration between `min` and `max` milliseconds.
    /// Bounds given in the wrong order are swapped.
    pub async fn random_delay(&self, min: u64, max: u64) {
        let ms = Self::pick_delay_ms(min, max);
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }

    fn pick_delay_ms(min: u64, max: u64) -> u64 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        OsRng.gen_range(lo..=hi)
    }

    /// Type the provided text with small random delays between characters.
    pub async fn type_text_human_like(&self, element: &Element, text: &str) -> Result<()> {
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            element.send_keys(ch.encode_utf8(&mut buf)).await?;
            self.random_delay(30, 150).await;
        }
        Ok(())
    }
}
