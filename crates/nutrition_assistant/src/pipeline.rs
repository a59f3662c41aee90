//! Menu generation with graceful degradation.
//!
//! The pipeline computes targets, builds the prompt and asks GigaChat for a
//! menu. Any token or completion failure degrades to a deterministic local
//! template instead of surfacing an error, and every document records which
//! path produced it.

use std::sync::Arc;

use gigachat_client::token::TokenCache;
use gigachat_client::{GigaChatApi, GigaChatError};

use crate::calculator::{self, NutritionTargets};
use crate::profile::Profile;
use crate::prompts;

/// Which path produced a menu document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuSource {
    Remote,
    Fallback,
}

impl MenuSource {
    /// Provenance marker shown above the rendered menu.
    pub fn marker(&self) -> &'static str {
        match self {
            MenuSource::Remote => "Menu generated by GigaChat:",
            MenuSource::Fallback => "Menu generated locally:",
        }
    }
}

/// A generated menu and its provenance.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuDocument {
    pub html: String,
    pub source: MenuSource,
}

pub struct MenuPipeline {
    client: Arc<dyn GigaChatApi>,
    tokens: TokenCache,
}

impl MenuPipeline {
    pub fn new(client: Arc<dyn GigaChatApi>, tokens: TokenCache) -> Self {
        Self { client, tokens }
    }

    /// Generates a menu document for the profile. Never fails outward: if
    /// the token cannot be acquired or the completion fails, the local
    /// template is returned instead. An authentication rejection also
    /// invalidates the cached token so the next call starts fresh.
    pub async fn generate(&self, profile: &Profile) -> MenuDocument {
        let targets = calculator::compute(profile);

        let token = match self.tokens.get().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("token acquisition failed, serving local menu: {}", e);
                return MenuDocument {
                    html: render_fallback(&targets),
                    source: MenuSource::Fallback,
                };
            }
        };

        let prompt = prompts::menu_request_prompt(profile, &targets);
        match self.client.complete(&token, &prompt).await {
            Ok(html) => {
                tracing::debug!("remote menu generated, {} chars", html.len());
                MenuDocument {
                    html,
                    source: MenuSource::Remote,
                }
            }
            Err(e) => {
                if matches!(e, GigaChatError::Auth(_)) {
                    self.tokens.invalidate().await;
                }
                tracing::warn!("menu completion failed, serving local menu: {}", e);
                MenuDocument {
                    html: render_fallback(&targets),
                    source: MenuSource::Fallback,
                }
            }
        }
    }
}

/// Fixed four-meal skeleton annotated with the computed totals. Identical
/// targets always render identical bytes.
pub fn render_fallback(targets: &NutritionTargets) -> String {
    format!(
        "<h2>Daily menu</h2>\n\
         <table>\n\
         <tr><th>Meal</th><th>Dish</th><th>Portion</th><th>Kcal</th></tr>\n\
         <tr><td>Breakfast</td><td>Oatmeal with fruit</td><td>150g</td><td>300</td></tr>\n\
         <tr><td>Lunch</td><td>Chicken with vegetables</td><td>200g</td><td>500</td></tr>\n\
         <tr><td>Dinner</td><td>Fish with salad</td><td>150g</td><td>400</td></tr>\n\
         <tr><td>Snacks</td><td>Nuts and yogurt</td><td>100g</td><td>300</td></tr>\n\
         </table>\n\
         <h3>Daily totals</h3>\n\
         <p>Calories: {calories:.0} kcal</p>\n\
         <p>Protein: {protein:.0} g</p>\n\
         <p>Fat: {fat:.0} g</p>\n\
         <p>Carbohydrates: {carbs:.0} g</p>\n\
         <h3>Shopping list</h3>\n\
         <ul class=\"shopping-list\">\n\
         <li>Oats 150g</li>\n\
         <li>Fruit (apples, bananas) 200g</li>\n\
         <li>Chicken fillet 250g</li>\n\
         <li>Vegetables (carrots, broccoli) 300g</li>\n\
         <li>Fish (salmon) 200g</li>\n\
         <li>Leaf salad 150g</li>\n\
         <li>Nuts (almonds) 100g</li>\n\
         <li>Greek yogurt 200g</li>\n\
         <li>Olive oil 50ml</li>\n\
         <li>Spices to taste</li>\n\
         </ul>\n\
         <p>Tip: drink enough water through the day.</p>",
        calories = targets.daily_calories,
        protein = targets.protein_g,
        fat = targets.fat_g,
        carbs = targets.carbs_g
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ActivityLevel, Gender, Goal};
    use crate::test_utils::{DownExchangeClient, FailingCompletionClient, StaticMenuClient};
    use gigachat_client::retry::RetryPolicy;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn profile() -> Profile {
        Profile::new(
            Gender::Male,
            30,
            70.0,
            175.0,
            ActivityLevel::Medium,
            Goal::Maintain,
        )
        .unwrap()
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    fn pipeline_with(client: Arc<dyn GigaChatApi>) -> MenuPipeline {
        let tokens = TokenCache::new(client.clone(), fast_policy());
        MenuPipeline::new(client, tokens)
    }

    #[tokio::test]
    async fn remote_success_produces_remote_document() {
        let client = StaticMenuClient::new("<b>Remote menu</b>");
        let pipeline = pipeline_with(client.clone());

        let doc = pipeline.generate(&profile()).await;
        assert_eq!(doc.source, MenuSource::Remote);
        assert_eq!(doc.html, "<b>Remote menu</b>");
        assert_eq!(client.complete_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prompt_sent_to_model_carries_the_formatting_contract() {
        let client = StaticMenuClient::new("<b>Remote menu</b>");
        let pipeline = pipeline_with(client.clone());

        pipeline.generate(&profile()).await;
        let prompt = client.last_prompt.lock().await.clone().unwrap();
        assert!(prompt.contains("<ul class=\"shopping-list\">"));
        assert!(prompt.contains("70 kg"));
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_deterministic_fallback() {
        fn api_err() -> GigaChatError {
            GigaChatError::Api {
                status: 502,
                body: "bad gateway".to_string(),
            }
        }
        let client = FailingCompletionClient::new(api_err);
        let pipeline = pipeline_with(client);

        let first = pipeline.generate(&profile()).await;
        let second = pipeline.generate(&profile()).await;
        assert_eq!(first.source, MenuSource::Fallback);
        assert_eq!(first.html, second.html);
        assert!(first.html.contains("Protein: 140 g"));
        assert!(first.html.contains("<ul class=\"shopping-list\">"));
    }

    #[tokio::test]
    async fn auth_rejection_invalidates_cached_token() {
        fn auth_err() -> GigaChatError {
            GigaChatError::Auth("token expired".to_string())
        }
        let client = FailingCompletionClient::new(auth_err);
        let pipeline = pipeline_with(client.clone());

        let doc = pipeline.generate(&profile()).await;
        assert_eq!(doc.source, MenuSource::Fallback);
        assert_eq!(client.exchange_calls.load(Ordering::SeqCst), 1);

        // A non-auth failure would have left the token cached; the auth
        // rejection forces a second exchange here.
        pipeline.generate(&profile()).await;
        assert_eq!(client.exchange_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_auth_failure_keeps_cached_token() {
        fn api_err() -> GigaChatError {
            GigaChatError::Api {
                status: 500,
                body: "boom".to_string(),
            }
        }
        let client = FailingCompletionClient::new(api_err);
        let pipeline = pipeline_with(client.clone());

        pipeline.generate(&profile()).await;
        pipeline.generate(&profile()).await;
        assert_eq!(client.exchange_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_failure_skips_completion_entirely() {
        let pipeline = pipeline_with(Arc::new(DownExchangeClient));

        let doc = pipeline.generate(&profile()).await;
        assert_eq!(doc.source, MenuSource::Fallback);
        assert!(doc.html.contains("Daily menu"));
    }

    #[test]
    fn fallback_totals_follow_targets() {
        let targets = calculator::compute(&profile());
        let html = render_fallback(&targets);
        assert!(html.contains("Calories: 2556 kcal"));
        assert!(html.contains("Carbohydrates: 339 g"));
    }
}
