//! Nutrition assistant core.
//!
//! Takes a validated user profile, computes daily calorie and macro targets,
//! asks GigaChat for a one-day menu (degrading to a local template when the
//! service is unavailable), renders the result for chat delivery and
//! extracts a shopping list from the generated document.

pub mod calculator;
pub mod delivery;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod profile;
pub mod prompts;
pub mod shopping;
pub mod storage;
mod test_utils;

pub use calculator::NutritionTargets;
pub use delivery::{DocumentSink, INLINE_LIMIT_CHARS, deliver_menu};
pub use error::{AssistantError, AssistantResult};
pub use pipeline::{MenuDocument, MenuPipeline, MenuSource};
pub use profile::{ActivityLevel, Gender, Goal, Profile};
pub use shopping::ShoppingItem;
pub use storage::ProfileStore;
