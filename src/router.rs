//! Translation routing: decide, for an arbitrary language pair, whether the
//! translation is a single direct call or must pivot through the bridge
//! language, and execute the calls in order.
//!
//! The decision is pure data ([`RoutePlan`]), recomputed per request from
//! the pair's `is_native` flags and the configured pivot code. Executing a
//! pivot plan is two sequential gateway calls with a true data dependency:
//! the second hop consumes the first hop's output, so there is nothing to
//! parallelize. Any hop failure fails the whole route; no partial text is
//! ever returned.

use tracing::debug;

use crate::config::Config;
use crate::errors::InferenceError;
use crate::inference::{InferenceClient, Prediction};
use crate::languages::Language;

/// Which remote deployment a call goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Specialized deployment for native-language pairs
    Native,
    /// General-purpose deployment
    Raw,
}

/// The routing decision for one language pair. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePlan {
    /// One call on the given deployment.
    Direct(Deployment),
    /// Two calls: source to pivot on `first`, pivot to destination on
    /// `second`.
    Pivot {
        first: Deployment,
        second: Deployment,
    },
}

impl RoutePlan {
    /// Decision table, checked in priority order; the first matching rule
    /// wins.
    pub fn for_pair(src: &Language, dst: &Language, pivot_code: &str) -> RoutePlan {
        if src.is_native && dst.code != pivot_code {
            // Native source into the pivot first, then onward
            RoutePlan::Pivot {
                first: Deployment::Native,
                second: Deployment::Raw,
            }
        } else if src.code != pivot_code && dst.is_native {
            // Into the pivot first, then into the native destination
            RoutePlan::Pivot {
                first: Deployment::Raw,
                second: Deployment::Native,
            }
        } else if !src.is_native && !dst.is_native {
            RoutePlan::Direct(Deployment::Raw)
        } else {
            // One side is native and the other is the pivot itself
            RoutePlan::Direct(Deployment::Native)
        }
    }
}

/// The result of a routed translation: the final text and the identity of
/// the model that produced it (for a pivot route, the second hop's).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub dst_text: String,
    pub model_name: String,
    pub model_version: String,
}

impl From<Prediction> for Translation {
    fn from(prediction: Prediction) -> Self {
        Self {
            dst_text: prediction.text,
            model_name: prediction.model_name,
            model_version: prediction.model_version,
        }
    }
}

/// Executes routing decisions against the two configured deployments.
pub struct TranslationRouter {
    client: InferenceClient,
    native_deployment: String,
    raw_deployment: String,
    pivot_code: String,
}

impl TranslationRouter {
    pub fn new(client: InferenceClient, config: &Config) -> Self {
        Self {
            client,
            native_deployment: config.native_deployment(),
            raw_deployment: config.raw_deployment(),
            pivot_code: config.pivot_code.clone(),
        }
    }

    fn endpoint(&self, deployment: Deployment) -> &str {
        match deployment {
            Deployment::Native => &self.native_deployment,
            Deployment::Raw => &self.raw_deployment,
        }
    }

    /// Translate `src_text` from `src` to `dst`, pivoting when the pair
    /// requires it. `src_text` is opaque; paragraph handling is a
    /// presentation concern of the caller.
    pub async fn route(
        &self,
        src_text: &str,
        src: &Language,
        dst: &Language,
    ) -> Result<Translation, InferenceError> {
        let plan = RoutePlan::for_pair(src, dst, &self.pivot_code);
        debug!(
            src = %src.code,
            dst = %dst.code,
            ?plan,
            "routing translation request"
        );

        match plan {
            RoutePlan::Direct(deployment) => {
                let prediction = self
                    .client
                    .predict(src_text, &src.code, &dst.code, self.endpoint(deployment))
                    .await?;
                Ok(Translation::from(prediction))
            }
            RoutePlan::Pivot { first, second } => {
                let hop = self
                    .client
                    .predict(src_text, &src.code, &self.pivot_code, self.endpoint(first))
                    .await?;
                debug!(pivot = %self.pivot_code, "first hop complete");
                let prediction = self
                    .client
                    .predict(&hop.text, &self.pivot_code, &dst.code, self.endpoint(second))
                    .await?;
                Ok(Translation::from(prediction))
            }
        }
    }
}
