//! Request orchestration: validate, try the cache, fall back to routed
//! inference, persist what was served.
//!
//! The flow per request: identity pairs return immediately with no
//! persistence; otherwise the validated-translation cache is consulted
//! first, and only on a miss does the router call the remote deployments.
//! Every non-identity success persists exactly one fresh, unreviewed row,
//! including cache hits, so reviewers see what was actually served.

use tracing::{debug, info};

use crate::cache;
use crate::errors::ServiceError;
use crate::languages::{Language, LanguageRegistry};
use crate::router::TranslationRouter;
use crate::store::{NewTranslationRecord, TranslationStore};

/// An incoming translation request, fields as the caller supplied them.
/// Validation happens here, not at the transport layer.
#[derive(Debug, Clone, Default)]
pub struct TranslateRequest {
    pub src_text: Option<String>,
    pub src_lang: Option<String>,
    pub dst_lang: Option<String>,
    pub user: Option<String>,
}

/// What a translation request resolved to. `model_name`/`model_version`
/// are set only when a remote deployment produced the text; `record_id` is
/// set whenever a row was persisted (identity requests persist nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub src_text: String,
    pub dst_text: String,
    pub src_lang_code: String,
    pub dst_lang_code: String,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub record_id: Option<i64>,
}

pub struct TranslationService {
    store: TranslationStore,
    router: TranslationRouter,
    registry: LanguageRegistry,
}

impl TranslationService {
    pub fn new(
        store: TranslationStore,
        router: TranslationRouter,
        registry: LanguageRegistry,
    ) -> Self {
        Self {
            store,
            router,
            registry,
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    /// Resolve a language field to a registry entry, rejecting absent and
    /// unknown codes alike under the field's name.
    fn require_language(
        &self,
        code: Option<&str>,
        field: &'static str,
    ) -> Result<Language, ServiceError> {
        code.and_then(|code| self.registry.get_by_code(code))
            .cloned()
            .ok_or(ServiceError::Validation { field })
    }

    pub async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslationOutcome, ServiceError> {
        let src_text = request
            .src_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(ServiceError::Validation { field: "src_text" })?;
        let src_lang = self.require_language(request.src_lang.as_deref(), "src_lang")?;
        let dst_lang = self.require_language(request.dst_lang.as_deref(), "dst_lang")?;

        // Identity pair: formatting only, nothing to translate or persist
        if src_lang.code == dst_lang.code {
            debug!(lang = %src_lang.code, "identity translation request");
            return Ok(TranslationOutcome {
                src_text: src_text.to_string(),
                dst_text: src_text.to_string(),
                src_lang_code: src_lang.code.clone(),
                dst_lang_code: dst_lang.code,
                model_name: None,
                model_version: None,
                record_id: None,
            });
        }

        let candidates = self
            .store
            .cache_candidates(&src_lang.code, &dst_lang.code, src_text)?;

        if let Some(hit) = cache::resolve(&src_lang, &dst_lang, &candidates) {
            info!(
                src = %src_lang.code,
                dst = %dst_lang.code,
                "serving translation from validated cache"
            );
            let record = self.store.insert(NewTranslationRecord {
                src_text,
                dst_text: &hit.text,
                src_lang_code: &src_lang.code,
                dst_lang_code: &hit.lang_code,
                model_name: None,
                model_version: None,
                user: request.user.as_deref(),
            })?;

            return Ok(TranslationOutcome {
                src_text: record.src_text,
                dst_text: record.dst_text,
                src_lang_code: record.src_lang_code,
                dst_lang_code: record.dst_lang_code,
                model_name: None,
                model_version: None,
                record_id: Some(record.id),
            });
        }

        // Cache miss: route through the deployments. A failed route
        // persists nothing.
        let translation = self.router.route(src_text, &src_lang, &dst_lang).await?;
        info!(
            src = %src_lang.code,
            dst = %dst_lang.code,
            model = %translation.model_name,
            "translation served from inference"
        );

        let record = self.store.insert(NewTranslationRecord {
            src_text,
            dst_text: &translation.dst_text,
            src_lang_code: &src_lang.code,
            dst_lang_code: &dst_lang.code,
            model_name: Some(&translation.model_name),
            model_version: Some(&translation.model_version),
            user: request.user.as_deref(),
        })?;

        Ok(TranslationOutcome {
            src_text: record.src_text,
            dst_text: record.dst_text,
            src_lang_code: record.src_lang_code,
            dst_lang_code: record.dst_lang_code,
            model_name: record.model_name,
            model_version: record.model_version,
            record_id: Some(record.id),
        })
    }
}
