//! Cache resolution over previously validated translations.
//!
//! The store hands this module an ordered candidate set (newest first,
//! already filtered to human-validated rows whose text matches); the
//! resolver picks the single reusable result, or none. A record stored in
//! the opposite direction is still reusable: its source side is then the
//! translation the caller asked for.

use crate::languages::Language;
use crate::store::TranslationRecord;

/// A reusable cached translation and the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub text: String,
    pub lang_code: String,
}

/// Pick the best reusable translation from `candidates`, newest first.
///
/// A candidate qualifies only if the requested source language appears on
/// either side of it; a stored translation with no relation to what the
/// user is translating from is never returned, however well its text
/// matches. For a qualifying candidate, the requested destination decides
/// which side to reuse:
/// - candidate destination equals the requested destination: the stored
///   destination text satisfies the request directly;
/// - otherwise the record was stored in the opposite direction and its
///   source text is the translation being requested.
///
/// Pure over its inputs; returns `None` on a hard miss.
pub fn resolve(
    src_lang: &Language,
    dst_lang: &Language,
    candidates: &[TranslationRecord],
) -> Option<CacheHit> {
    for candidate in candidates {
        if src_lang.code != candidate.src_lang_code && src_lang.code != candidate.dst_lang_code {
            continue;
        }

        if dst_lang.code == candidate.dst_lang_code {
            return Some(CacheHit {
                text: candidate.dst_text.clone(),
                lang_code: candidate.dst_lang_code.clone(),
            });
        }

        return Some(CacheHit {
            text: candidate.src_text.clone(),
            lang_code: candidate.src_lang_code.clone(),
        });
    }

    None
}
