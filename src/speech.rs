//! Speech services: text-to-speech with a persistent audio cache, and
//! speech-to-text over raw PCM samples.
//!
//! Waveforms cross the store and the API as base64 of the little-endian
//! f32 sample stream. A cached rendering that fails to decode is treated
//! as a miss and regenerated; a bad row never fails a request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::inference::InferenceClient;
use crate::languages::LanguageRegistry;
use crate::store::TranslationStore;

/// Synthesized speech for a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesis {
    pub audio_b64: String,
    pub model_name: String,
    pub model_version: String,
}

/// A transcription of submitted audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub text: String,
    pub model_name: String,
    pub model_version: String,
}

/// Encode a mono PCM waveform as base64 over its little-endian f32 bytes.
pub fn encode_waveform(samples: &[f32]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 4);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    BASE64.encode(bytes)
}

/// Decode a base64 waveform back into f32 samples. `None` if the payload
/// is not valid base64 or not a whole number of f32s.
pub fn decode_waveform(audio_b64: &str) -> Option<Vec<f32>> {
    let bytes = BASE64.decode(audio_b64).ok()?;
    if bytes.len() % 4 != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

pub struct SpeechService {
    store: TranslationStore,
    client: InferenceClient,
    registry: LanguageRegistry,
    tts_deployment: String,
    asr_deployment: String,
}

impl SpeechService {
    pub fn new(
        store: TranslationStore,
        client: InferenceClient,
        registry: LanguageRegistry,
        tts_deployment: String,
        asr_deployment: String,
    ) -> Self {
        Self {
            store,
            client,
            registry,
            tts_deployment,
            asr_deployment,
        }
    }

    fn require_code(&self, code: Option<&str>, field: &'static str) -> Result<String, ServiceError> {
        code.filter(|code| self.registry.is_supported(code))
            .map(str::to_string)
            .ok_or(ServiceError::Validation { field })
    }

    /// Synthesize speech for `text`, serving from the audio cache when a
    /// decodable rendering exists.
    pub async fn synthesize(
        &self,
        text: Option<&str>,
        lang_code: Option<&str>,
    ) -> Result<Synthesis, ServiceError> {
        let text = text
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(ServiceError::Validation { field: "text" })?;
        let lang_code = self.require_code(lang_code, "lang")?;

        if let Some(entry) = self.store.get_tts(text, &lang_code)? {
            if decode_waveform(&entry.audio_b64).is_some() {
                info!(lang = %lang_code, "serving synthesis from cache");
                return Ok(Synthesis {
                    audio_b64: entry.audio_b64,
                    model_name: entry.model_name,
                    model_version: entry.model_version,
                });
            }
            warn!(lang = %lang_code, "cached audio failed to decode, regenerating");
        }

        let prediction = self
            .client
            .predict_tts(text, &lang_code, &self.tts_deployment)
            .await?;
        let audio_b64 = encode_waveform(&prediction.samples);

        self.store.put_tts(
            text,
            &lang_code,
            &audio_b64,
            &prediction.model_name,
            &prediction.model_version,
        )?;
        info!(lang = %lang_code, model = %prediction.model_name, "synthesis generated");

        Ok(Synthesis {
            audio_b64,
            model_name: prediction.model_name,
            model_version: prediction.model_version,
        })
    }

    /// Transcribe base64-encoded PCM audio. Transcriptions are not cached;
    /// recorded audio rarely repeats byte for byte.
    pub async fn transcribe(
        &self,
        audio_b64: Option<&str>,
        sampling_rate: i32,
        lang_code: Option<&str>,
    ) -> Result<Transcription, ServiceError> {
        let samples = audio_b64
            .and_then(decode_waveform)
            .filter(|samples| !samples.is_empty())
            .ok_or(ServiceError::Validation { field: "audio" })?;
        let lang_code = self.require_code(lang_code, "lang")?;

        let prediction = self
            .client
            .predict_asr(&samples, sampling_rate, &lang_code, &self.asr_deployment)
            .await?;
        info!(lang = %lang_code, model = %prediction.model_name, "transcription complete");

        Ok(Transcription {
            text: prediction.text,
            model_name: prediction.model_name,
            model_version: prediction.model_version,
        })
    }
}
