//! Client for the remote inference deployments (KServe v2 wire protocol).
//!
//! All deployments — translation, text-to-speech, speech-to-text — speak the
//! same envelope: a JSON request with named, typed inputs, and a response
//! carrying `outputs` plus model identity on success or `error` on failure.
//! Any non-success status, explicit error payload, or response missing the
//! expected output field is an [`InferenceError`]; the caller decides what
//! that means for the request.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::errors::InferenceError;

#[derive(Debug, Serialize)]
struct InferInput {
    name: &'static str,
    shape: Vec<usize>,
    datatype: &'static str,
    data: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct InferRequest {
    id: &'static str,
    inputs: Vec<InferInput>,
}

#[derive(Debug, Deserialize)]
struct InferOutput {
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    outputs: Option<Vec<InferOutput>>,
    model_name: Option<String>,
    model_version: Option<String>,
    error: Option<String>,
}

/// A successful text prediction: translated or transcribed text plus the
/// identity of the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub text: String,
    pub model_name: String,
    pub model_version: String,
}

/// A successful audio prediction: mono PCM waveform plus model identity.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformPrediction {
    pub samples: Vec<f32>,
    pub model_name: String,
    pub model_version: String,
}

/// HTTP client for the inference deployments. Cheap to clone; the inner
/// `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
}

impl Default for InferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn text_input(name: &'static str, value: &str) -> InferInput {
        InferInput {
            name,
            shape: vec![1, 1],
            datatype: "BYTES",
            data: json!([[value]]),
        }
    }

    /// Request a translation of `text` from `src_code` to `dst_code` on the
    /// given deployment endpoint. One blocking call, no retry.
    pub async fn predict(
        &self,
        text: &str,
        src_code: &str,
        dst_code: &str,
        deployment: &str,
    ) -> Result<Prediction, InferenceError> {
        debug!(src_code, dst_code, deployment, "sending translation request");
        let request = InferRequest {
            id: "0",
            inputs: vec![
                Self::text_input("input_text", text),
                Self::text_input("source_lang", src_code),
                Self::text_input("target_lang", dst_code),
            ],
        };

        let response = self.send(&request, deployment).await?;
        let (text, model_name, model_version) = extract_text(response)?;
        debug!(model_name, model_version, "translation prediction succeeded");
        Ok(Prediction {
            text,
            model_name,
            model_version,
        })
    }

    /// Request synthesized speech for `text` in `lang_code`.
    pub async fn predict_tts(
        &self,
        text: &str,
        lang_code: &str,
        deployment: &str,
    ) -> Result<WaveformPrediction, InferenceError> {
        debug!(lang_code, deployment, "sending TTS request");
        let request = InferRequest {
            id: "0",
            inputs: vec![
                Self::text_input("text", text),
                Self::text_input("lang_code", lang_code),
            ],
        };

        let response = self.send(&request, deployment).await?;
        let (samples, model_name, model_version) = extract_waveform(response)?;
        debug!(model_name, model_version, "TTS prediction succeeded");
        Ok(WaveformPrediction {
            samples,
            model_name,
            model_version,
        })
    }

    /// Request a transcription of already-decoded mono PCM samples.
    pub async fn predict_asr(
        &self,
        samples: &[f32],
        sampling_rate: i32,
        lang_code: &str,
        deployment: &str,
    ) -> Result<Prediction, InferenceError> {
        debug!(
            lang_code,
            deployment,
            num_samples = samples.len(),
            "sending ASR request"
        );
        let request = InferRequest {
            id: "0",
            inputs: vec![
                InferInput {
                    name: "audio",
                    shape: vec![1, samples.len()],
                    datatype: "FP32",
                    data: json!([samples]),
                },
                InferInput {
                    name: "sampling_rate",
                    shape: vec![1, 1],
                    datatype: "INT32",
                    data: json!([[sampling_rate]]),
                },
                Self::text_input("lang_code", lang_code),
            ],
        };

        let response = self.send(&request, deployment).await?;
        let (text, model_name, model_version) = extract_text(response)?;
        debug!(model_name, model_version, "ASR prediction succeeded");
        Ok(Prediction {
            text,
            model_name,
            model_version,
        })
    }

    async fn send(
        &self,
        request: &InferRequest,
        deployment: &str,
    ) -> Result<InferResponse, InferenceError> {
        let response = self.http.post(deployment).json(request).send().await?;

        if !response.status().is_success() {
            return Err(InferenceError::Remote(format!(
                "deployment answered with status {}",
                response.status()
            )));
        }

        response
            .json::<InferResponse>()
            .await
            .map_err(|_| InferenceError::MalformedResponse)
    }
}

/// Pull the first text output and model identity out of a response, or fail
/// with the error the deployment reported.
fn extract_text(response: InferResponse) -> Result<(String, String, String), InferenceError> {
    if let Some(error) = response.error {
        return Err(InferenceError::Remote(error));
    }

    let text = response
        .outputs
        .as_ref()
        .and_then(|outputs| outputs.first())
        .and_then(|output| output.data.get(0))
        .and_then(|value| value.as_str())
        .map(str::to_owned)
        .ok_or(InferenceError::MalformedResponse)?;

    let model_name = response.model_name.ok_or(InferenceError::MalformedResponse)?;
    let model_version = response
        .model_version
        .ok_or(InferenceError::MalformedResponse)?;

    Ok((text, model_name, model_version))
}

/// Pull the waveform output (a flat FP32 array) and model identity out of a
/// TTS response.
fn extract_waveform(
    response: InferResponse,
) -> Result<(Vec<f32>, String, String), InferenceError> {
    if let Some(error) = response.error {
        return Err(InferenceError::Remote(error));
    }

    let samples = response
        .outputs
        .as_ref()
        .and_then(|outputs| outputs.first())
        .and_then(|output| output.data.as_array())
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect::<Vec<f32>>()
        })
        .ok_or(InferenceError::MalformedResponse)?;

    let model_name = response.model_name.ok_or(InferenceError::MalformedResponse)?;
    let model_version = response
        .model_version
        .ok_or(InferenceError::MalformedResponse)?;

    Ok((samples, model_name, model_version))
}
