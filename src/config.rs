use anyhow::{Context, Result};

/// Immutable application configuration, loaded once at startup and passed
/// by reference into the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    // Translation deployments
    pub native_model_url: String,
    pub native_model_name: String,
    pub raw_model_url: String,
    pub raw_model_name: String,

    // Speech deployments
    pub tts_model_url: String,
    pub tts_model_name: String,
    pub asr_model_url: String,
    pub asr_model_name: String,

    // Routing
    pub pivot_code: String,

    // Server
    pub database_path: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let raw_model_url =
            std::env::var("RAW_MODEL_URL").context("RAW_MODEL_URL not set")?;

        Ok(Self {
            // Native deployment serves the low-resource language pairs
            native_model_url: std::env::var("NATIVE_MODEL_URL")
                .context("NATIVE_MODEL_URL not set")?,
            native_model_name: std::env::var("NATIVE_MODEL_NAME")
                .context("NATIVE_MODEL_NAME not set")?,

            // Raw deployment serves the general-purpose pairs
            raw_model_name: std::env::var("RAW_MODEL_NAME")
                .context("RAW_MODEL_NAME not set")?,

            // Speech deployments default to the raw inference host
            tts_model_url: std::env::var("TTS_MODEL_URL")
                .unwrap_or_else(|_| raw_model_url.clone()),
            tts_model_name: std::env::var("TTS_MODEL_NAME")
                .unwrap_or_else(|_| "tts".to_string()),
            asr_model_url: std::env::var("ASR_MODEL_URL")
                .unwrap_or_else(|_| raw_model_url.clone()),
            asr_model_name: std::env::var("ASR_MODEL_NAME")
                .unwrap_or_else(|_| "asr".to_string()),

            raw_model_url,

            // The bridge language for pairs the models do not serve directly
            pivot_code: std::env::var("PIVOT_LANG_CODE")
                .unwrap_or_else(|_| "spa_Latn".to_string()),

            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "puente.db".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        })
    }

    /// Full inference URL for the native deployment (KServe v2 layout).
    pub fn native_deployment(&self) -> String {
        format!(
            "{}/v2/models/{}/infer",
            self.native_model_url, self.native_model_name
        )
    }

    /// Full inference URL for the raw (general-purpose) deployment.
    pub fn raw_deployment(&self) -> String {
        format!(
            "{}/v2/models/{}/infer",
            self.raw_model_url, self.raw_model_name
        )
    }

    /// Full inference URL for the text-to-speech deployment.
    pub fn tts_deployment(&self) -> String {
        format!(
            "{}/v2/models/{}/infer",
            self.tts_model_url, self.tts_model_name
        )
    }

    /// Full inference URL for the speech-to-text deployment.
    pub fn asr_deployment(&self) -> String {
        format!(
            "{}/v2/models/{}/infer",
            self.asr_model_url, self.asr_model_name
        )
    }
}
