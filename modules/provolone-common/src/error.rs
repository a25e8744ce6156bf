use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvoloneError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication unavailable: {0}")]
    AuthenticationUnavailable(String),

    #[error("All image providers failed or none are configured")]
    ProviderExhausted,

    #[error("Provider {provider} timed out after {attempts} status checks")]
    ProviderTimeout { provider: String, attempts: u32 },

    #[error("Publish rejected (status {status:?}): {body}")]
    PublishFailure { status: Option<u16>, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
