//! Build-time settings of the bundle.

/// Remote API origin. Overridable at build time with `DOUBTSOLVER_API_BASE`.
pub const API_BASE: &str = match option_env!("DOUBTSOLVER_API_BASE") {
    Some(base) => base,
    None => "https://chatbot-ubjh.onrender.com",
};

/* local storage keys */
pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY:  &str = "role";

/// Language handed to the browser speech recognizer.
pub const SPEECH_LANG: &str = "en-US";
