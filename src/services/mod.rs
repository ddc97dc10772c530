pub mod gemini;
pub mod model;
pub mod relay;
pub mod session;
