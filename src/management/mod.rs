mod export;
mod session;
mod token;

pub use export::ExportStage;
pub use export::PlaylistExporter;
pub use export::TRACK_BATCH_SIZE;
pub use session::AuthSessionManager;
pub use token::TokenStore;
