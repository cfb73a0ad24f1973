// Infrastructure layer: DI traits, external-service implementations,
// scheduled tasks, and mock implementations for tests.

pub mod ai;
pub mod deps;
pub mod moderation;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use ai::OpenAIClient;
pub use deps::{ServerDeps, SignalRAdapter};
pub use moderation::ContentSafetyClient;
pub use scheduled_tasks::start_scheduler;
pub use traits::{BaseAI, BaseBroadcast, BaseModeration, BaseQuestionStore, ModerationVerdict};
