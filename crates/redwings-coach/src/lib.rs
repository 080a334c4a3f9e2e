//! # RedWings-Coach
//!
//! Turns a rider's video and profile into a metrics summary plus structured
//! coaching feedback.
//!
//! ## Flow
//!
//! 1. **Validation**: content type, upload size and athlete profile
//! 2. **Pose estimation**: a [`PoseEstimator`] yields the landmark sequence
//! 3. **Metrics**: [`redwings_metrics::MetricsAggregator`] on a blocking task
//! 4. **Feedback**: a [`FeedbackGenerator`] under a timeout
//!
//! [`RuleBasedCoach`] works without any model. Model-backed generators build
//! their request with [`prompts::build_chat_request`].

pub mod coach;
pub mod config;
pub mod feedback;
pub mod pipeline;
pub mod profile;
pub mod prompts;

pub use coach::*;
pub use config::*;
pub use feedback::*;
pub use pipeline::*;
pub use profile::*;
