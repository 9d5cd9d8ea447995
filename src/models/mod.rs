pub mod application;
pub mod engagement;
pub mod job;
pub mod notification;
pub mod timestamp;
pub mod token;
pub mod user;

pub use application::{ApplicationStatus, JobApplication};
pub use engagement::{EngageOutcome, Engagement, EngagementKind};
pub use job::Job;
pub use notification::{Notification, NotificationKind};
pub use token::Claims;
pub use user::{PublicUser, Role, User};
