/// API route handlers, organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login and token refresh
/// - `users`: Points, actions, subscriptions, profile and administration
/// - `stats`: Stat contributions
/// - `leaderboard`: Global points leaderboard
/// - `classifications`: Classification rankings and creation

pub mod auth;
pub mod classifications;
pub mod health;
pub mod leaderboard;
pub mod stats;
pub mod users;
